//! POST command - Publish a new message.

use anyhow::Result;
use clap::Args;
use feed_core::{Category, Msg};
use serde_json::json;

use super::{make_rpc_request, output};

/// Arguments for the post command.
#[derive(Args)]
pub struct PostArgs {
    /// Message text
    pub content: String,

    /// Category: All, News, Crypto, Sports or Other
    #[arg(short, long, default_value = "All")]
    pub category: Category,
}

/// Execute the post command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: PostArgs,
) -> Result<()> {
    let url = format!("{}/msgs", base_url);
    let body = json!({
        "content": args.content,
        "category": args.category.as_str(),
    });

    let msg: Msg = make_rpc_request(client.post(&url).json(&body)).await?;

    output(&msg, human)
}

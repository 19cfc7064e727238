//! REPLY command - Answer an existing message.

use anyhow::Result;
use clap::Args;
use feed_core::{Category, Msg};
use serde_json::json;

use super::{endpoint_url, make_rpc_request, output};

/// Arguments for the reply command.
#[derive(Args)]
pub struct ReplyArgs {
    /// ID of the message to reply to
    pub msg_id: String,

    /// Reply text
    pub content: String,

    /// Category of the reply
    #[arg(short, long, default_value = "All")]
    pub category: Category,
}

/// Execute the reply command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ReplyArgs,
) -> Result<()> {
    let url = endpoint_url(base_url, &["msgs", &args.msg_id, "replies"])?;
    let body = json!({
        "content": args.content,
        "category": args.category.as_str(),
    });

    let reply: Msg = make_rpc_request(client.post(url).json(&body)).await?;

    output(&reply, human)
}

//! REPLIES command - List the replies to a message.

use anyhow::Result;
use clap::Args;
use feed_core::Msg;

use super::{endpoint_url, make_rpc_request, output};

/// Arguments for the replies command.
#[derive(Args)]
pub struct RepliesArgs {
    /// ID of the parent message
    pub msg_id: String,
}

/// Execute the replies command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: RepliesArgs,
) -> Result<()> {
    let url = endpoint_url(base_url, &["msgs", &args.msg_id, "replies"])?;

    let replies: Vec<Msg> = make_rpc_request(client.get(url)).await?;

    output(&replies, human)
}

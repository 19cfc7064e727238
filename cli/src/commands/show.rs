//! SHOW command - Display a single message.

use anyhow::Result;
use clap::Args;
use feed_core::Msg;

use super::{endpoint_url, make_rpc_request, output};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// ID of the message
    pub msg_id: String,
}

/// Execute the show command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ShowArgs,
) -> Result<()> {
    let url = endpoint_url(base_url, &["msgs", &args.msg_id])?;

    let msg: Msg = make_rpc_request(client.get(url)).await?;

    output(&msg, human)
}

//! LIKE and SHARE commands - Bump a message counter.

use anyhow::Result;
use clap::Args;
use feed_core::Msg;

use super::{endpoint_url, make_rpc_request, output};

/// Arguments shared by the like and share commands.
#[derive(Args)]
pub struct ReactArgs {
    /// ID of the message
    pub msg_id: String,
}

/// Which counter to bump.
#[derive(Debug, Clone, Copy)]
pub enum Reaction {
    Like,
    Share,
}

impl Reaction {
    fn path(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Share => "share",
        }
    }
}

/// Execute a like or share.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    reaction: Reaction,
    args: ReactArgs,
) -> Result<()> {
    let url = endpoint_url(base_url, &["msgs", &args.msg_id, reaction.path()])?;

    let msg: Msg = make_rpc_request(client.post(url)).await?;

    output(&msg, human)
}

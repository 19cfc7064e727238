//! WHOAMI command - Show the identity the server sees for you.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use feed_core::Identity;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output};

/// Arguments for the whoami command.
#[derive(Args)]
pub struct WhoAmIArgs {}

/// Response from GET /whoami.
#[derive(Debug, Deserialize, Serialize)]
pub struct WhoAmIResponse {
    pub identity: Identity,
    pub username: Option<String>,
}

impl HumanReadable for WhoAmIResponse {
    fn print_human(&self) {
        println!("  {} {}", "Identity:".cyan(), self.identity);
        if self.identity.is_anonymous() {
            println!("  {}", "(anonymous)".yellow());
        }
        match &self.username {
            Some(name) => println!("  {} {}", "Username:".cyan(), name.bold()),
            None => println!("  {}", "(no profile set)".dimmed()),
        }
    }
}

/// Execute the whoami command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    _args: WhoAmIArgs,
) -> Result<()> {
    let url = format!("{}/whoami", base_url);
    let response: WhoAmIResponse = make_request(client.get(&url)).await?;

    output(&response, human)
}

//! PROFILE command - Read or set a username.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use feed_core::UserProfile;
use serde::Serialize;
use serde_json::json;

use super::{HumanReadable, endpoint_url, make_empty_request, make_request, output};

/// Arguments for the profile command.
#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show a profile (your own when no identity is given)
    Get {
        /// Identity as 64 hex characters
        identity: Option<String>,
    },
    /// Set your username
    Set {
        /// New username
        username: String,
    },
}

/// A profile lookup result; `null` in JSON when unset.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ProfileView(pub Option<UserProfile>);

impl HumanReadable for ProfileView {
    fn print_human(&self) {
        match &self.0 {
            Some(profile) => println!("  {} {}", "Username:".cyan(), profile.username.bold()),
            None => println!("  {}", "(no profile set)".dimmed()),
        }
    }
}

/// Execute the profile command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ProfileArgs,
) -> Result<()> {
    match args.action {
        ProfileAction::Get { identity } => {
            let url = match identity {
                Some(identity) => endpoint_url(base_url, &["profiles", &identity])?,
                None => endpoint_url(base_url, &["profile"])?,
            };
            let profile: Option<UserProfile> = make_request(client.get(url)).await?;
            output(&ProfileView(profile), human)
        }
        ProfileAction::Set { username } => {
            let url = endpoint_url(base_url, &["profile"])?;
            make_empty_request(client.put(url).json(&json!({ "username": username }))).await?;
            let profile = UserProfile {
                owner: None,
                username,
            };
            output(&ProfileView(Some(profile)), human)
        }
    }
}

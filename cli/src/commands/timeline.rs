//! TIMELINE command - List messages, newest first.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use feed_core::{Category, FeedItem, Msg};

use super::{HumanReadable, make_request, output, print_msg};

/// Arguments for the timeline command.
#[derive(Args)]
pub struct TimelineArgs {
    /// Only show messages in this category
    #[arg(short, long)]
    pub category: Option<Category>,

    /// Include each author's username
    #[arg(long)]
    pub names: bool,
}

impl HumanReadable for Vec<FeedItem> {
    fn print_human(&self) {
        if self.is_empty() {
            println!("  {}", "(no messages)".dimmed());
            return;
        }
        for item in self {
            print_msg(&item.msg, item.username.as_deref());
            println!();
        }
    }
}

/// Execute the timeline command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: TimelineArgs,
) -> Result<()> {
    if args.names {
        let category = args.category.unwrap_or_default();
        let url = format!("{}/feed?category={}", base_url, category);
        let items: Vec<FeedItem> = make_request(client.get(&url)).await?;
        return output(&items, human);
    }

    let url = match args.category {
        Some(category) => format!("{}/msgs?category={}", base_url, category),
        None => format!("{}/timeline", base_url),
    };
    let msgs: Vec<Msg> = make_request(client.get(&url)).await?;

    output(&msgs, human)
}

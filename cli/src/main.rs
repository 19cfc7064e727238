//! Command-line interface for the feed service.
//!
//! Commands:
//! - post: Publish a message
//! - timeline: List messages, optionally by category or with usernames
//! - show / replies: Inspect one message and its replies
//! - like / share / reply: Interact with a message
//! - profile: Read or set a username
//! - whoami: Show the identity the server resolved for you
//! - keygen: Generate a key pair and its identity (offline)
//!
//! Configuration via environment:
//! - FEED_URL: Base URL of the feed server (default: http://localhost:3000)
//! - FEED_TOKEN: JWT Bearer token for authentication
//! - FEED_IDENTITY: Identity hex sent as X-Identity (dev servers only)

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    keygen::KeygenArgs,
    post::PostArgs,
    profile::ProfileArgs,
    react::{ReactArgs, Reaction},
    replies::RepliesArgs,
    reply::ReplyArgs,
    show::ShowArgs,
    timeline::TimelineArgs,
    whoami::WhoAmIArgs,
};

/// Feed service CLI
///
/// JSON output by default for scripting; --human for formatted output.
#[derive(Parser)]
#[command(name = "feed")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Feed server URL
    #[arg(
        long,
        env = "FEED_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    url: String,

    /// JWT Bearer token for authentication
    #[arg(long, env = "FEED_TOKEN", global = true)]
    token: Option<String>,

    /// Identity hex to send in the X-Identity header (dev servers only)
    #[arg(long, env = "FEED_IDENTITY", global = true)]
    identity: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a new message
    Post(PostArgs),

    /// List messages, newest first
    Timeline(TimelineArgs),

    /// Show a single message
    Show(ShowArgs),

    /// List the replies to a message
    Replies(RepliesArgs),

    /// Like a message
    Like(ReactArgs),

    /// Share a message
    Share(ReactArgs),

    /// Reply to a message
    Reply(ReplyArgs),

    /// Read or set a profile
    Profile(ProfileArgs),

    /// Show the identity the server sees
    Whoami(WhoAmIArgs),

    /// Generate an Ed25519 key and print its identity
    Keygen(KeygenArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Keygen(args) = cli.command {
        if let Err(e) = commands::keygen::execute(cli.human, args) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let client = match commands::build_client(cli.token.as_deref(), cli.identity.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let url = cli.url.trim_end_matches('/');

    let result = match cli.command {
        Commands::Post(args) => commands::post::execute(&client, url, cli.human, args).await,
        Commands::Timeline(args) => {
            commands::timeline::execute(&client, url, cli.human, args).await
        }
        Commands::Show(args) => commands::show::execute(&client, url, cli.human, args).await,
        Commands::Replies(args) => {
            commands::replies::execute(&client, url, cli.human, args).await
        }
        Commands::Like(args) => {
            commands::react::execute(&client, url, cli.human, Reaction::Like, args).await
        }
        Commands::Share(args) => {
            commands::react::execute(&client, url, cli.human, Reaction::Share, args).await
        }
        Commands::Reply(args) => commands::reply::execute(&client, url, cli.human, args).await,
        Commands::Profile(args) => {
            commands::profile::execute(&client, url, cli.human, args).await
        }
        Commands::Whoami(args) => commands::whoami::execute(&client, url, cli.human, args).await,
        Commands::Keygen(_) => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

//! KEYGEN command - Create an Ed25519 key and print the identity it owns.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use feed_core::{Identity, IdentityKeyPair};
use serde::Serialize;

use super::{HumanReadable, output};

/// Arguments for the keygen command.
#[derive(Args)]
pub struct KeygenArgs {}

/// A freshly generated key and its identity.
#[derive(Debug, Serialize)]
pub struct KeygenOutput {
    /// Identity hex, usable as FEED_IDENTITY or a token subject.
    pub identity: Identity,
    /// Ed25519 public key, hex encoded.
    pub public_key: String,
    /// Ed25519 secret key, hex encoded.
    pub secret_key: String,
}

impl HumanReadable for KeygenOutput {
    fn print_human(&self) {
        println!("  {} {}", "Identity:".cyan(), self.identity.to_string().bold());
        println!("  {} {}", "Public key:".cyan(), self.public_key);
        println!("  {} {}", "Secret key:".cyan(), self.secret_key.yellow());
        println!();
        println!("  {}", "Keep the secret key private.".dimmed());
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Execute the keygen command. Runs locally; no server is contacted.
pub fn execute(human: bool, _args: KeygenArgs) -> Result<()> {
    let keypair = IdentityKeyPair::generate();

    let out = KeygenOutput {
        identity: keypair.identity(),
        public_key: to_hex(keypair.public_key().as_bytes()),
        secret_key: to_hex(&keypair.secret_bytes()),
    };

    output(&out, human)
}

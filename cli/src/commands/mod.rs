//! Command implementations for the feed CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod keygen;
pub mod post;
pub mod profile;
pub mod react;
pub mod replies;
pub mod reply;
pub mod show;
pub mod timeline;
pub mod whoami;

use anyhow::Result;
use chrono::DateTime;
use colored::Colorize;
use feed_core::{Msg, RpcResult, Time};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Header carrying a dev identity when the server allows it.
const IDENTITY_HEADER: &str = "X-Identity";

/// Common error type for HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Build an HTTP client with an optional Bearer token and dev identity.
pub fn build_client(token: Option<&str>, identity: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();

    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| anyhow::anyhow!("Invalid token value: {}", e))?;
        headers.insert(AUTHORIZATION, value);
    }

    if let Some(identity) = identity {
        let parsed: feed_core::Identity = identity
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid identity: {}", e))?;
        let value = HeaderValue::from_str(&parsed.to_string())?;
        headers.insert(IDENTITY_HEADER, value);
    }

    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

/// Build `{base_url}/{segments..}`, percent-encoding each segment.
pub fn endpoint_url(base_url: &str, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| anyhow::anyhow!("Invalid server URL {}: {}", base_url, e))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Server URL cannot take a path: {}", base_url))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Send a request and decode a plain JSON body.
pub async fn make_request<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let response = check_status(request.send().await?).await?;
    Ok(response.json::<T>().await?)
}

/// Send a request whose success body is `{ "ok": T }`.
pub async fn make_rpc_request<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let result: RpcResult<T> = make_request(request).await?;
    result.into_result().map_err(CliError::Decode)
}

/// Send a request that answers with no body.
pub async fn make_empty_request(request: reqwest::RequestBuilder) -> Result<(), CliError> {
    check_status(request.send().await?).await?;
    Ok(())
}

/// Turn a non-2xx response into `CliError::Server`, using the `err` field when present.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CliError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| json.get("err").and_then(|v| v.as_str()).map(String::from))
        .unwrap_or(body);

    Err(CliError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Format a nanosecond timestamp for human display.
pub fn format_timestamp(ts: Time) -> String {
    DateTime::from_timestamp_nanos(ts)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One-block rendering of a message, shared by the listing commands.
pub fn print_msg(msg: &Msg, username: Option<&str>) {
    let author = match username {
        Some(name) if !name.is_empty() => name.bold().to_string(),
        _ => truncate(&msg.author.to_string(), 16).dimmed().to_string(),
    };

    println!(
        "  {} {}  {}  {}",
        format!("[{}]", msg.category).magenta(),
        author,
        format_timestamp(msg.timestamp).dimmed(),
        msg.id.to_string().dimmed()
    );
    println!("    {}", msg.content);
    println!(
        "    {} {}  {} {}  {} {}",
        "likes:".cyan(),
        msg.likes,
        "shares:".cyan(),
        msg.shares,
        "replies:".cyan(),
        msg.replies.len()
    );
}

impl HumanReadable for Msg {
    fn print_human(&self) {
        print_msg(self, None);
    }
}

impl HumanReadable for Vec<Msg> {
    fn print_human(&self) {
        if self.is_empty() {
            println!("  {}", "(no messages)".dimmed());
            return;
        }
        for msg in self {
            print_msg(msg, None);
            println!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(
            format_timestamp(1_700_000_000_000_000_000),
            "2023-11-14 22:13:20 UTC"
        );
    }

    #[test]
    fn test_endpoint_url_encodes_segments() {
        let url = endpoint_url("http://localhost:3000", &["msgs", "a/b?c#d", "like"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/msgs/a%2Fb%3Fc%23d/like");

        let url = endpoint_url("http://example.com/api", &["msgs", "m1"]).unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/msgs/m1");

        assert!(endpoint_url("not a url", &["msgs"]).is_err());
    }

    #[test]
    fn test_build_client_rejects_bad_identity() {
        assert!(build_client(None, Some("nope")).is_err());
        assert!(build_client(Some("token"), Some(&"a".repeat(64))).is_ok());
    }
}

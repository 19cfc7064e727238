//! feed-core: domain types for the feed service
//!
//! This crate provides:
//! - `Identity`: the opaque caller principal attached to every request
//! - `Msg`, `MsgId`, `Category`: posted messages and their classification
//! - `UserProfile`: the mutable display name owned by an identity
//! - `RpcResult`: the `{ "ok": .. } | { "err": .. }` wire envelope
//! - Content validation shared by message creation and replies
//!
//! Storage and transport live in `feed-store` and `feed-server`.

pub mod identity;
pub mod types;

pub use identity::{IdentityKeyPair, derive_identity};
pub use types::*;

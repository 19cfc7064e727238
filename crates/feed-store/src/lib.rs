//! feed-store: storage layer and service model for the feed service
//!
//! This crate provides:
//! - `Store`: the keyed message/profile store, backed by memory or PostgreSQL
//! - `MessageService`: posting, timelines, category views, likes, shares, replies
//! - `ProfileRegistry`: identity to username mapping with upsert semantics
//! - Migration management for the Postgres backend
//!
//! # Usage
//!
//! ```rust,ignore
//! use feed_core::{Category, Identity};
//! use feed_store::{MessageService, ProfileRegistry, Store, StoreConfig};
//!
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let profiles = ProfileRegistry::new(store.clone());
//! let messages = MessageService::new(store, profiles.clone());
//!
//! let msg = messages.create_msg(caller, "hello", Category::News).await?;
//! messages.like_msg(&msg.id).await?;
//! ```

pub mod clock;
pub mod error;
pub mod memory;
pub mod messages;
pub mod models;
pub mod postgres;
pub mod profiles;
pub mod schema;
pub mod store;

pub use clock::MonotonicClock;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use messages::MessageService;
pub use postgres::PgStore;
pub use profiles::ProfileRegistry;
pub use store::{Counter, Store, StoreConfig};

// Re-export feed-core for downstream crates
pub use feed_core;

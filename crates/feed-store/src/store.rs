//! Store facade over the available backends.
//!
//! `Store` is the "durable keyed store" the services are written against.
//! It dispatches to the in-memory backend when no database is configured and
//! to Postgres otherwise; both give the same ordering and atomicity.

use feed_core::{Category, Identity, Msg, MsgId, UserProfile};

use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;
use crate::postgres::PgStore;

/// Social counters that only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Likes,
    Shares,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database connection URL; `None` selects the in-memory backend.
    pub database_url: Option<String>,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Run migrations on connect.
    pub run_migrations: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            min_connections: 1,
            run_migrations: true,
        }
    }
}

impl StoreConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `DATABASE_URL` - Optional; unset or empty selects the memory backend
    /// - `DATABASE_MAX_CONNECTIONS` - Optional, defaults to 10
    /// - `DATABASE_MIN_CONNECTIONS` - Optional, defaults to 1
    /// - `DATABASE_RUN_MIGRATIONS` - Optional, defaults to true
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let max_connections = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(defaults.max_connections);
        let min_connections = parse_var(&lookup, "DATABASE_MIN_CONNECTIONS")?
            .unwrap_or(defaults.min_connections);

        let run_migrations = lookup("DATABASE_RUN_MIGRATIONS")
            .map(|s| s.to_lowercase() != "false" && s != "0")
            .unwrap_or(defaults.run_migrations);

        Ok(Self {
            database_url,
            max_connections,
            min_connections,
            run_migrations,
        })
    }
}

fn parse_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> StoreResult<Option<u32>> {
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| StoreError::ConfigError(format!("{} must be an integer, got '{}'", name, raw)))
        })
        .transpose()
}

/// Message and profile store.
#[derive(Debug, Clone)]
pub enum Store {
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl Store {
    /// A fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Open the backend selected by `config`.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        match config.database_url.as_deref() {
            Some(url) => Ok(Self::Postgres(PgStore::connect(url, &config).await?)),
            None => {
                tracing::warn!("DATABASE_URL not set, messages will not survive a restart");
                Ok(Self::in_memory())
            }
        }
    }

    /// Short backend name for logs and health output.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }

    // ==================== Message Operations ====================

    /// Insert a new message; fails with `DuplicateMsg` if the id is taken.
    pub async fn insert_msg(&self, msg: &Msg) -> StoreResult<()> {
        match self {
            Self::Memory(s) => s.insert_msg(msg).await,
            Self::Postgres(s) => s.insert_msg(msg).await,
        }
    }

    /// Get a message by id.
    pub async fn get_msg(&self, id: &MsgId) -> StoreResult<Option<Msg>> {
        match self {
            Self::Memory(s) => s.get_msg(id).await,
            Self::Postgres(s) => s.get_msg(id).await,
        }
    }

    /// Get messages in the order of `ids`, skipping ids that do not exist.
    pub async fn get_msgs(&self, ids: &[MsgId]) -> StoreResult<Vec<Msg>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            Self::Memory(s) => s.get_msgs(ids).await,
            Self::Postgres(s) => s.get_msgs(ids).await,
        }
    }

    /// Messages matching `filter`, newest first, ties newest-inserted first.
    pub async fn list_msgs(&self, filter: Category) -> StoreResult<Vec<Msg>> {
        match self {
            Self::Memory(s) => s.list_msgs(filter).await,
            Self::Postgres(s) => s.list_msgs(filter).await,
        }
    }

    /// Total number of stored messages.
    pub async fn count_msgs(&self) -> StoreResult<u64> {
        match self {
            Self::Memory(s) => s.count_msgs().await,
            Self::Postgres(s) => s.count_msgs().await,
        }
    }

    /// Atomically add one to `counter` and return the updated message.
    pub async fn increment(&self, id: &MsgId, counter: Counter) -> StoreResult<Msg> {
        match self {
            Self::Memory(s) => s.increment(id, counter).await,
            Self::Postgres(s) => s.increment(id, counter).await,
        }
    }

    /// Atomically insert `reply` and append its id to `parent`'s replies.
    ///
    /// Nothing is written when the parent does not exist.
    pub async fn insert_reply(&self, parent: &MsgId, reply: &Msg) -> StoreResult<Msg> {
        match self {
            Self::Memory(s) => s.insert_reply(parent, reply).await,
            Self::Postgres(s) => s.insert_reply(parent, reply).await,
        }
    }

    // ==================== Profile Operations ====================

    /// Get the profile owned by `owner`.
    pub async fn get_profile(&self, owner: &Identity) -> StoreResult<Option<UserProfile>> {
        match self {
            Self::Memory(s) => s.get_profile(owner).await,
            Self::Postgres(s) => s.get_profile(owner).await,
        }
    }

    /// Insert or overwrite the profile owned by `owner`.
    pub async fn upsert_profile(&self, owner: Identity, username: &str) -> StoreResult<()> {
        match self {
            Self::Memory(s) => s.upsert_profile(owner, username).await,
            Self::Postgres(s) => s.upsert_profile(owner, username).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = StoreConfig::default();
        assert!(config.database_url.is_none());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert!(config.run_migrations);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://feed@localhost/feed"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("DATABASE_RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://feed@localhost/feed"));
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 1);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_config_empty_url_means_memory() {
        let config = StoreConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_config_rejects_bad_number() {
        let err = StoreConfig::from_lookup(lookup(&[("DATABASE_MAX_CONNECTIONS", "many")]))
            .unwrap_err();
        assert!(matches!(err, StoreError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_connect_without_url_is_memory() {
        let store = Store::connect(StoreConfig::default()).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert_eq!(store.count_msgs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_msgs_empty_ids() {
        let store = Store::in_memory();
        assert!(store.get_msgs(&[]).await.unwrap().is_empty());
    }
}

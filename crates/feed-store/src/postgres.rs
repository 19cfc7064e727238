//! Postgres backend.
//!
//! Counter updates are single `UPDATE .. RETURNING` statements so racing
//! increments never lose an update. Replies run in one transaction that locks
//! the parent row before inserting the reply and appending its id.
//!
//! Content and usernames are stored as UTF-8 `BYTEA` so any string the
//! memory backend accepts, U+0000 included, round-trips unchanged.

use feed_core::{Category, Identity, Msg, MsgId, UserProfile};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::{StoreError, StoreResult};
use crate::models::{MsgRow, ProfileRow};
use crate::schema;
use crate::store::{Counter, StoreConfig};

/// Postgres-backed message and profile store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to `database_url` using the pool settings in `config`.
    ///
    /// Runs migrations if `config.run_migrations` is true.
    pub async fn connect(database_url: &str, config: &StoreConfig) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(database_url)
            .await?;

        tracing::info!("Connected to database");

        if config.run_migrations {
            schema::run_migrations(&pool).await?;
        } else if !schema::is_schema_initialized(&pool).await? {
            tracing::warn!("Migrations disabled and feed tables are missing");
        }

        Ok(Self { pool })
    }

    /// Create a store from an existing connection pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ==================== Message Operations ====================

    pub async fn insert_msg(&self, msg: &Msg) -> StoreResult<()> {
        insert_msg_row(&self.pool, msg).await
    }

    pub async fn get_msg(&self, id: &MsgId) -> StoreResult<Option<Msg>> {
        if !is_storable_id(id) {
            return Ok(None);
        }
        let row = sqlx::query_as::<_, MsgRow>(
            r#"
            SELECT id, author, content, category, timestamp_ns, likes, shares, replies
            FROM msgs
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Msg::try_from).transpose()
    }

    /// Fetch messages in the order of `ids`, skipping unknown ids.
    pub async fn get_msgs(&self, ids: &[MsgId]) -> StoreResult<Vec<Msg>> {
        let keys: Vec<String> = ids
            .iter()
            .filter(|id| is_storable_id(id))
            .map(|id| id.to_string())
            .collect();
        let rows = sqlx::query_as::<_, MsgRow>(
            r#"
            SELECT id, author, content, category, timestamp_ns, likes, shares, replies
            FROM msgs
            WHERE id = ANY($1)
            "#,
        )
        .bind(&keys)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id = std::collections::HashMap::with_capacity(rows.len());
        for row in rows {
            let msg = Msg::try_from(row)?;
            by_id.insert(msg.id.clone(), msg);
        }

        Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
    }

    /// Newest first; equal timestamps newest-inserted first.
    pub async fn list_msgs(&self, filter: Category) -> StoreResult<Vec<Msg>> {
        let category = (filter != Category::All).then(|| filter.as_str());

        let rows = sqlx::query_as::<_, MsgRow>(
            r#"
            SELECT id, author, content, category, timestamp_ns, likes, shares, replies
            FROM msgs
            WHERE ($1::text IS NULL OR category = $1::text)
            ORDER BY timestamp_ns DESC, seq DESC
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Msg::try_from).collect()
    }

    pub async fn count_msgs(&self) -> StoreResult<u64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM msgs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0.max(0) as u64)
    }

    pub async fn increment(&self, id: &MsgId, counter: Counter) -> StoreResult<Msg> {
        if !is_storable_id(id) {
            return Err(StoreError::MsgNotFound(id.clone()));
        }
        let sql = match counter {
            Counter::Likes => {
                r#"
                UPDATE msgs SET likes = likes + 1
                WHERE id = $1
                RETURNING id, author, content, category, timestamp_ns, likes, shares, replies
                "#
            }
            Counter::Shares => {
                r#"
                UPDATE msgs SET shares = shares + 1
                WHERE id = $1
                RETURNING id, author, content, category, timestamp_ns, likes, shares, replies
                "#
            }
        };

        sqlx::query_as::<_, MsgRow>(sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::MsgNotFound(id.clone()))
            .and_then(Msg::try_from)
    }

    pub async fn insert_reply(&self, parent: &MsgId, reply: &Msg) -> StoreResult<Msg> {
        if !is_storable_id(parent) {
            return Err(StoreError::MsgNotFound(parent.clone()));
        }
        let mut tx = self.pool.begin().await?;

        // Lock the parent so concurrent replies append in commit order.
        let parent_exists: Option<(String,)> =
            sqlx::query_as(r#"SELECT id FROM msgs WHERE id = $1 FOR UPDATE"#)
                .bind(parent.as_str())
                .fetch_optional(&mut *tx)
                .await?;

        if parent_exists.is_none() {
            return Err(StoreError::MsgNotFound(parent.clone()));
        }

        insert_msg_row(&mut *tx, reply).await?;

        sqlx::query(r#"UPDATE msgs SET replies = array_append(replies, $2) WHERE id = $1"#)
            .bind(parent.as_str())
            .bind(reply.id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(reply.clone())
    }

    // ==================== Profile Operations ====================

    pub async fn get_profile(&self, owner: &Identity) -> StoreResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"SELECT owner, username FROM profiles WHERE owner = $1"#,
        )
        .bind(owner.as_bytes().as_slice())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserProfile::try_from).transpose()
    }

    pub async fn upsert_profile(&self, owner: Identity, username: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (owner, username)
            VALUES ($1, $2)
            ON CONFLICT (owner) DO UPDATE
            SET username = EXCLUDED.username, updated = now()
            "#,
        )
        .bind(owner.as_bytes().as_slice())
        .bind(username.as_bytes())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Ids are `TEXT`, which cannot hold U+0000, so such an id names no row.
fn is_storable_id(id: &MsgId) -> bool {
    !id.as_str().contains('\0')
}

async fn insert_msg_row<'e, E>(executor: E, msg: &Msg) -> StoreResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO msgs (id, author, content, category, timestamp_ns, likes, shares, replies)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(msg.id.as_str())
    .bind(msg.author.as_bytes().as_slice())
    .bind(msg.content.as_bytes())
    .bind(msg.category.as_str())
    .bind(msg.timestamp)
    .bind(msg.likes as i64)
    .bind(msg.shares as i64)
    .bind(msg.replies.iter().map(|id| id.to_string()).collect::<Vec<_>>())
    .execute(executor)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(StoreError::DuplicateMsg(msg.id.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

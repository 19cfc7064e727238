//! Message service: posting, timelines, category views and social actions.
//!
//! Content is validated before the store is touched, so a rejected request
//! never leaves a partial write. Likes and shares are plain increments: the
//! same caller may like a message any number of times.

use std::collections::HashMap;
use std::sync::Arc;

use feed_core::{Category, FeedItem, Identity, Msg, MsgId, validate_content};

use crate::clock::MonotonicClock;
use crate::error::{StoreError, StoreResult};
use crate::profiles::ProfileRegistry;
use crate::store::{Counter, Store};

/// Owns the message collection and enforces its mutation rules.
#[derive(Debug, Clone)]
pub struct MessageService {
    store: Store,
    profiles: ProfileRegistry,
    clock: Arc<MonotonicClock>,
}

impl MessageService {
    /// Create a service stamping messages with the system clock.
    pub fn new(store: Store, profiles: ProfileRegistry) -> Self {
        Self::with_clock(store, profiles, MonotonicClock::new())
    }

    /// Create a service with an explicit clock.
    pub fn with_clock(store: Store, profiles: ProfileRegistry, clock: MonotonicClock) -> Self {
        Self {
            store,
            profiles,
            clock: Arc::new(clock),
        }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Build a fresh message authored by `caller`.
    fn compose(&self, caller: Identity, content: &str, category: Category) -> StoreResult<Msg> {
        validate_content(content)?;
        Ok(Msg::new(
            MsgId::generate(),
            caller,
            content,
            category,
            self.clock.now(),
        ))
    }

    /// Post a new message.
    ///
    /// Fails with `InvalidContent` if `content` is empty after trimming.
    pub async fn create_msg(
        &self,
        caller: Identity,
        content: &str,
        category: Category,
    ) -> StoreResult<Msg> {
        let msg = self.compose(caller, content, category)?;
        self.store.insert_msg(&msg).await?;

        tracing::info!(
            msg_id = %msg.id,
            author = %caller,
            category = %category,
            "Message created"
        );
        Ok(msg)
    }

    /// Every message, most recent first.
    pub async fn get_timeline(&self) -> StoreResult<Vec<Msg>> {
        self.store.list_msgs(Category::All).await
    }

    /// Messages in `category`, most recent first. `All` returns the timeline.
    pub async fn get_msgs_by_category(&self, category: Category) -> StoreResult<Vec<Msg>> {
        let msgs = self.store.list_msgs(category).await?;
        tracing::debug!(category = %category, count = msgs.len(), "Listed messages");
        Ok(msgs)
    }

    /// A single message by id.
    pub async fn get_msg(&self, id: &MsgId) -> StoreResult<Msg> {
        self.store
            .get_msg(id)
            .await?
            .ok_or_else(|| StoreError::MsgNotFound(id.clone()))
    }

    /// The replies to `id`, in the order they were made.
    pub async fn get_replies(&self, id: &MsgId) -> StoreResult<Vec<Msg>> {
        let parent = self.get_msg(id).await?;
        self.store.get_msgs(&parent.replies).await
    }

    /// Add one like to `id` and return the updated message.
    pub async fn like_msg(&self, id: &MsgId) -> StoreResult<Msg> {
        let msg = self.store.increment(id, Counter::Likes).await?;
        tracing::info!(msg_id = %id, likes = msg.likes, "Message liked");
        Ok(msg)
    }

    /// Add one share to `id` and return the updated message.
    pub async fn share_msg(&self, id: &MsgId) -> StoreResult<Msg> {
        let msg = self.store.increment(id, Counter::Shares).await?;
        tracing::info!(msg_id = %id, shares = msg.shares, "Message shared");
        Ok(msg)
    }

    /// Reply to `id` with a new message and return the reply.
    ///
    /// The reply is a full message in its own right (it shows up in the
    /// timeline) and its id is appended to the parent's `replies`.
    pub async fn reply_to_msg(
        &self,
        caller: Identity,
        id: &MsgId,
        content: &str,
        category: Category,
    ) -> StoreResult<Msg> {
        let reply = self.compose(caller, content, category)?;
        let reply = self.store.insert_reply(id, &reply).await?;

        tracing::info!(
            msg_id = %reply.id,
            parent_id = %id,
            author = %caller,
            "Reply created"
        );
        Ok(reply)
    }

    /// Messages in `category` with each author's current username.
    pub async fn get_feed(&self, category: Category) -> StoreResult<Vec<FeedItem>> {
        let msgs = self.get_msgs_by_category(category).await?;

        let mut names: HashMap<Identity, Option<String>> = HashMap::new();
        let mut items = Vec::with_capacity(msgs.len());
        for msg in msgs {
            let username = match names.get(&msg.author) {
                Some(name) => name.clone(),
                None => {
                    let name = self.profiles.username_of(&msg.author).await?;
                    names.insert(msg.author, name.clone());
                    name
                }
            };
            items.push(FeedItem { msg, username });
        }
        Ok(items)
    }
}

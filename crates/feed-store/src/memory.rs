//! In-process backend used when no database is configured.
//!
//! All state sits behind a single `RwLock`: mutations take the write lock for
//! their whole duration, so they are linearizable, while reads share the read
//! lock and see a consistent snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use feed_core::{Category, Identity, Msg, MsgId, UserProfile};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::Counter;

#[derive(Debug, Default)]
struct MemoryState {
    msgs: HashMap<MsgId, Msg>,
    /// Message ids in insertion order.
    order: Vec<MsgId>,
    profiles: HashMap<Identity, UserProfile>,
}

impl MemoryState {
    fn insert(&mut self, msg: &Msg) -> StoreResult<()> {
        if self.msgs.contains_key(&msg.id) {
            return Err(StoreError::DuplicateMsg(msg.id.clone()));
        }
        self.order.push(msg.id.clone());
        self.msgs.insert(msg.id.clone(), msg.clone());
        Ok(())
    }
}

/// Memory-backed message and profile store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_msg(&self, msg: &Msg) -> StoreResult<()> {
        self.state.write().await.insert(msg)
    }

    pub async fn get_msg(&self, id: &MsgId) -> StoreResult<Option<Msg>> {
        Ok(self.state.read().await.msgs.get(id).cloned())
    }

    /// Fetch messages in the order of `ids`, skipping unknown ids.
    pub async fn get_msgs(&self, ids: &[MsgId]) -> StoreResult<Vec<Msg>> {
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.msgs.get(id).cloned()).collect())
    }

    /// Newest first; equal timestamps newest-inserted first.
    pub async fn list_msgs(&self, filter: Category) -> StoreResult<Vec<Msg>> {
        let state = self.state.read().await;
        let mut msgs: Vec<Msg> = state
            .order
            .iter()
            .rev()
            .filter_map(|id| state.msgs.get(id))
            .filter(|msg| filter.matches(msg.category))
            .cloned()
            .collect();
        drop(state);

        // Stable: ties keep the reverse insertion order established above.
        msgs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(msgs)
    }

    pub async fn count_msgs(&self) -> StoreResult<u64> {
        Ok(self.state.read().await.msgs.len() as u64)
    }

    pub async fn increment(&self, id: &MsgId, counter: Counter) -> StoreResult<Msg> {
        let mut state = self.state.write().await;
        let msg = state
            .msgs
            .get_mut(id)
            .ok_or_else(|| StoreError::MsgNotFound(id.clone()))?;

        match counter {
            Counter::Likes => msg.likes += 1,
            Counter::Shares => msg.shares += 1,
        }
        Ok(msg.clone())
    }

    pub async fn insert_reply(&self, parent: &MsgId, reply: &Msg) -> StoreResult<Msg> {
        let mut state = self.state.write().await;
        if !state.msgs.contains_key(parent) {
            return Err(StoreError::MsgNotFound(parent.clone()));
        }

        state.insert(reply)?;
        if let Some(parent_msg) = state.msgs.get_mut(parent) {
            parent_msg.replies.push(reply.id.clone());
        }
        Ok(reply.clone())
    }

    pub async fn get_profile(&self, owner: &Identity) -> StoreResult<Option<UserProfile>> {
        Ok(self.state.read().await.profiles.get(owner).cloned())
    }

    pub async fn upsert_profile(&self, owner: Identity, username: &str) -> StoreResult<()> {
        self.state
            .write()
            .await
            .profiles
            .insert(owner, UserProfile::new(owner, username));
        Ok(())
    }
}

//! Event broadcasting for live feed updates.
//!
//! Connected SSE clients subscribe to a category. Every published event is
//! delivered on the channel of the message's own category and on the `All`
//! channel, so an `All` subscriber sees everything.
//!
//! # Event Types
//!
//! - `msg`: a message was posted
//! - `reply`: a reply was added to a message
//! - `like` / `share`: a counter changed
//! - `heartbeat`: sent periodically to keep connections alive
//! - `catchup`: sent when a subscriber falls behind

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use feed_core::{Category, Msg, MsgId};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};

/// Default channel capacity for broadcast channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Heartbeat interval in seconds.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

// ============================================================================
// Event Types
// ============================================================================

/// An event that can be broadcast to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A top-level message was posted.
    Msg { msg: Msg },
    /// A reply was added under `parent_id`.
    Reply { parent_id: MsgId, msg: Msg },
    /// A message was liked; `count` is the new total.
    Like { msg_id: MsgId, count: u64 },
    /// A message was shared; `count` is the new total.
    Share { msg_id: MsgId, count: u64 },
    /// Periodic heartbeat to keep connection alive.
    Heartbeat { timestamp: DateTime<Utc> },
    /// Client fell behind and should reload the timeline.
    Catchup {
        events_missed: u64,
        timestamp: DateTime<Utc>,
    },
}

impl FeedEvent {
    /// SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Msg { .. } => "msg",
            Self::Reply { .. } => "reply",
            Self::Like { .. } => "like",
            Self::Share { .. } => "share",
            Self::Heartbeat { .. } => "heartbeat",
            Self::Catchup { .. } => "catchup",
        }
    }

    pub fn heartbeat() -> Self {
        Self::Heartbeat {
            timestamp: Utc::now(),
        }
    }

    pub fn catchup(events_missed: u64) -> Self {
        Self::Catchup {
            events_missed,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Manages one broadcast channel per category.
///
/// Channels are created lazily when the first subscriber connects. The SSE
/// route calls `cleanup_empty_channels` whenever a stream ends, which drops
/// channels nobody listens to anymore.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    channels: Arc<RwLock<HashMap<Category, broadcast::Sender<FeedEvent>>>>,
    capacity: usize,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    /// Create a new event broadcaster with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event broadcaster with custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Subscribe to events for `category`. `All` receives every event.
    pub async fn subscribe(&self, category: Category) -> broadcast::Receiver<FeedEvent> {
        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(&category) {
                return sender.subscribe();
            }
        }

        let mut channels = self.channels.write().await;
        // Another task may have created it meanwhile
        if let Some(sender) = channels.get(&category) {
            return sender.subscribe();
        }

        let (sender, receiver) = broadcast::channel(self.capacity);
        channels.insert(category, sender);

        tracing::debug!(
            category = %category,
            capacity = self.capacity,
            "Created event channel for category"
        );

        receiver
    }

    /// Publish an event about a message in `category`.
    ///
    /// Returns the number of receivers reached across the category channel
    /// and the `All` channel.
    pub async fn publish(&self, category: Category, event: FeedEvent) -> usize {
        let channels = self.channels.read().await;

        let mut targets = vec![Category::All];
        if category != Category::All {
            targets.push(category);
        }

        let mut delivered = 0;
        for target in targets {
            if let Some(sender) = channels.get(&target) {
                // Err only means nobody is listening right now
                delivered += sender.send(event.clone()).unwrap_or(0);
            }
        }

        tracing::trace!(
            category = %category,
            event = event.kind(),
            receivers = delivered,
            "Published event"
        );
        delivered
    }

    /// Announce a newly posted message.
    pub async fn publish_msg(&self, msg: &Msg) -> usize {
        self.publish(msg.category, FeedEvent::Msg { msg: msg.clone() })
            .await
    }

    /// Announce a reply under `parent_id`.
    pub async fn publish_reply(&self, parent_id: &MsgId, reply: &Msg) -> usize {
        let event = FeedEvent::Reply {
            parent_id: parent_id.clone(),
            msg: reply.clone(),
        };
        self.publish(reply.category, event).await
    }

    /// Announce the new like total of `msg`.
    pub async fn publish_like(&self, msg: &Msg) -> usize {
        let event = FeedEvent::Like {
            msg_id: msg.id.clone(),
            count: msg.likes,
        };
        self.publish(msg.category, event).await
    }

    /// Announce the new share total of `msg`.
    pub async fn publish_share(&self, msg: &Msg) -> usize {
        let event = FeedEvent::Share {
            msg_id: msg.id.clone(),
            count: msg.shares,
        };
        self.publish(msg.category, event).await
    }

    /// Get the number of active channels.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Get the number of subscribers for a category.
    pub async fn subscriber_count(&self, category: Category) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(&category)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    /// Drop channels that have no subscribers left.
    pub async fn cleanup_empty_channels(&self) -> usize {
        let mut channels = self.channels.write().await;
        let before = channels.len();
        channels.retain(|category, sender| {
            let has_receivers = sender.receiver_count() > 0;
            if !has_receivers {
                tracing::debug!(category = %category, "Cleaning up empty event channel");
            }
            has_receivers
        });
        before - channels.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use feed_core::Identity;

    fn msg_in(category: Category) -> Msg {
        Msg::new(
            MsgId::generate(),
            Identity::from_bytes([1; 32]),
            "hello".to_string(),
            category,
            42,
        )
    }

    #[tokio::test]
    async fn test_subscribe_creates_one_channel_per_category() {
        let broadcaster = EventBroadcaster::new();

        let _r1 = broadcaster.subscribe(Category::News).await;
        let _r2 = broadcaster.subscribe(Category::News).await;
        let _r3 = broadcaster.subscribe(Category::Sports).await;

        assert_eq!(broadcaster.channel_count().await, 2);
        assert_eq!(broadcaster.subscriber_count(Category::News).await, 2);
        assert_eq!(broadcaster.subscriber_count(Category::Sports).await, 1);
    }

    #[tokio::test]
    async fn test_publish_reaches_category_and_all() {
        let broadcaster = EventBroadcaster::new();
        let mut news = broadcaster.subscribe(Category::News).await;
        let mut all = broadcaster.subscribe(Category::All).await;
        let mut sports = broadcaster.subscribe(Category::Sports).await;

        let msg = msg_in(Category::News);
        assert_eq!(broadcaster.publish_msg(&msg).await, 2);

        match news.recv().await.unwrap() {
            FeedEvent::Msg { msg: received } => assert_eq!(received.id, msg.id),
            other => panic!("expected msg event, got {:?}", other),
        }
        assert!(matches!(all.recv().await.unwrap(), FeedEvent::Msg { .. }));
        assert!(sports.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_all_category_message_is_delivered_once() {
        let broadcaster = EventBroadcaster::new();
        let mut all = broadcaster.subscribe(Category::All).await;

        assert_eq!(broadcaster.publish_msg(&msg_in(Category::All)).await, 1);
        assert!(all.recv().await.is_ok());
        assert!(all.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let broadcaster = EventBroadcaster::new();
        assert_eq!(broadcaster.publish_msg(&msg_in(Category::Crypto)).await, 0);
    }

    #[tokio::test]
    async fn test_like_event_carries_new_count() {
        let broadcaster = EventBroadcaster::new();
        let mut rx = broadcaster.subscribe(Category::All).await;

        let mut msg = msg_in(Category::Other);
        msg.likes = 3;
        broadcaster.publish_like(&msg).await;

        match rx.recv().await.unwrap() {
            FeedEvent::Like { msg_id, count } => {
                assert_eq!(msg_id, msg.id);
                assert_eq!(count, 3);
            }
            other => panic!("expected like event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cleanup() {
        let broadcaster = EventBroadcaster::new();
        {
            let _receiver = broadcaster.subscribe(Category::News).await;
            assert_eq!(broadcaster.channel_count().await, 1);
        }

        assert_eq!(broadcaster.cleanup_empty_channels().await, 1);
        assert_eq!(broadcaster.channel_count().await, 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = FeedEvent::Share {
            msg_id: MsgId::from("m1"),
            count: 7,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"share\""));
        assert!(json.contains("\"msg_id\":\"m1\""));
        assert!(json.contains("\"count\":7"));

        let json = serde_json::to_string(&FeedEvent::catchup(100)).unwrap();
        assert!(json.contains("\"type\":\"catchup\""));
        assert!(json.contains("\"events_missed\":100"));
    }
}

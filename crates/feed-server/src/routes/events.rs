//! Server-Sent Events (SSE) endpoint for live feed updates.
//!
//! Endpoint: GET /events?category=News
//!
//! ```text
//! event: msg
//! data: {"type":"msg","msg":{"id":"...","content":"hello",...}}
//!
//! event: like
//! data: {"type":"like","msg_id":"...","count":3}
//! ```

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use feed_core::Category;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::error::ApiResult;
use crate::events::{EventBroadcaster, FeedEvent, HEARTBEAT_INTERVAL_SECS};
use crate::routes::msgs::{CategoryQuery, parse_category, query_params};
use crate::state::AppState;

/// A live SSE subscription. Dropping it, which happens when the client
/// disconnects, releases the receiver and prunes channels left without
/// listeners.
struct Subscription {
    receiver: Option<broadcast::Receiver<FeedEvent>>,
    broadcaster: EventBroadcaster,
    category: Category,
}

impl Subscription {
    async fn open(broadcaster: &EventBroadcaster, category: Category) -> Self {
        Self {
            receiver: Some(broadcaster.subscribe(category).await),
            broadcaster: broadcaster.clone(),
            category,
        }
    }

    /// Next event to forward, or `None` once the channel is closed.
    async fn next_event(&mut self) -> Option<FeedEvent> {
        let rx = self.receiver.as_mut()?;
        match rx.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(count)) => {
                tracing::warn!(
                    category = %self.category,
                    events_missed = count,
                    "SSE client lagged, sending catchup event"
                );
                Some(FeedEvent::catchup(count))
            }
            Err(RecvError::Closed) => {
                tracing::debug!(category = %self.category, "Event channel closed, ending SSE stream");
                None
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The receiver must be gone before cleanup counts subscribers.
        drop(self.receiver.take());

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let broadcaster = self.broadcaster.clone();
        let category = self.category;
        runtime.spawn(async move {
            let removed = broadcaster.cleanup_empty_channels().await;
            let channels = broadcaster.channel_count().await;
            tracing::debug!(
                category = %category,
                removed,
                channels,
                "SSE client disconnected"
            );
        });
    }
}

/// Render a feed event as an SSE frame, or `None` if it cannot be serialized.
fn to_sse(event: &FeedEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Event::default().event(event.kind()).data(data)),
        Err(e) => {
            tracing::error!(error = %e, event = event.kind(), "Failed to serialize event");
            None
        }
    }
}

/// GET /events?category= - Subscribe to live events.
///
/// Without a category (or with `All`) every event is streamed. Heartbeats go
/// out every 30 seconds. A subscriber that falls behind its channel buffer
/// receives a `catchup` event with the number of events it missed and should
/// reload the timeline.
async fn subscribe_events(
    State(state): State<AppState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let query = query_params(query)?;
    let category = parse_category(query.category.as_deref())?;
    let subscription = Subscription::open(state.broadcaster(), category).await;

    let subscribers = state.broadcaster().subscriber_count(category).await;
    tracing::info!(
        category = %category,
        subscribers,
        "Client subscribed to SSE events"
    );

    let stream = stream::unfold(subscription, |mut subscription| async move {
        loop {
            let event = subscription.next_event().await?;
            if let Some(frame) = to_sse(&event) {
                return Some((Ok(frame), subscription));
            }
        }
    });

    let mut keep_alive = KeepAlive::new().interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    if let Some(heartbeat) = to_sse(&FeedEvent::heartbeat()) {
        keep_alive = keep_alive.event(heartbeat);
    }

    Ok(Sse::new(stream).keep_alive(keep_alive))
}

/// Build SSE event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events", get(subscribe_events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed_core::MsgId;

    #[test]
    fn test_heartbeat_interval() {
        assert_eq!(HEARTBEAT_INTERVAL_SECS, 30);
    }

    #[tokio::test]
    async fn test_dropped_subscription_prunes_its_channel() {
        let broadcaster = EventBroadcaster::new();
        let subscription = Subscription::open(&broadcaster, Category::Sports).await;
        let _other = broadcaster.subscribe(Category::News).await;
        assert_eq!(broadcaster.channel_count().await, 2);

        drop(subscription);
        for _ in 0..10 {
            if broadcaster.channel_count().await == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(broadcaster.channel_count().await, 1);
        assert_eq!(broadcaster.subscriber_count(Category::Sports).await, 0);
        assert_eq!(broadcaster.subscriber_count(Category::News).await, 1);
    }

    #[tokio::test]
    async fn test_subscription_forwards_events() {
        let broadcaster = EventBroadcaster::new();
        let mut subscription = Subscription::open(&broadcaster, Category::All).await;

        let event = FeedEvent::Share {
            msg_id: MsgId::from("m1"),
            count: 2,
        };
        broadcaster.publish(Category::Crypto, event).await;

        assert!(matches!(
            subscription.next_event().await,
            Some(FeedEvent::Share { count: 2, .. })
        ));
    }

    #[test]
    fn test_to_sse_renders_event() {
        let event = FeedEvent::Like {
            msg_id: MsgId::from("m1"),
            count: 1,
        };
        assert!(to_sse(&event).is_some());
    }
}

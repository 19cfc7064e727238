//! Application state shared across handlers.

use std::sync::Arc;

use feed_store::{MessageService, ProfileRegistry, Store};

use crate::config::ServerConfig;
use crate::events::EventBroadcaster;

/// Application state shared across all handlers.
///
/// Cheap to clone; extracted in handlers with `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    messages: MessageService,
    profiles: ProfileRegistry,
    config: Arc<ServerConfig>,
    broadcaster: Arc<EventBroadcaster>,
}

impl AppState {
    /// Create new application state over `store`.
    pub fn new(store: Store, config: ServerConfig) -> Self {
        let profiles = ProfileRegistry::new(store.clone());
        let messages = MessageService::new(store, profiles.clone());
        let broadcaster = EventBroadcaster::with_capacity(config.event_channel_capacity);

        Self {
            messages,
            profiles,
            config: Arc::new(config),
            broadcaster: Arc::new(broadcaster),
        }
    }

    /// The message service.
    pub fn messages(&self) -> &MessageService {
        &self.messages
    }

    /// The profile registry.
    pub fn profiles(&self) -> &ProfileRegistry {
        &self.profiles
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the event broadcaster.
    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.messages.store().backend_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

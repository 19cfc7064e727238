//! Identity & profile registry.
//!
//! Maps an identity to its display name. Profiles are created on the first
//! update (upsert), overwritten wholesale afterwards and never deleted. No
//! validation is applied to usernames; the empty string is a valid name.

use feed_core::{Identity, UserProfile};

use crate::error::StoreResult;
use crate::store::Store;

/// Registry of user profiles, keyed by identity.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    store: Store,
}

impl ProfileRegistry {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Set the caller's username, creating the profile if needed.
    pub async fn update_user_profile(&self, caller: Identity, username: &str) -> StoreResult<()> {
        self.store.upsert_profile(caller, username).await?;
        tracing::info!(owner = %caller, "Profile updated");
        Ok(())
    }

    /// Look up the profile of `who`; `None` if it was never set.
    pub async fn get_user_profile(&self, who: &Identity) -> StoreResult<Option<UserProfile>> {
        self.store.get_profile(who).await
    }

    /// The current username of `who`, if any.
    pub async fn username_of(&self, who: &Identity) -> StoreResult<Option<String>> {
        Ok(self.get_user_profile(who).await?.map(|p| p.username))
    }
}

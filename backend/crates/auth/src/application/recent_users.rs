//! Recent Users
//!
//! Emails that recently signed up or logged in on this device, most recent
//! first. Kept in local storage as a JSON array; storage problems never
//! surface to the caller.

use std::sync::Arc;

use platform::storage::KeyValueStore;

use crate::application::config::AuthConfig;

/// Recently used emails
#[derive(Clone)]
pub struct RecentUsers {
    store: Arc<dyn KeyValueStore>,
    key: String,
    limit: usize,
}

impl RecentUsers {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            key: config.recent_users_key.clone(),
            limit: config.recent_users_limit,
        }
    }

    /// Stored emails, most recent first
    pub fn list(&self) -> Vec<String> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read recent users");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(emails) => emails,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Ignoring malformed recent users");
                Vec::new()
            }
        }
    }

    /// Move `email` to the front, dropping duplicates and the oldest overflow
    pub fn add(&self, email: &str) {
        let email = email.trim();
        if email.is_empty() {
            return;
        }

        let mut emails = self.list();
        emails.retain(|e| e != email);
        emails.insert(0, email.to_string());
        emails.truncate(self.limit);

        let encoded = match serde_json::to_string(&emails) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode recent users");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.key, &encoded) {
            tracing::warn!(key = %self.key, error = %e, "Failed to save recent users");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "Failed to clear recent users");
        }
    }
}

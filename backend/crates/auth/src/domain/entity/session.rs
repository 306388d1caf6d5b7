//! Auth Session Entity
//!
//! Token pair plus the identity it belongs to, as returned by the backend.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::entity::identity::Identity;

/// Refresh this many seconds before the access token actually expires
const EXPIRY_MARGIN_SECS: i64 = 10;

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Backend session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: i64,
    /// Unix timestamp (seconds) at which the access token expires
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: Identity,
}

impl Session {
    /// Fill in `expires_at` from `expires_in` when the backend omitted it
    pub fn with_expiry(mut self) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }

    /// Whether the access token is expired (or about to be) at `now_secs`
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now_secs + EXPIRY_MARGIN_SECS >= expires_at,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"***")
            .field("refresh_token", &"***")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

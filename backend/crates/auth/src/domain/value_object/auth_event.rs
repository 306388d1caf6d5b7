//! Auth Event Value Object
//!
//! Session transitions reported by the backend auth subsystem.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Kind of session transition
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    /// Session restored from storage when the client starts
    #[display("INITIAL_SESSION")]
    InitialSession,
    #[display("SIGNED_IN")]
    SignedIn,
    #[display("SIGNED_OUT")]
    SignedOut,
    #[display("TOKEN_REFRESHED")]
    TokenRefreshed,
}

impl AuthEvent {
    /// Whether a session exists after this transition
    pub const fn has_session(&self) -> bool {
        !matches!(self, AuthEvent::SignedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_wire_name() {
        for event in [
            AuthEvent::InitialSession,
            AuthEvent::SignedIn,
            AuthEvent::SignedOut,
            AuthEvent::TokenRefreshed,
        ] {
            let wire = serde_json::to_value(event).unwrap();
            assert_eq!(wire, serde_json::Value::String(event.to_string()));
        }
    }

    #[test]
    fn test_has_session() {
        assert!(AuthEvent::SignedIn.has_session());
        assert!(!AuthEvent::SignedOut.has_session());
    }
}

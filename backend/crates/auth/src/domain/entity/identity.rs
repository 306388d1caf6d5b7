//! Identity Entity
//!
//! The authenticated principal as issued by the backend. The client only
//! ever reads it; it is never constructed from user input.

use kernel::id::UserId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::value_object::email::Email;

/// Authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend user id (owner key of every record)
    pub id: UserId,
    /// Email, absent for phone-only accounts
    #[serde(default, deserialize_with = "non_empty_email")]
    pub email: Option<Email>,
}

impl Identity {
    pub fn new(id: UserId, email: Option<Email>) -> Self {
        Self { id, email }
    }

    pub fn email_str(&self) -> Option<&str> {
        self.email.as_ref().map(Email::as_str)
    }
}

fn non_empty_email<'de, D>(deserializer: D) -> Result<Option<Email>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|e| !e.trim().is_empty())
        .map(Email::from_backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_user_ignores_extra_fields() {
        let identity: Identity = serde_json::from_value(json!({
            "id": "7d3b1c4e-0a7f-4a8e-9d61-2f1f0b0b5a11",
            "aud": "authenticated",
            "role": "authenticated",
            "email": "a@x.com",
            "app_metadata": { "provider": "email" }
        }))
        .unwrap();

        assert_eq!(identity.id.to_string(), "7d3b1c4e-0a7f-4a8e-9d61-2f1f0b0b5a11");
        assert_eq!(identity.email_str(), Some("a@x.com"));
    }

    #[test]
    fn test_blank_or_missing_email_is_none() {
        let blank: Identity = serde_json::from_value(json!({
            "id": "7d3b1c4e-0a7f-4a8e-9d61-2f1f0b0b5a11",
            "email": ""
        }))
        .unwrap();
        assert!(blank.email.is_none());

        let missing: Identity = serde_json::from_value(json!({
            "id": "7d3b1c4e-0a7f-4a8e-9d61-2f1f0b0b5a11"
        }))
        .unwrap();
        assert!(missing.email.is_none());
    }
}

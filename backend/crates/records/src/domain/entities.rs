//! Domain Entities
//!
//! Rows of the `calculations` and `profiles` tables and the payloads used
//! to write them.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::value_objects::CalculationId;

/// Readings and results of one bill calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Billing month label, e.g. `2024-03`
    pub month: String,
    pub previous_reading: f64,
    pub current_reading: f64,
    /// Price per kWh
    pub rate: f64,
    pub bill_amount: f64,
    pub kwh_used: f64,
}

/// Stored calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub id: CalculationId,
    pub user_id: UserId,
    pub month: String,
    pub previous_reading: f64,
    pub current_reading: f64,
    pub rate: f64,
    pub bill_amount: f64,
    pub kwh_used: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Calculation {
    /// Build a row from its parts (used by stores that assign ids themselves)
    pub fn new(
        id: CalculationId,
        user_id: UserId,
        input: &CalculationInput,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            month: input.month.clone(),
            previous_reading: input.previous_reading,
            current_reading: input.current_reading,
            rate: input.rate,
            bill_amount: input.bill_amount,
            kwh_used: input.kwh_used,
            created_at,
            updated_at: None,
        }
    }

    /// Overwrite the editable columns
    pub fn apply(&mut self, input: &CalculationInput, updated_at: DateTime<Utc>) {
        self.month = input.month.clone();
        self.previous_reading = input.previous_reading;
        self.current_reading = input.current_reading;
        self.rate = input.rate;
        self.bill_amount = input.bill_amount;
        self.kwh_used = input.kwh_used;
        self.updated_at = Some(updated_at);
    }
}

/// Insert payload for `calculations`
#[derive(Debug, Serialize)]
pub struct NewCalculation<'a> {
    pub user_id: UserId,
    #[serde(flatten)]
    pub input: &'a CalculationInput,
}

/// Update payload for `calculations`
#[derive(Debug, Serialize)]
pub struct CalculationUpdate<'a> {
    #[serde(flatten)]
    pub input: &'a CalculationInput,
    pub updated_at: DateTime<Utc>,
}

/// Stored profile; `id` is the owner's user id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// Columns left NULL by the backend read as empty text
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default())
}

/// Profile fields as entered by the user; blanks fall back to defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl ProfileDraft {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Resolve defaults against the owner's identity
    ///
    /// email: given, else the account email, else empty.
    /// full_name: given, else the email's local part, else `User`.
    pub fn into_row(self, owner: UserId, account_email: Option<&str>) -> ProfileRow {
        let email = non_blank(self.email)
            .or_else(|| non_blank(account_email.map(str::to_string)))
            .unwrap_or_default();

        let full_name = non_blank(self.full_name)
            .or_else(|| {
                email
                    .split('@')
                    .next()
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string());

        ProfileRow {
            id: owner,
            email,
            full_name,
            phone: self.phone.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Upsert payload for `profiles`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRow {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub address: String,
}

/// Editable profile fields; written as given
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub full_name: String,
    pub phone: String,
    pub address: String,
}

/// Update payload for `profiles`
#[derive(Debug, Serialize)]
pub struct ProfileUpdate<'a> {
    #[serde(flatten)]
    pub changes: &'a ProfileChanges,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> CalculationInput {
        CalculationInput {
            month: "2024-03".to_string(),
            previous_reading: 1200.0,
            current_reading: 1350.5,
            rate: 0.25,
            bill_amount: 37.63,
            kwh_used: 150.5,
        }
    }

    #[test]
    fn test_calculation_from_backend_row() {
        let calc: Calculation = serde_json::from_value(json!({
            "id": 5,
            "user_id": "7d3b1c4e-0a7f-4a8e-9d61-2f1f0b0b5a11",
            "month": "2024-03",
            "previous_reading": 1200,
            "current_reading": 1350.5,
            "rate": 0.25,
            "bill_amount": 37.63,
            "kwh_used": 150.5,
            "created_at": "2024-03-31T10:00:00.123456+00:00",
            "updated_at": null
        }))
        .unwrap();

        assert_eq!(calc.id, CalculationId::new(5));
        assert_eq!(calc.previous_reading, 1200.0);
        assert!(calc.updated_at.is_none());
    }

    #[test]
    fn test_insert_payload_is_flat() {
        let owner = UserId::new();
        let input = input();
        let value = serde_json::to_value(NewCalculation {
            user_id: owner,
            input: &input,
        })
        .unwrap();

        assert_eq!(value["user_id"], json!(owner.to_string()));
        assert_eq!(value["month"], json!("2024-03"));
        assert_eq!(value["kwh_used"], json!(150.5));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_apply_stamps_updated_at() {
        let mut calc = Calculation::new(CalculationId::new(1), UserId::new(), &input(), Utc::now());
        let mut changed = input();
        changed.rate = 0.3;
        let now = Utc::now();

        calc.apply(&changed, now);
        assert_eq!(calc.rate, 0.3);
        assert_eq!(calc.updated_at, Some(now));
    }

    #[test]
    fn test_profile_row_with_null_columns() {
        let profile: Profile = serde_json::from_value(json!({
            "id": "7d3b1c4e-0a7f-4a8e-9d61-2f1f0b0b5a11",
            "email": "jane@x.com",
            "full_name": null,
            "phone": null,
            "address": null,
            "created_at": "2024-03-31T10:00:00+00:00",
            "updated_at": null
        }))
        .unwrap();

        assert_eq!(profile.email, "jane@x.com");
        assert_eq!(profile.full_name, "");
        assert_eq!(profile.phone, "");
        assert_eq!(profile.address, "");
    }

    #[test]
    fn test_profile_defaults_from_email() {
        let owner = UserId::new();
        let row = ProfileDraft::new("jane@x.com").into_row(owner, None);
        assert_eq!(row.id, owner);
        assert_eq!(row.email, "jane@x.com");
        assert_eq!(row.full_name, "jane");
        assert_eq!(row.phone, "");
        assert_eq!(row.address, "");
    }

    #[test]
    fn test_profile_defaults_from_account() {
        let row = ProfileDraft::default().into_row(UserId::new(), Some("acct@x.com"));
        assert_eq!(row.email, "acct@x.com");
        assert_eq!(row.full_name, "acct");
    }

    #[test]
    fn test_profile_defaults_without_any_email() {
        let row = ProfileDraft::new("  ").into_row(UserId::new(), None);
        assert_eq!(row.email, "");
        assert_eq!(row.full_name, "User");
    }

    #[test]
    fn test_profile_given_values_win() {
        let row = ProfileDraft::new("jane@x.com")
            .with_full_name("Jane Doe")
            .with_phone("555-0100")
            .with_address("1 Main St")
            .into_row(UserId::new(), Some("other@x.com"));
        assert_eq!(row.email, "jane@x.com");
        assert_eq!(row.full_name, "Jane Doe");
        assert_eq!(row.phone, "555-0100");
        assert_eq!(row.address, "1 Main St");
    }
}

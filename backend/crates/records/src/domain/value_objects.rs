//! Value Objects

use derive_more::Display;
use kernel::id::UserId;
use serde::{Deserialize, Serialize};

/// Primary key of a calculation row (bigint identity column)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationId(i64);

impl CalculationId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for CalculationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Record id together with the owner allowed to touch it
///
/// Every single-record read, update and delete filters on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedKey {
    pub id: CalculationId,
    pub owner: UserId,
}

impl OwnedKey {
    pub fn new(id: CalculationId, owner: UserId) -> Self {
        Self { id, owner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculation_id_is_a_plain_number_on_the_wire() {
        let id: CalculationId = serde_json::from_str("42").unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(id.to_string(), "42");
    }
}

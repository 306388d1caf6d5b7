//! Repository Traits
//!
//! Interfaces to the record store. Implementations are in the infra layer.
//! Every method takes the owner explicitly; no call can reach another
//! owner's rows.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entities::{
    Calculation, CalculationInput, Profile, ProfileChanges, ProfileRow,
};
use crate::domain::value_objects::OwnedKey;
use crate::error::RecordResult;

/// Calculation repository trait
#[trait_variant::make(CalculationRepository: Send)]
pub trait LocalCalculationRepository {
    /// Insert a calculation owned by `owner`
    async fn insert(&self, owner: UserId, input: &CalculationInput) -> RecordResult<Calculation>;

    /// Owner's calculations, newest first, optionally limited to one month
    async fn list(&self, owner: UserId, month: Option<&str>) -> RecordResult<Vec<Calculation>>;

    /// Single calculation matching id and owner
    async fn find(&self, key: OwnedKey) -> RecordResult<Option<Calculation>>;

    /// Overwrite a calculation matching id and owner
    ///
    /// `None` when no row matched.
    async fn update(
        &self,
        key: OwnedKey,
        input: &CalculationInput,
        updated_at: DateTime<Utc>,
    ) -> RecordResult<Option<Calculation>>;

    /// Delete a calculation matching id and owner; `false` when no row matched
    async fn delete(&self, key: OwnedKey) -> RecordResult<bool>;
}

/// Profile repository trait
#[trait_variant::make(ProfileRepository: Send)]
pub trait LocalProfileRepository {
    /// Insert or overwrite the profile keyed by `row.id` in one statement
    async fn upsert(&self, row: &ProfileRow) -> RecordResult<Profile>;

    async fn find(&self, owner: UserId) -> RecordResult<Option<Profile>>;

    /// Update the editable fields; `None` when the owner has no profile
    async fn update(
        &self,
        owner: UserId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> RecordResult<Option<Profile>>;
}

//! In-Memory Repository Implementations
//!
//! Local stand-ins for the record store. They apply the same owner filters
//! as the hosted store and count every call, which makes them usable as test
//! doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entities::{
    Calculation, CalculationInput, Profile, ProfileChanges, ProfileRow,
};
use crate::domain::repository::{CalculationRepository, ProfileRepository};
use crate::domain::value_objects::{CalculationId, OwnedKey};
use crate::error::RecordResult;

#[derive(Debug, Default)]
struct CalculationTable {
    last_id: i64,
    rows: Vec<Calculation>,
}

/// In-memory `calculations` table
#[derive(Debug, Default)]
pub struct MemoryCalculationRepository {
    table: Mutex<CalculationTable>,
    calls: AtomicUsize,
}

impl MemoryCalculationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every stored row regardless of owner
    pub fn rows(&self) -> Vec<Calculation> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CalculationTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn matches(row: &Calculation, key: OwnedKey) -> bool {
    row.id == key.id && row.user_id == key.owner
}

impl CalculationRepository for MemoryCalculationRepository {
    async fn insert(&self, owner: UserId, input: &CalculationInput) -> RecordResult<Calculation> {
        self.record_call();
        let mut table = self.lock();
        table.last_id += 1;
        let row = Calculation::new(CalculationId::new(table.last_id), owner, input, Utc::now());
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn list(&self, owner: UserId, month: Option<&str>) -> RecordResult<Vec<Calculation>> {
        self.record_call();
        let mut rows: Vec<Calculation> = self
            .lock()
            .rows
            .iter()
            .filter(|row| row.user_id == owner)
            .filter(|row| month.is_none_or(|m| row.month == m))
            .cloned()
            .collect();

        // Newest first; ids break ties between rows created in the same instant
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn find(&self, key: OwnedKey) -> RecordResult<Option<Calculation>> {
        self.record_call();
        Ok(self.lock().rows.iter().find(|row| matches(row, key)).cloned())
    }

    async fn update(
        &self,
        key: OwnedKey,
        input: &CalculationInput,
        updated_at: DateTime<Utc>,
    ) -> RecordResult<Option<Calculation>> {
        self.record_call();
        let mut table = self.lock();
        Ok(table
            .rows
            .iter_mut()
            .find(|row| matches(row, key))
            .map(|row| {
                row.apply(input, updated_at);
                row.clone()
            }))
    }

    async fn delete(&self, key: OwnedKey) -> RecordResult<bool> {
        self.record_call();
        let mut table = self.lock();
        let before = table.rows.len();
        table.rows.retain(|row| !matches(row, key));
        Ok(table.rows.len() != before)
    }
}

/// In-memory `profiles` table
#[derive(Debug, Default)]
pub struct MemoryProfileRepository {
    rows: Mutex<HashMap<UserId, Profile>>,
    calls: AtomicUsize,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of stored profiles
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Profile>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl ProfileRepository for MemoryProfileRepository {
    async fn upsert(&self, row: &ProfileRow) -> RecordResult<Profile> {
        self.record_call();
        let mut rows = self.lock();
        let profile = rows.entry(row.id).or_insert_with(|| Profile {
            id: row.id,
            email: String::new(),
            full_name: String::new(),
            phone: String::new(),
            address: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        });

        profile.email = row.email.clone();
        profile.full_name = row.full_name.clone();
        profile.phone = row.phone.clone();
        profile.address = row.address.clone();
        Ok(profile.clone())
    }

    async fn find(&self, owner: UserId) -> RecordResult<Option<Profile>> {
        self.record_call();
        Ok(self.lock().get(&owner).cloned())
    }

    async fn update(
        &self,
        owner: UserId,
        changes: &ProfileChanges,
        updated_at: DateTime<Utc>,
    ) -> RecordResult<Option<Profile>> {
        self.record_call();
        Ok(self.lock().get_mut(&owner).map(|profile| {
            profile.full_name = changes.full_name.clone();
            profile.phone = changes.phone.clone();
            profile.address = changes.address.clone();
            profile.updated_at = Some(updated_at);
            profile.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(month: &str, bill: f64) -> CalculationInput {
        CalculationInput {
            month: month.to_string(),
            previous_reading: 100.0,
            current_reading: 200.0,
            rate: 0.5,
            bill_amount: bill,
            kwh_used: 100.0,
        }
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_owner_scoped() {
        let repo = MemoryCalculationRepository::new();
        let (u1, u2) = (UserId::new(), UserId::new());
        repo.insert(u1, &input("2024-01", 10.0)).await.unwrap();
        repo.insert(u2, &input("2024-01", 99.0)).await.unwrap();
        repo.insert(u1, &input("2024-02", 20.0)).await.unwrap();

        let rows = repo.list(u1, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bill_amount, 20.0);

        let january = repo.list(u1, Some("2024-01")).await.unwrap();
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].bill_amount, 10.0);
        assert_eq!(repo.calls(), 5);
    }

    #[tokio::test]
    async fn test_other_owner_cannot_touch_row() {
        let repo = MemoryCalculationRepository::new();
        let (u1, u2) = (UserId::new(), UserId::new());
        let row = repo.insert(u2, &input("2024-01", 10.0)).await.unwrap();
        let foreign = OwnedKey::new(row.id, u1);

        assert!(repo.find(foreign).await.unwrap().is_none());
        assert!(repo.update(foreign, &input("x", 0.0), Utc::now()).await.unwrap().is_none());
        assert!(!repo.delete(foreign).await.unwrap());
        assert_eq!(repo.rows(), vec![row]);
    }

    #[tokio::test]
    async fn test_profile_upsert_keeps_one_row() {
        let repo = MemoryProfileRepository::new();
        let owner = UserId::new();
        let row = ProfileRow {
            id: owner,
            email: "a@x.com".to_string(),
            full_name: "a".to_string(),
            phone: String::new(),
            address: String::new(),
        };

        let first = repo.upsert(&row).await.unwrap();
        let second = repo
            .upsert(&ProfileRow {
                full_name: "Alice".to_string(),
                ..row
            })
            .await
            .unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(second.full_name, "Alice");
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_profile_update_without_profile() {
        let repo = MemoryProfileRepository::new();
        let updated = repo
            .update(UserId::new(), &ProfileChanges::default(), Utc::now())
            .await
            .unwrap();
        assert!(updated.is_none());
        assert!(repo.is_empty());
    }
}

//! Calculation Use Cases
//!
//! Every operation resolves the signed-in user first and fails with
//! `User not authenticated` before touching the store when there is none.

use std::sync::Arc;

use auth::{AuthGateway, SessionAccessor};
use chrono::Utc;
use kernel::envelope::{self, Envelope, Messages};
use kernel::id::UserId;

use crate::domain::entities::{Calculation, CalculationInput};
use crate::domain::repository::CalculationRepository;
use crate::domain::value_objects::{CalculationId, OwnedKey};
use crate::error::{RecordError, RecordResult};

const SAVE: Messages = Messages::new("Calculation saved successfully!", "Failed to save calculation");
const LIST: Messages = Messages::new(
    "Calculations retrieved successfully!",
    "Failed to retrieve calculations",
);
const GET: Messages = Messages::new(
    "Calculation retrieved successfully!",
    "Failed to retrieve calculation",
);
const UPDATE: Messages = Messages::new(
    "Calculation updated successfully!",
    "Failed to update calculation",
);
const DELETE: Messages = Messages::new(
    "Calculation deleted successfully!",
    "Failed to delete calculation",
);

const ENTITY: &str = "Calculation";

/// Calculation use cases
pub struct CalculationService<G, R>
where
    G: AuthGateway,
    R: CalculationRepository,
{
    accessor: SessionAccessor<G>,
    repo: Arc<R>,
}

impl<G, R> CalculationService<G, R>
where
    G: AuthGateway,
    R: CalculationRepository,
{
    pub fn new(accessor: SessionAccessor<G>, repo: Arc<R>) -> Self {
        Self { accessor, repo }
    }

    async fn owner(&self) -> RecordResult<UserId> {
        self.accessor
            .current_user_id()
            .await
            .ok_or(RecordError::NotAuthenticated)
    }

    pub async fn save_calculation(&self, input: CalculationInput) -> Envelope<Calculation> {
        envelope::run("save_calculation", SAVE, async {
            let owner = self.owner().await?;
            self.repo.insert(owner, &input).await
        })
        .await
    }

    /// All of the user's calculations, newest first
    pub async fn user_calculations(&self) -> Envelope<Vec<Calculation>> {
        envelope::run("user_calculations", LIST, self.list(None)).await
    }

    pub async fn calculations_by_month(&self, month: &str) -> Envelope<Vec<Calculation>> {
        envelope::run("calculations_by_month", LIST, self.list(Some(month))).await
    }

    pub async fn calculation_by_id(&self, id: CalculationId) -> Envelope<Calculation> {
        envelope::run("calculation_by_id", GET, async {
            let key = OwnedKey::new(id, self.owner().await?);
            self.repo
                .find(key)
                .await?
                .ok_or(RecordError::NotFound(ENTITY))
        })
        .await
    }

    pub async fn update_calculation(
        &self,
        id: CalculationId,
        input: CalculationInput,
    ) -> Envelope<Calculation> {
        envelope::run("update_calculation", UPDATE, async {
            let key = OwnedKey::new(id, self.owner().await?);
            self.repo
                .update(key, &input, Utc::now())
                .await?
                .ok_or(RecordError::NotFound(ENTITY))
        })
        .await
    }

    pub async fn delete_calculation(&self, id: CalculationId) -> Envelope<()> {
        envelope::run_action("delete_calculation", DELETE, async {
            let key = OwnedKey::new(id, self.owner().await?);
            if self.repo.delete(key).await? {
                Ok(())
            } else {
                Err(RecordError::NotFound(ENTITY))
            }
        })
        .await
    }

    /// Bill amount of the newest calculation, `0.0` when there is none
    pub async fn last_bill_amount(&self) -> f64 {
        self.latest().await.map_or(0.0, |c| c.bill_amount)
    }

    /// Energy used in the newest calculation, `0.0` when there is none
    pub async fn last_kwh_used(&self) -> f64 {
        self.latest().await.map_or(0.0, |c| c.kwh_used)
    }

    async fn latest(&self) -> Option<Calculation> {
        self.user_calculations()
            .await
            .data_or_default()
            .into_iter()
            .next()
    }

    async fn list(&self, month: Option<&str>) -> RecordResult<Vec<Calculation>> {
        let owner = self.owner().await?;
        self.repo.list(owner, month).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryCalculationRepository;
    use auth::{Identity, MemoryAuthGateway};

    struct Fixture {
        gateway: Arc<MemoryAuthGateway>,
        repo: Arc<MemoryCalculationRepository>,
        service: CalculationService<MemoryAuthGateway, MemoryCalculationRepository>,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(MemoryAuthGateway::new());
        let repo = Arc::new(MemoryCalculationRepository::new());
        let service = CalculationService::new(
            SessionAccessor::new(Arc::clone(&gateway)),
            Arc::clone(&repo),
        );
        Fixture {
            gateway,
            repo,
            service,
        }
    }

    fn sign_in(fixture: &Fixture, email: &str) -> Identity {
        let identity = fixture.gateway.register(email, "secret").unwrap();
        fixture.gateway.sign_in_as(&identity);
        identity
    }

    fn input(month: &str, bill: f64, kwh: f64) -> CalculationInput {
        CalculationInput {
            month: month.to_string(),
            previous_reading: 1000.0,
            current_reading: 1000.0 + kwh,
            rate: bill / kwh,
            bill_amount: bill,
            kwh_used: kwh,
        }
    }

    #[tokio::test]
    async fn test_no_operation_reaches_store_without_identity() {
        let f = fixture();
        let id = CalculationId::new(1);

        let save = f.service.save_calculation(input("2024-03", 30.0, 120.0)).await;
        assert!(save.data.is_none());
        let list = f.service.user_calculations().await;
        assert!(list.data.is_none());
        let by_month = f.service.calculations_by_month("2024-03").await;
        assert!(by_month.data.is_none());
        let by_id = f.service.calculation_by_id(id).await;
        assert!(by_id.data.is_none());
        let update = f
            .service
            .update_calculation(id, input("2024-03", 45.0, 150.0))
            .await;
        assert!(update.data.is_none());
        let delete = f.service.delete_calculation(id).await;

        for (operation, success, message) in [
            ("save_calculation", save.success, save.message),
            ("user_calculations", list.success, list.message),
            ("calculations_by_month", by_month.success, by_month.message),
            ("calculation_by_id", by_id.success, by_id.message),
            ("update_calculation", update.success, update.message),
            ("delete_calculation", delete.success, delete.message),
        ] {
            assert!(!success, "{operation} succeeded without identity");
            assert_eq!(message, "User not authenticated", "{operation}");
        }

        assert_eq!(f.service.last_bill_amount().await, 0.0);
        assert_eq!(f.service.last_kwh_used().await, 0.0);
        assert_eq!(f.repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_save_then_list() {
        let f = fixture();
        let identity = sign_in(&f, "a@x.com");

        let saved = f.service.save_calculation(input("2024-03", 30.0, 120.0)).await;
        assert!(saved.success);
        assert_eq!(saved.message, "Calculation saved successfully!");
        assert_eq!(saved.data.as_ref().map(|c| c.user_id), Some(identity.id));

        let list = f.service.user_calculations().await;
        assert_eq!(list.message, "Calculations retrieved successfully!");
        assert_eq!(list.data.map(|rows| rows.len()), Some(1));
    }

    #[tokio::test]
    async fn test_by_month_and_by_id() {
        let f = fixture();
        sign_in(&f, "a@x.com");
        f.service.save_calculation(input("2024-02", 20.0, 80.0)).await;
        let march = f
            .service
            .save_calculation(input("2024-03", 30.0, 120.0))
            .await
            .into_data()
            .unwrap();

        let rows = f.service.calculations_by_month("2024-03").await.data_or_default();
        assert_eq!(rows, vec![march.clone()]);

        let found = f.service.calculation_by_id(march.id).await;
        assert_eq!(found.message, "Calculation retrieved successfully!");
        assert_eq!(found.data, Some(march));

        let missing = f.service.calculation_by_id(CalculationId::new(999)).await;
        assert!(!missing.success);
        assert_eq!(missing.message, "Calculation not found");
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let f = fixture();
        sign_in(&f, "a@x.com");
        let saved = f
            .service
            .save_calculation(input("2024-03", 30.0, 120.0))
            .await
            .into_data()
            .unwrap();

        let env = f
            .service
            .update_calculation(saved.id, input("2024-03", 45.0, 150.0))
            .await;
        assert!(env.success);
        assert_eq!(env.message, "Calculation updated successfully!");

        let updated = env.into_data().unwrap();
        assert_eq!(updated.bill_amount, 45.0);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.created_at, saved.created_at);
    }

    #[tokio::test]
    async fn test_delete_of_foreign_record_fails_and_keeps_it() {
        let f = fixture();
        sign_in(&f, "owner@x.com");
        let theirs = f
            .service
            .save_calculation(input("2024-03", 30.0, 120.0))
            .await
            .into_data()
            .unwrap();

        sign_in(&f, "intruder@x.com");
        let env = f.service.delete_calculation(theirs.id).await;
        assert!(!env.success);
        assert!(env.data.is_none());

        let env = f
            .service
            .update_calculation(theirs.id, input("2024-03", 0.0, 1.0))
            .await;
        assert!(!env.success);
        assert!(env.data.is_none());

        assert_eq!(f.repo.rows(), vec![theirs]);
    }

    #[tokio::test]
    async fn test_delete_own_record() {
        let f = fixture();
        sign_in(&f, "a@x.com");
        let saved = f
            .service
            .save_calculation(input("2024-03", 30.0, 120.0))
            .await
            .into_data()
            .unwrap();

        let env = f.service.delete_calculation(saved.id).await;
        assert!(env.success);
        assert_eq!(env.message, "Calculation deleted successfully!");
        assert!(f.repo.rows().is_empty());
    }

    #[tokio::test]
    async fn test_last_values() {
        let f = fixture();
        assert_eq!(f.service.last_bill_amount().await, 0.0);

        sign_in(&f, "a@x.com");
        assert_eq!(f.service.last_kwh_used().await, 0.0);

        f.service.save_calculation(input("2024-02", 20.0, 80.0)).await;
        f.service.save_calculation(input("2024-03", 30.0, 120.0)).await;
        assert_eq!(f.service.last_bill_amount().await, 30.0);
        assert_eq!(f.service.last_kwh_used().await, 120.0);
    }

    #[tokio::test]
    async fn test_unreachable_auth_reads_as_signed_out() {
        let f = fixture();
        sign_in(&f, "a@x.com");
        f.gateway.set_unreachable(true);

        let env = f.service.user_calculations().await;
        assert!(!env.success);
        assert_eq!(env.message, "User not authenticated");
        assert!(env.data_or_default().is_empty());
    }
}

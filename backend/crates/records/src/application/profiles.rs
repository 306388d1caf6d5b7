//! Profile Use Cases
//!
//! One profile per user, keyed by the user id. Saving is a single upsert,
//! so concurrent saves for the same user both succeed and leave one row.

use std::sync::Arc;

use auth::{AuthGateway, Identity, SessionAccessor};
use chrono::Utc;
use kernel::envelope::{self, Envelope, Messages};

use crate::domain::entities::{Profile, ProfileChanges, ProfileDraft};
use crate::domain::repository::ProfileRepository;
use crate::error::{RecordError, RecordResult};

const SAVE: Messages = Messages::new("Profile saved successfully!", "Failed to save profile");
const GET: Messages = Messages::new("Profile retrieved successfully!", "Failed to retrieve profile");
const UPDATE: Messages = Messages::new("Profile updated successfully!", "Failed to update profile");

const ENTITY: &str = "Profile";

/// Profile use cases
pub struct ProfileService<G, R>
where
    G: AuthGateway,
    R: ProfileRepository,
{
    accessor: SessionAccessor<G>,
    repo: Arc<R>,
}

impl<G, R> ProfileService<G, R>
where
    G: AuthGateway,
    R: ProfileRepository,
{
    pub fn new(accessor: SessionAccessor<G>, repo: Arc<R>) -> Self {
        Self { accessor, repo }
    }

    async fn identity(&self) -> RecordResult<Identity> {
        self.accessor
            .current_identity()
            .await
            .ok_or(RecordError::NotAuthenticated)
    }

    /// Create the user's profile, or overwrite it if one exists
    pub async fn save_profile(&self, draft: ProfileDraft) -> Envelope<Profile> {
        envelope::run("save_profile", SAVE, async {
            let identity = self.identity().await?;
            let row = draft.into_row(identity.id, identity.email_str());
            self.repo.upsert(&row).await
        })
        .await
    }

    pub async fn user_profile(&self) -> Envelope<Profile> {
        envelope::run("user_profile", GET, async {
            let identity = self.identity().await?;
            self.repo
                .find(identity.id)
                .await?
                .ok_or(RecordError::NotFound(ENTITY))
        })
        .await
    }

    pub async fn update_profile(&self, changes: ProfileChanges) -> Envelope<Profile> {
        envelope::run("update_profile", UPDATE, async {
            let identity = self.identity().await?;
            self.repo
                .update(identity.id, &changes, Utc::now())
                .await?
                .ok_or(RecordError::NotFound(ENTITY))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryProfileRepository;
    use auth::MemoryAuthGateway;

    fn service() -> (
        Arc<MemoryAuthGateway>,
        Arc<MemoryProfileRepository>,
        ProfileService<MemoryAuthGateway, MemoryProfileRepository>,
    ) {
        let gateway = Arc::new(MemoryAuthGateway::new());
        let repo = Arc::new(MemoryProfileRepository::new());
        let service = ProfileService::new(
            SessionAccessor::new(Arc::clone(&gateway)),
            Arc::clone(&repo),
        );
        (gateway, repo, service)
    }

    fn sign_in(gateway: &MemoryAuthGateway, email: &str) -> Identity {
        let identity = gateway.register(email, "secret").unwrap();
        gateway.sign_in_as(&identity);
        identity
    }

    #[tokio::test]
    async fn test_no_operation_reaches_store_without_identity() {
        let (_, repo, service) = service();

        let save = service.save_profile(ProfileDraft::new("a@x.com")).await;
        let read = service.user_profile().await;
        let update = service
            .update_profile(ProfileChanges {
                full_name: "Jane Doe".to_string(),
                ..Default::default()
            })
            .await;

        for (operation, env) in [
            ("save_profile", save),
            ("user_profile", read),
            ("update_profile", update),
        ] {
            assert!(!env.success, "{operation} succeeded without identity");
            assert_eq!(env.message, "User not authenticated", "{operation}");
            assert!(env.data.is_none(), "{operation}");
        }
        assert_eq!(repo.calls(), 0);
    }

    #[tokio::test]
    async fn test_save_uses_account_defaults() {
        let (gateway, _, service) = service();
        let identity = sign_in(&gateway, "jane@x.com");

        let env = service.save_profile(ProfileDraft::default()).await;
        assert!(env.success);
        assert_eq!(env.message, "Profile saved successfully!");

        let profile = env.into_data().unwrap();
        assert_eq!(profile.id, identity.id);
        assert_eq!(profile.email, "jane@x.com");
        assert_eq!(profile.full_name, "jane");
    }

    #[tokio::test]
    async fn test_second_save_keeps_one_profile() {
        let (gateway, repo, service) = service();
        sign_in(&gateway, "jane@x.com");

        assert!(service.save_profile(ProfileDraft::new("jane@x.com")).await.success);
        let second = service
            .save_profile(ProfileDraft::new("jane@x.com").with_full_name("Jane Doe"))
            .await;
        assert!(second.success);
        assert_eq!(repo.len(), 1);

        let read = service.user_profile().await;
        assert_eq!(read.message, "Profile retrieved successfully!");
        assert_eq!(read.into_data().map(|p| p.full_name).as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let (gateway, _, service) = service();
        sign_in(&gateway, "jane@x.com");

        let read = service.user_profile().await;
        assert!(!read.success);
        assert_eq!(read.message, "Profile not found");

        let update = service.update_profile(ProfileChanges::default()).await;
        assert!(!update.success);
        assert_eq!(update.message, "Profile not found");
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (gateway, _, service) = service();
        sign_in(&gateway, "jane@x.com");
        service.save_profile(ProfileDraft::new("jane@x.com")).await;

        let env = service
            .update_profile(ProfileChanges {
                full_name: "Jane Doe".to_string(),
                phone: "555-0100".to_string(),
                address: "1 Main St".to_string(),
            })
            .await;
        assert!(env.success);
        assert_eq!(env.message, "Profile updated successfully!");

        let profile = env.into_data().unwrap();
        assert_eq!(profile.phone, "555-0100");
        assert!(profile.updated_at.is_some());
    }
}

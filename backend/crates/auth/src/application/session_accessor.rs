//! Session Accessor
//!
//! Resolves the signed-in identity for every other component. Each call asks
//! the backend afresh; failures are logged and read as "not authenticated".

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::identity::Identity;
use crate::domain::gateway::AuthGateway;
use crate::error::AuthResult;

/// Current identity lookup
pub struct SessionAccessor<G>
where
    G: AuthGateway,
{
    gateway: Arc<G>,
}

impl<G> Clone for SessionAccessor<G>
where
    G: AuthGateway,
{
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<G> SessionAccessor<G>
where
    G: AuthGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Identity lookup that keeps the failure, for callers that redirect on it
    pub async fn probe(&self) -> AuthResult<Option<Identity>> {
        self.gateway.get_user().await
    }

    /// Signed-in identity, or `None`
    pub async fn current_identity(&self) -> Option<Identity> {
        match self.probe().await {
            Ok(identity) => identity,
            Err(e) => {
                e.log();
                None
            }
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current_identity().await.is_some()
    }

    pub async fn current_email(&self) -> Option<String> {
        self.current_identity()
            .await
            .and_then(|identity| identity.email_str().map(str::to_string))
    }

    pub async fn current_user_id(&self) -> Option<UserId> {
        self.current_identity().await.map(|identity| identity.id)
    }
}

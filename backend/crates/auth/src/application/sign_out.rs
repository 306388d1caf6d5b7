//! Sign Out Use Case
//!
//! Ends the current session.

use std::sync::Arc;

use kernel::envelope::{self, Envelope, Messages};

use crate::domain::gateway::AuthGateway;
use crate::error::AuthError;

const MESSAGES: Messages = Messages::new("Logged out successfully!", "Logout failed");

/// Sign out use case
pub struct SignOutUseCase<G>
where
    G: AuthGateway,
{
    gateway: Arc<G>,
}

impl<G> SignOutUseCase<G>
where
    G: AuthGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn execute(&self) -> Envelope<()> {
        envelope::run_action("sign_out", MESSAGES, async {
            self.gateway.sign_out().await?;
            tracing::info!("User signed out");
            Ok::<_, AuthError>(())
        })
        .await
    }
}

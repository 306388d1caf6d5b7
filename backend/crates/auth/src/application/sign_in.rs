//! Sign In Use Case
//!
//! Password login against the backend. The gateway keeps the resulting
//! session; the email is remembered for the login form.

use std::sync::Arc;

use kernel::envelope::{self, Envelope, Messages};
use serde::Serialize;

use crate::application::recent_users::RecentUsers;
use crate::domain::entity::{identity::Identity, session::Session};
use crate::domain::gateway::{AuthGateway, Credentials};
use crate::error::AuthResult;

const MESSAGES: Messages = Messages::new("Login successful!", "Login failed");

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug, Clone, Serialize)]
pub struct SignInOutput {
    pub user: Identity,
    pub session: Session,
}

/// Sign in use case
pub struct SignInUseCase<G>
where
    G: AuthGateway,
{
    gateway: Arc<G>,
    recent_users: RecentUsers,
}

impl<G> SignInUseCase<G>
where
    G: AuthGateway,
{
    pub fn new(gateway: Arc<G>, recent_users: RecentUsers) -> Self {
        Self {
            gateway,
            recent_users,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> Envelope<SignInOutput> {
        envelope::run("sign_in", MESSAGES, self.sign_in(input)).await
    }

    async fn sign_in(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let credentials = Credentials::new(&input.email, &input.password)?;
        let session = self.gateway.sign_in_with_password(&credentials).await?;

        // Remembered as typed for the login form
        self.recent_users.add(&input.email);

        tracing::info!(user_id = %session.user.id, "User signed in");

        Ok(SignInOutput {
            user: session.user.clone(),
            session,
        })
    }
}

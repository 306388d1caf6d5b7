//! Sign Up Use Case
//!
//! Registers a new account with the backend and remembers the email.

use std::sync::Arc;

use kernel::envelope::{self, Envelope, Messages};

use crate::application::recent_users::RecentUsers;
use crate::domain::gateway::{AuthGateway, Credentials, SignUpOutcome};
use crate::error::AuthResult;

const MESSAGES: Messages = Messages::new(
    "Sign up successful! Check your email for verification.",
    "Sign up failed",
);

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<G>
where
    G: AuthGateway,
{
    gateway: Arc<G>,
    recent_users: RecentUsers,
}

impl<G> SignUpUseCase<G>
where
    G: AuthGateway,
{
    pub fn new(gateway: Arc<G>, recent_users: RecentUsers) -> Self {
        Self {
            gateway,
            recent_users,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> Envelope<SignUpOutcome> {
        envelope::run("sign_up", MESSAGES, self.sign_up(input)).await
    }

    async fn sign_up(&self, input: SignUpInput) -> AuthResult<SignUpOutcome> {
        let credentials = Credentials::new(&input.email, &input.password)?;
        let outcome = self.gateway.sign_up(&credentials).await?;

        // Remembered as typed for the login form
        self.recent_users.add(&input.email);

        tracing::info!(
            user_id = ?outcome.user.as_ref().map(|u| u.id),
            confirmed = outcome.session.is_some(),
            "User signed up"
        );

        Ok(outcome)
    }
}

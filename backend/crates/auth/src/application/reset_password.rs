//! Reset Password Use Case
//!
//! Asks the backend to email a reset link pointing back at this site's
//! reset-password page.

use std::sync::Arc;

use kernel::envelope::{self, Envelope, Messages};
use platform::navigation::{Navigator, page_url};

use crate::application::config::AuthConfig;
use crate::domain::gateway::AuthGateway;
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

const MESSAGES: Messages = Messages::new("Password reset email sent!", "Password reset failed");

/// Reset password use case
pub struct ResetPasswordUseCase<G>
where
    G: AuthGateway,
{
    gateway: Arc<G>,
    navigator: Arc<dyn Navigator>,
    config: Arc<AuthConfig>,
}

impl<G> ResetPasswordUseCase<G>
where
    G: AuthGateway,
{
    pub fn new(gateway: Arc<G>, navigator: Arc<dyn Navigator>, config: Arc<AuthConfig>) -> Self {
        Self {
            gateway,
            navigator,
            config,
        }
    }

    /// Link target of the reset email
    pub fn redirect_url(&self) -> String {
        page_url(&self.navigator.origin(), &self.config.reset_password_page)
    }

    pub async fn execute(&self, email: &str) -> Envelope<()> {
        envelope::run_action("reset_password", MESSAGES, self.reset(email)).await
    }

    async fn reset(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email)?;
        let redirect_to = self.redirect_url();

        self.gateway
            .reset_password_for_email(&email, &redirect_to)
            .await?;

        tracing::info!(domain = email.domain(), "Password reset requested");
        Ok(())
    }
}

//! Page Guard
//!
//! Gatekeeper for protected pages: redirects visitors without a session to
//! the login page and turns logout links into real sign-outs.

use std::sync::Arc;

use kernel::envelope::Envelope;
use platform::navigation::{Navigator, is_same_page};

use crate::application::config::AuthConfig;
use crate::application::session_accessor::SessionAccessor;
use crate::application::sign_out::SignOutUseCase;
use crate::domain::gateway::AuthGateway;
use crate::presentation::logout_links::{PageLink, is_logout_link};

/// What became of a link click
#[derive(Debug)]
pub enum ClickOutcome {
    /// Ordinary link; the host follows its href
    Follow,
    /// Logout link; the click ran the logout operation instead
    LoggedOut(Envelope<()>),
}

/// Result of guarding a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProtection {
    pub authenticated: bool,
    /// Indices of the links whose clicks must be routed to [`PageGuard::handle_click`]
    pub intercepted: Vec<usize>,
}

/// Page guard
pub struct PageGuard<G>
where
    G: AuthGateway,
{
    accessor: SessionAccessor<G>,
    sign_out: SignOutUseCase<G>,
    navigator: Arc<dyn Navigator>,
    config: Arc<AuthConfig>,
}

impl<G> PageGuard<G>
where
    G: AuthGateway,
{
    pub fn new(gateway: Arc<G>, navigator: Arc<dyn Navigator>, config: Arc<AuthConfig>) -> Self {
        Self {
            accessor: SessionAccessor::new(Arc::clone(&gateway)),
            sign_out: SignOutUseCase::new(gateway),
            navigator,
            config,
        }
    }

    /// `true` when a session exists; otherwise redirect to the login page
    pub async fn require_auth(&self) -> bool {
        match self.accessor.probe().await {
            Ok(Some(identity)) => {
                tracing::debug!(user_id = %identity.id, "Page access granted");
                true
            }
            Ok(None) => {
                self.redirect_to_login();
                false
            }
            Err(e) => {
                e.log();
                self.redirect_to_login();
                false
            }
        }
    }

    /// Guard the page and pick out its logout links
    pub async fn protect_page(&self, links: &[PageLink]) -> PageProtection {
        if !self.require_auth().await {
            return PageProtection {
                authenticated: false,
                intercepted: Vec::new(),
            };
        }

        let intercepted = links
            .iter()
            .enumerate()
            .filter(|(_, link)| is_logout_link(link, &self.config.login_page))
            .map(|(index, _)| index)
            .collect();

        PageProtection {
            authenticated: true,
            intercepted,
        }
    }

    /// Sign out, then leave for the login page
    ///
    /// On failure the visitor stays on the page.
    pub async fn logout(&self) -> Envelope<()> {
        let envelope = self.sign_out.execute().await;
        if envelope.success {
            self.navigator.navigate(&self.config.login_page);
        }
        envelope
    }

    pub async fn handle_click(&self, link: &PageLink) -> ClickOutcome {
        if is_logout_link(link, &self.config.login_page) {
            ClickOutcome::LoggedOut(self.logout().await)
        } else {
            ClickOutcome::Follow
        }
    }

    fn redirect_to_login(&self) {
        let login_page = &self.config.login_page;
        if is_same_page(&self.navigator.current_path(), login_page) {
            return;
        }
        tracing::info!(page = %self.navigator.current_path(), "No session; redirecting to login");
        self.navigator.navigate(login_page);
    }
}

//! Auth Gateway Trait
//!
//! Interface to the backend auth subsystem. Implementations live in the
//! infrastructure layer (HTTP and in-memory).

use kernel::error::app_error::AppResult;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::entity::{identity::Identity, session::Session};
use crate::domain::value_object::{auth_event::AuthEvent, email::Email, password::Password};
use crate::error::AuthResult;

/// Email + password pair, validated before any backend call
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: Password,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> AppResult<Self> {
        Ok(Self {
            email: Email::new(email)?,
            password: Password::new(password)?,
        })
    }
}

/// Result of a sign-up
///
/// With email confirmation enabled the backend returns the new user but no
/// session; with auto-confirm it signs the user in right away.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpOutcome {
    pub user: Option<Identity>,
    pub session: Option<Session>,
}

/// Session transition broadcast to subscribers
#[derive(Debug, Clone)]
pub struct AuthStateChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthStateChange {
    pub fn new(event: AuthEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }
}

/// Backend auth API
#[trait_variant::make(AuthGateway: Send)]
pub trait LocalAuthGateway {
    /// Identity of the current session, verified by the backend
    async fn get_user(&self) -> AuthResult<Option<Identity>>;

    /// Register a new account
    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUpOutcome>;

    /// Password login; stores the resulting session
    async fn sign_in_with_password(&self, credentials: &Credentials) -> AuthResult<Session>;

    /// End the current session
    async fn sign_out(&self) -> AuthResult<()>;

    /// Send a password-reset email linking back to `redirect_to`
    async fn reset_password_for_email(&self, email: &Email, redirect_to: &str) -> AuthResult<()>;

    /// Exchange the refresh token for a new session
    async fn refresh_session(&self) -> AuthResult<Session>;

    /// Locally held session, without asking the backend
    fn current_session(&self) -> Option<Session>;

    /// Receive every session transition from now on
    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange>;
}

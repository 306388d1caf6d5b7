//! In-Memory Auth Gateway
//!
//! A self-contained stand-in for the hosted auth API, used by tests and for
//! running the client without a backend. Mirrors the backend's observable
//! behavior: error messages, session events, sign-up confirmation modes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use kernel::id::UserId;
use platform::backend::{AccessTokenSource, BackendError};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::entity::{identity::Identity, session::Session};
use crate::domain::gateway::{AuthGateway, AuthStateChange, Credentials, SignUpOutcome};
use crate::domain::value_object::{auth_event::AuthEvent, email::Email};
use crate::error::{AuthError, AuthResult};

const EVENT_CAPACITY: usize = 16;
const TOKEN_TTL_SECS: i64 = 3600;

struct Account {
    identity: Identity,
    password: String,
}

/// Password-reset email the gateway was asked to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetRequest {
    pub email: Email,
    pub redirect_to: String,
}

/// In-memory auth backend
pub struct MemoryAuthGateway {
    accounts: Mutex<HashMap<Email, Account>>,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthStateChange>,
    resets: Mutex<Vec<ResetRequest>>,
    auto_confirm: bool,
    unreachable: AtomicBool,
    get_user_calls: AtomicUsize,
}

impl Default for MemoryAuthGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthGateway {
    /// Gateway that requires email confirmation after sign-up
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: RwLock::new(None),
            events,
            resets: Mutex::new(Vec::new()),
            auto_confirm: false,
            unreachable: AtomicBool::new(false),
            get_user_calls: AtomicUsize::new(0),
        }
    }

    /// Gateway that signs users in right after sign-up
    pub fn auto_confirming() -> Self {
        Self {
            auto_confirm: true,
            ..Self::new()
        }
    }

    /// Register a confirmed account
    pub fn register(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let email = Email::new(email)?;
        let identity = Identity::new(UserId::new(), Some(email.clone()));
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                email,
                Account {
                    identity: identity.clone(),
                    password: password.to_string(),
                },
            );
        Ok(identity)
    }

    /// Install a session for `identity` without going through login
    pub fn sign_in_as(&self, identity: &Identity) -> Session {
        self.open_session(identity.clone(), AuthEvent::SignedIn)
    }

    /// Simulate a network outage
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of `get_user` calls so far
    pub fn get_user_calls(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    pub fn reset_requests(&self) -> Vec<ResetRequest> {
        self.resets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn ensure_reachable(&self) -> AuthResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AuthError::Internal("auth backend unreachable".to_string()));
        }
        Ok(())
    }

    fn open_session(&self, user: Identity, event: AuthEvent) -> Session {
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Uuid::new_v4().to_string(),
            token_type: "bearer".to_string(),
            expires_in: TOKEN_TTL_SECS,
            expires_at: None,
            user,
        }
        .with_expiry();

        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        let _ = self
            .events
            .send(AuthStateChange::new(event, Some(session.clone())));
        session
    }
}

impl AccessTokenSource for MemoryAuthGateway {
    fn access_token(&self) -> Option<String> {
        self.current_session().map(|s| s.access_token)
    }
}

impl AuthGateway for MemoryAuthGateway {
    async fn get_user(&self) -> AuthResult<Option<Identity>> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_reachable()?;
        Ok(self.current_session().map(|s| s.user))
    }

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUpOutcome> {
        self.ensure_reachable()?;

        let identity = {
            let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            if accounts.contains_key(&credentials.email) {
                return Err(BackendError::api(
                    422,
                    Some("user_already_exists"),
                    "User already registered",
                )
                .into());
            }
            let identity = Identity::new(UserId::new(), Some(credentials.email.clone()));
            accounts.insert(
                credentials.email.clone(),
                Account {
                    identity: identity.clone(),
                    password: credentials.password.expose().to_string(),
                },
            );
            identity
        };

        let session = self
            .auto_confirm
            .then(|| self.open_session(identity.clone(), AuthEvent::SignedIn));

        Ok(SignUpOutcome {
            user: Some(identity),
            session,
        })
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> AuthResult<Session> {
        self.ensure_reachable()?;

        let identity = {
            let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
            accounts
                .get(&credentials.email)
                .filter(|a| a.password == credentials.password.expose())
                .map(|a| a.identity.clone())
        };

        match identity {
            Some(identity) => Ok(self.open_session(identity, AuthEvent::SignedIn)),
            None => Err(BackendError::api(
                400,
                Some("invalid_credentials"),
                "Invalid login credentials",
            )
            .into()),
        }
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.ensure_reachable()?;
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        let _ = self
            .events
            .send(AuthStateChange::new(AuthEvent::SignedOut, None));
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &Email, redirect_to: &str) -> AuthResult<()> {
        self.ensure_reachable()?;
        self.resets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ResetRequest {
                email: email.clone(),
                redirect_to: redirect_to.to_string(),
            });
        Ok(())
    }

    async fn refresh_session(&self) -> AuthResult<Session> {
        self.ensure_reachable()?;
        let user = self
            .current_session()
            .map(|s| s.user)
            .ok_or(AuthError::NotAuthenticated)?;
        Ok(self.open_session(user, AuthEvent::TokenRefreshed))
    }

    fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }
}

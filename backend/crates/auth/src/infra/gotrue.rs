//! GoTrue HTTP Gateway
//!
//! Talks to the hosted auth API (`/auth/v1`). The current session is kept in
//! memory and mirrored to local storage so it survives restarts.

use std::sync::{Arc, PoisonError, RwLock};

use platform::backend::{AccessTokenSource, BackendClient, BackendError};
use platform::config::ClientConfig;
use platform::storage::KeyValueStore;
use reqwest::Method;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::entity::{identity::Identity, session::Session};
use crate::domain::gateway::{AuthGateway, AuthStateChange, Credentials, SignUpOutcome};
use crate::domain::value_object::{auth_event::AuthEvent, email::Email};
use crate::error::{AuthError, AuthResult};

/// Buffered transitions per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 16;

#[derive(Serialize)]
struct PasswordBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

/// HTTP-backed auth gateway
pub struct GoTrueGateway {
    client: BackendClient,
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthStateChange>,
}

impl GoTrueGateway {
    /// Create a gateway, restoring a persisted session if one exists
    pub fn new(
        client: BackendClient,
        store: Arc<dyn KeyValueStore>,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let session = restore_session(store.as_ref(), &storage_key);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            client,
            store,
            storage_key,
            session: RwLock::new(session),
            events,
        }
    }

    pub fn from_config(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            BackendClient::auth(config),
            store,
            config.session_storage_key.clone(),
        )
    }

    fn replace_session(&self, session: Option<Session>) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session.clone();

        let persisted = match &session {
            Some(session) => serde_json::to_string(session)
                .map_err(Into::into)
                .and_then(|raw| self.store.set(&self.storage_key, &raw)),
            None => self.store.remove(&self.storage_key),
        };
        if let Err(e) = persisted {
            tracing::warn!(error = %e, "Failed to persist auth session");
        }
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        tracing::debug!(event = %event, "Auth state changed");
        // No receivers is fine
        let _ = self.events.send(AuthStateChange::new(event, session));
    }

    fn clear_session(&self) {
        self.replace_session(None);
        self.emit(AuthEvent::SignedOut, None);
    }

    fn store_session(&self, session: Session, event: AuthEvent) -> Session {
        let session = session.with_expiry();
        self.replace_session(Some(session.clone()));
        self.emit(event, Some(session.clone()));
        session
    }

    fn token_url(&self, grant_type: &str) -> AuthResult<reqwest::Url> {
        let mut url = self.client.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    /// Session that is still usable, refreshing it first if it expired
    async fn usable_session(&self) -> AuthResult<Option<Session>> {
        let Some(session) = self.current_session() else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }

        match self.refresh_session().await {
            Ok(session) => Ok(Some(session)),
            Err(AuthError::Backend(e @ BackendError::Api { .. })) => {
                tracing::info!(error = %e, "Expired session could not be refreshed");
                self.clear_session();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn restore_session(store: &dyn KeyValueStore, key: &str) -> Option<Session> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read persisted auth session");
            return None;
        }
    };

    match serde_json::from_str::<Session>(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable persisted auth session");
            let _ = store.remove(key);
            None
        }
    }
}

fn is_session_rejection(err: &BackendError) -> bool {
    matches!(err, BackendError::Api { status, .. } if matches!(status, 401 | 403 | 404))
}

impl AccessTokenSource for GoTrueGateway {
    fn access_token(&self) -> Option<String> {
        self.current_session().map(|s| s.access_token)
    }
}

impl AuthGateway for GoTrueGateway {
    async fn get_user(&self) -> AuthResult<Option<Identity>> {
        let Some(session) = self.usable_session().await? else {
            return Ok(None);
        };

        let url = self.client.endpoint("user")?;
        let request = self
            .client
            .request(Method::GET, url, Some(&session.access_token));

        match self.client.send_json::<Identity>(request).await {
            Ok(identity) => Ok(Some(identity)),
            Err(e) if is_session_rejection(&e) => {
                tracing::info!(error = %e, "Backend no longer accepts the session");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<SignUpOutcome> {
        let url = self.client.endpoint("signup")?;
        let request = self
            .client
            .request(Method::POST, url, None)
            .json(&PasswordBody {
                email: credentials.email.as_str(),
                password: credentials.password.expose(),
            });

        let body: serde_json::Value = self.client.send_json(request).await?;

        // Auto-confirmed projects answer with a session, others with the user
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body).map_err(BackendError::from)?;
            let session = self.store_session(session, AuthEvent::SignedIn);
            Ok(SignUpOutcome {
                user: Some(session.user.clone()),
                session: Some(session),
            })
        } else {
            let user: Identity = serde_json::from_value(body).map_err(BackendError::from)?;
            Ok(SignUpOutcome {
                user: Some(user),
                session: None,
            })
        }
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> AuthResult<Session> {
        let url = self.token_url("password")?;
        let request = self
            .client
            .request(Method::POST, url, None)
            .json(&PasswordBody {
                email: credentials.email.as_str(),
                password: credentials.password.expose(),
            });

        let session: Session = self.client.send_json(request).await?;
        Ok(self.store_session(session, AuthEvent::SignedIn))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let Some(session) = self.current_session() else {
            self.clear_session();
            return Ok(());
        };

        let url = self.client.endpoint("logout")?;
        let request = self
            .client
            .request(Method::POST, url, Some(&session.access_token));

        match self.client.send_empty(request).await {
            Ok(()) => {}
            // Session already gone server-side; still sign out locally
            Err(e) if is_session_rejection(&e) => {
                tracing::debug!(error = %e, "Session already invalid at sign-out");
            }
            Err(e) => return Err(e.into()),
        }

        self.clear_session();
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &Email, redirect_to: &str) -> AuthResult<()> {
        let mut url = self.client.endpoint("recover")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let request = self
            .client
            .request(Method::POST, url, None)
            .json(&EmailBody {
                email: email.as_str(),
            });

        self.client.send_empty(request).await?;
        Ok(())
    }

    async fn refresh_session(&self) -> AuthResult<Session> {
        let refresh_token = self
            .current_session()
            .map(|s| s.refresh_token)
            .ok_or(AuthError::NotAuthenticated)?;

        let url = self.token_url("refresh_token")?;
        let request = self
            .client
            .request(Method::POST, url, None)
            .json(&RefreshBody {
                refresh_token: &refresh_token,
            });

        let session: Session = self.client.send_json(request).await?;
        Ok(self.store_session(session, AuthEvent::TokenRefreshed))
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

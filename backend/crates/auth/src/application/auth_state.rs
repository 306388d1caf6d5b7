//! Auth State Subscription
//!
//! Relays every session transition reported by the gateway to a caller
//! supplied callback. The relay adds nothing of its own except the initial
//! `INITIAL_SESSION` event carrying whatever session is held at subscribe
//! time.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::domain::entity::session::Session;
use crate::domain::gateway::{AuthGateway, AuthStateChange};
use crate::domain::value_object::auth_event::AuthEvent;

/// Handle of a running relay
///
/// Dropping the handle stops the relay.
#[must_use = "dropping the subscription stops the relay"]
#[derive(Debug)]
pub struct AuthSubscription {
    task: JoinHandle<()>,
}

impl AuthSubscription {
    /// Stop receiving events
    pub fn unsubscribe(self) {
        tracing::debug!("Auth state subscription cancelled");
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Auth state subscription use case
pub struct AuthStateUseCase<G>
where
    G: AuthGateway,
{
    gateway: Arc<G>,
}

impl<G> AuthStateUseCase<G>
where
    G: AuthGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Invoke `callback` with `(event, session)` on every session transition
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, mut callback: F) -> AuthSubscription
    where
        F: FnMut(AuthEvent, Option<Session>) + Send + 'static,
    {
        let mut receiver = self.gateway.subscribe();
        let initial = AuthStateChange::new(AuthEvent::InitialSession, self.gateway.current_session());

        let task = tokio::spawn(async move {
            callback(initial.event, initial.session);

            loop {
                match receiver.recv().await {
                    Ok(change) => {
                        tracing::debug!(event = %change.event, "Relaying auth state change");
                        callback(change.event, change.session);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth state subscriber lagged; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        AuthSubscription { task }
    }
}

//! Result Envelope - the uniform outcome of every client operation
//!
//! Every auth and record operation resolves to an [`Envelope`] instead of a
//! `Result`: callers branch on `success` and render `message`, and never have
//! to handle an error themselves. The conversion from `Result<T, E>` to an
//! envelope lives in [`run`] / [`run_action`] so that no use case repeats it.

use std::future::Future;

use serde::Serialize;

use crate::error::{app_error::AppError, kind::ErrorKind};

/// Domain errors that can be folded into an [`Envelope`].
///
/// `public_message` is the text the user may see. It is `Some` when the
/// failure carries a meaningful message of its own (a backend rejection, a
/// validation error, the not-authenticated precondition) and `None` for
/// unexpected failures, which fall back to the operation's default message.
pub trait Failure: std::error::Error + Send + Sync + 'static {
    fn kind(&self) -> ErrorKind;

    fn public_message(&self) -> Option<String>;
}

/// Success and fallback messages for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub success: &'static str,
    pub fallback: &'static str,
}

impl Messages {
    pub const fn new(success: &'static str, fallback: &'static str) -> Self {
        Self { success, fallback }
    }
}

/// Outcome of a client operation
///
/// ## Fields
/// * `success` - `true` iff the backend call returned no error
/// * `message` - human readable, always present
/// * `data` - payload; absent for pure actions and on failure
/// * `error` - original cause for diagnostics; never serialized
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    pub error: Option<AppError>,
}

impl<T> Envelope<T> {
    /// Successful outcome carrying a payload
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Successful outcome of a pure action (no payload)
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Failed outcome
    ///
    /// Uses the failure's public message when it has a non-blank one,
    /// otherwise `fallback`. The failure itself is kept as the error source.
    pub fn failure<E: Failure>(err: E, fallback: &str) -> Self {
        let message = err
            .public_message()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        let error = AppError::new(err.kind(), message.clone()).with_source(err);

        Self {
            success: false,
            message,
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Error kind of a failed outcome
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(AppError::kind)
    }

    /// Transform the payload, keeping message and error untouched
    pub fn map<U, F>(self, f: F) -> Envelope<U>
    where
        F: FnOnce(T) -> U,
    {
        Envelope {
            success: self.success,
            message: self.message,
            data: self.data.map(f),
            error: self.error,
        }
    }
}

impl<T: Default> Envelope<T> {
    /// Payload, or `T::default()` when absent (empty list for failed reads)
    pub fn data_or_default(self) -> T {
        self.data.unwrap_or_default()
    }
}

/// Run a payload-bearing operation and fold its result into an envelope
pub async fn run<T, E, F>(operation: &'static str, messages: Messages, fut: F) -> Envelope<T>
where
    F: Future<Output = Result<T, E>>,
    E: Failure,
{
    match fut.await {
        Ok(data) => {
            tracing::debug!(operation, "Operation succeeded");
            Envelope::ok(messages.success, data)
        }
        Err(err) => {
            log_failure(operation, &err);
            Envelope::failure(err, messages.fallback)
        }
    }
}

/// Run a pure action and fold its result into an envelope without payload
pub async fn run_action<E, F>(operation: &'static str, messages: Messages, fut: F) -> Envelope<()>
where
    F: Future<Output = Result<(), E>>,
    E: Failure,
{
    match fut.await {
        Ok(()) => {
            tracing::debug!(operation, "Action succeeded");
            Envelope::done(messages.success)
        }
        Err(err) => {
            log_failure(operation, &err);
            Envelope::failure(err, messages.fallback)
        }
    }
}

fn log_failure<E: Failure>(operation: &'static str, err: &E) {
    let kind = err.kind();
    if kind.is_server_error() {
        tracing::error!(operation, kind = %kind, error = %err, "Operation failed");
    } else {
        tracing::warn!(operation, kind = %kind, error = %err, "Operation rejected");
    }
}

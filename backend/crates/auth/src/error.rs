//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system and fold into
//! result envelopes through [`Failure`].

use kernel::envelope::Failure;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::backend::BackendError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Message shown when an operation needs a signed-in user
pub const NOT_AUTHENTICATED: &str = "User not authenticated";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session, or the backend no longer accepts it
    #[error("User not authenticated")]
    NotAuthenticated,

    /// Input rejected before reaching the backend
    #[error("{0}")]
    InvalidInput(String),

    /// Backend rejected the call or could not be reached
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Local failure (session storage, encoding)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log a failure that is swallowed rather than reported
    pub fn log(&self) {
        match self {
            AuthError::Backend(BackendError::Api { status, code, .. }) => {
                tracing::warn!(status, code = code.as_deref().unwrap_or("-"), error = %self, "Auth backend rejected call");
            }
            AuthError::Backend(e) => {
                tracing::error!(error = %e, "Auth backend unreachable");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl Failure for AuthError {
    fn kind(&self) -> ErrorKind {
        match self {
            AuthError::NotAuthenticated => ErrorKind::Unauthorized,
            AuthError::InvalidInput(_) => ErrorKind::BadRequest,
            AuthError::Backend(e) => e.kind(),
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn public_message(&self) -> Option<String> {
        match self {
            AuthError::NotAuthenticated => Some(NOT_AUTHENTICATED.to_string()),
            AuthError::InvalidInput(msg) => Some(msg.clone()),
            AuthError::Backend(e) => e.api_message().map(str::to_string),
            AuthError::Internal(_) => None,
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.kind() == ErrorKind::BadRequest {
            AuthError::InvalidInput(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_authenticated_message() {
        let err = AuthError::NotAuthenticated;
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.public_message().as_deref(), Some(NOT_AUTHENTICATED));
    }

    #[test]
    fn test_backend_rejection_keeps_backend_message() {
        let err = AuthError::from(BackendError::api(
            400,
            Some("invalid_credentials"),
            "Invalid login credentials",
        ));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.public_message().as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn test_internal_has_no_public_message() {
        let err = AuthError::Internal("storage poisoned".to_string());
        assert!(err.public_message().is_none());
        assert_eq!(err.to_app_error().status_code(), 500);
    }

    #[test]
    fn test_validation_app_error_becomes_invalid_input() {
        let err = AuthError::from(AppError::bad_request("Invalid email format"));
        assert!(matches!(err, AuthError::InvalidInput(ref m) if m == "Invalid email format"));
    }
}

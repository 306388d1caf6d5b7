//! Record Error Types
//!
//! This module provides record-specific error variants that integrate
//! with the unified `kernel::error::AppError` system and fold into
//! result envelopes through [`Failure`].

use auth::NOT_AUTHENTICATED;
use kernel::envelope::Failure;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::backend::BackendError;
use thiserror::Error;

/// Record-specific result type alias
pub type RecordResult<T> = Result<T, RecordError>;

/// Record-specific error variants
#[derive(Debug, Error)]
pub enum RecordError {
    /// No signed-in user; raised before any record store call
    #[error("User not authenticated")]
    NotAuthenticated,

    /// No record matched both the id and the owner filter
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Record store rejected the call or could not be reached
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Record store answered with something unusable
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RecordError {
    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }
}

impl Failure for RecordError {
    fn kind(&self) -> ErrorKind {
        match self {
            RecordError::NotAuthenticated => ErrorKind::Unauthorized,
            RecordError::NotFound(_) => ErrorKind::NotFound,
            RecordError::Backend(e) => e.kind(),
            RecordError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn public_message(&self) -> Option<String> {
        match self {
            RecordError::NotAuthenticated => Some(NOT_AUTHENTICATED.to_string()),
            RecordError::NotFound(_) => Some(self.to_string()),
            RecordError::Backend(e) => e.api_message().map(str::to_string),
            RecordError::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = RecordError::NotFound("Calculation");
        assert_eq!(err.public_message().as_deref(), Some("Calculation not found"));
        assert_eq!(err.to_app_error().status_code(), 404);
    }

    #[test]
    fn test_not_authenticated_message() {
        let err = RecordError::NotAuthenticated;
        assert_eq!(err.public_message().as_deref(), Some("User not authenticated"));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_backend_message_is_public() {
        let err = RecordError::from(BackendError::api(
            403,
            Some("42501"),
            "new row violates row-level security policy for table \"calculations\"",
        ));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(err.public_message().unwrap().contains("row-level security"));
    }

    #[test]
    fn test_internal_uses_fallback() {
        assert!(RecordError::Internal("empty response".into()).public_message().is_none());
    }
}

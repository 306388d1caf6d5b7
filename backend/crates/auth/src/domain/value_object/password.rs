//! Password Value Object
//!
//! Holds a plaintext password only for the duration of one backend call.
//! Strength rules are the backend's; locally we only refuse blank input.

use std::fmt;

use kernel::error::app_error::{AppError, AppResult};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Plaintext password, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AppError::bad_request("Password cannot be empty"));
        }
        Ok(Self(raw))
    }

    /// Plaintext, for the request body only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

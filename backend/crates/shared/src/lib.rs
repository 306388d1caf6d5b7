//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of the bill client vocabulary:
//! - Common error types and result aliases
//! - Typed ID wrappers
//! - The result envelope every client operation returns
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across the auth and records crates.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod envelope;
pub mod id;

pub use envelope::{Envelope, Failure, Messages};

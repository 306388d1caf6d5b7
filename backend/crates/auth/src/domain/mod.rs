//! Domain Layer
//!
//! Contains entities, value objects, and the auth gateway trait.

pub mod entity;
pub mod gateway;
pub mod value_object;

// Re-exports
pub use entity::{identity::Identity, session::Session};
pub use gateway::{AuthGateway, AuthStateChange, Credentials, SignUpOutcome};
pub use value_object::{auth_event::AuthEvent, email::Email, password::Password};

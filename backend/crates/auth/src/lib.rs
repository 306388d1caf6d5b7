//! Auth (Authentication) Client Module
//!
//! Clean Architecture structure:
//! - `domain/` - Identity, session, value objects, gateway trait
//! - `application/` - Use cases and application services
//! - `infra/` - Hosted auth API and in-memory gateways
//! - `presentation/` - Page guard and logout link handling
//!
//! ## Features
//! - Sign up / login with email + password
//! - Logout and password reset emails
//! - Auth state subscription (session transitions relayed to a callback)
//! - Recently used emails kept in local storage
//! - Page guard redirecting visitors without a session to the login page
//!
//! Every operation resolves to a [`kernel::envelope::Envelope`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::{
    AuthConfig, AuthStateUseCase, AuthSubscription, RecentUsers, ResetPasswordUseCase,
    SessionAccessor, SignInInput, SignInOutput, SignInUseCase, SignOutUseCase, SignUpInput,
    SignUpUseCase,
};
pub use domain::{
    AuthEvent, AuthGateway, AuthStateChange, Credentials, Email, Identity, Password, Session,
    SignUpOutcome,
};
pub use error::{AuthError, AuthResult, NOT_AUTHENTICATED};
pub use infra::{GoTrueGateway, MemoryAuthGateway};
pub use presentation::{ClickOutcome, PageGuard, PageLink, PageProtection};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

//! Application Layer
//!
//! Use cases and application services.

pub mod auth_state;
pub mod config;
pub mod recent_users;
pub mod reset_password;
pub mod session_accessor;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use auth_state::{AuthStateUseCase, AuthSubscription};
pub use config::AuthConfig;
pub use recent_users::RecentUsers;
pub use reset_password::ResetPasswordUseCase;
pub use session_accessor::SessionAccessor;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};

//! Application Layer
//!
//! Record use cases, scoped to the signed-in user.

pub mod calculations;
pub mod profiles;

// Re-exports
pub use calculations::CalculationService;
pub use profiles::ProfileService;

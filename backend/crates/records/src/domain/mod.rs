//! Domain Layer
//!
//! Record entities, value objects and repository traits.

pub mod entities;
pub mod repository;
pub mod value_objects;

// Re-exports
pub use entities::{
    Calculation, CalculationInput, Profile, ProfileChanges, ProfileDraft, ProfileRow,
};
pub use repository::{CalculationRepository, ProfileRepository};
pub use value_objects::{CalculationId, OwnedKey};

//! Records (Calculations and Profiles) Client Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases
//! - `infra/` - Hosted record API and in-memory implementations
//!
//! ## Ownership Model
//! - Every calculation carries its owner's user id; every read and write
//!   filters on it, single-record calls on id and owner together
//! - A profile's primary key is the owner's user id
//! - Without a signed-in user no call reaches the record store

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::{CalculationService, ProfileService};
pub use domain::{
    Calculation, CalculationId, CalculationInput, CalculationRepository, OwnedKey, Profile,
    ProfileChanges, ProfileDraft, ProfileRepository, ProfileRow,
};
pub use error::{RecordError, RecordResult};
pub use infra::{
    MemoryCalculationRepository, MemoryProfileRepository, PostgrestCalculationRepository,
    PostgrestProfileRepository,
};

//! Infrastructure Layer
//!
//! Record store implementations: the hosted record API and in-memory tables.

pub mod memory;
pub mod postgrest;

pub use memory::{MemoryCalculationRepository, MemoryProfileRepository};
pub use postgrest::{PostgrestCalculationRepository, PostgrestProfileRepository};

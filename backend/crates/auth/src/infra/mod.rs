//! Infrastructure Layer
//!
//! Auth gateway implementations: the hosted auth API and an in-memory stand-in.

pub mod gotrue;
pub mod memory;

pub use gotrue::GoTrueGateway;
pub use memory::MemoryAuthGateway;

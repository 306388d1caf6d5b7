//! Presentation Layer
//!
//! Page-facing pieces: the page guard and logout link handling.

pub mod logout_links;
pub mod page_guard;

pub use logout_links::{PageLink, is_logout_link};
pub use page_guard::{ClickOutcome, PageGuard, PageProtection};

//! Page Navigation
//!
//! Abstraction over the host's location bar. Redirect targets are page
//! names relative to the site origin (`login.html`).

use std::sync::{Mutex, PoisonError};

/// Navigation backend trait
pub trait Navigator: Send + Sync {
    /// Site origin, e.g. `https://bills.example.com`
    fn origin(&self) -> String;

    /// Current page, relative to the origin and without a leading slash
    fn current_path(&self) -> String;

    /// Client-side navigation to `target`
    fn navigate(&self, target: &str);
}

/// Absolute URL of `page` under `origin`
pub fn page_url(origin: &str, page: &str) -> String {
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        page.trim_start_matches('/')
    )
}

/// Whether `current` is the page `target`
pub fn is_same_page(current: &str, target: &str) -> bool {
    current.trim_start_matches('/') == target.trim_start_matches('/')
}

#[derive(Debug)]
struct NavState {
    current: String,
    history: Vec<String>,
}

/// Navigator that only records where it was sent
///
/// Suits headless hosts and tests; a desktop shell or WASM host provides
/// its own `Navigator`.
#[derive(Debug)]
pub struct MemoryNavigator {
    origin: String,
    state: Mutex<NavState>,
}

impl MemoryNavigator {
    pub fn new(origin: impl Into<String>, start_page: impl Into<String>) -> Self {
        let start = start_page.into().trim_start_matches('/').to_string();
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            state: Mutex::new(NavState {
                current: start,
                history: Vec::new(),
            }),
        }
    }

    /// Navigations issued so far, oldest first
    pub fn history(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .clone()
    }
}

impl Navigator for MemoryNavigator {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn current_path(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clone()
    }

    fn navigate(&self, target: &str) {
        let target = target.trim_start_matches('/').to_string();
        tracing::debug!(target = %target, "Navigating");

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.current = target.clone();
        state.history.push(target);
    }
}

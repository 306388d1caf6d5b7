//! Logout Link Detection
//!
//! Decides which links on a page act as logout controls. Such links point at
//! the login page, so following them would leave the session alive.

use platform::navigation::is_same_page;

/// A link as rendered on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub href: String,
    pub text: String,
    /// Whether the link sits inside the navigation bar
    pub in_nav: bool,
}

impl PageLink {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
            in_nav: false,
        }
    }

    /// Builder: place the link inside the navigation bar
    pub fn in_nav(mut self) -> Self {
        self.in_nav = true;
        self
    }
}

/// Whether a click on `link` must log out instead of navigating
pub fn is_logout_link(link: &PageLink, login_page: &str) -> bool {
    link.in_nav && (targets_page(&link.href, login_page) || has_logout_label(&link.text))
}

fn targets_page(href: &str, page: &str) -> bool {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let page = page.trim_start_matches('/');
    is_same_page(path, page) || path.ends_with(&format!("/{page}"))
}

fn has_logout_label(text: &str) -> bool {
    let text = text.to_lowercase();
    text.contains("log out") || text.contains("logout")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN: &str = "login.html";

    #[test]
    fn test_nav_link_to_login_page() {
        assert!(is_logout_link(&PageLink::new("login.html", "Sign off").in_nav(), LOGIN));
        assert!(is_logout_link(
            &PageLink::new("https://bills.example.com/login.html?next=x", "").in_nav(),
            LOGIN
        ));
    }

    #[test]
    fn test_nav_link_labelled_logout() {
        assert!(is_logout_link(&PageLink::new("#", "Log Out").in_nav(), LOGIN));
        assert!(is_logout_link(&PageLink::new("#", "  LOGOUT ").in_nav(), LOGIN));
    }

    #[test]
    fn test_links_outside_nav_are_followed() {
        assert!(!is_logout_link(&PageLink::new("login.html", "Log out"), LOGIN));
    }

    #[test]
    fn test_other_nav_links_are_followed() {
        assert!(!is_logout_link(&PageLink::new("dashboard.html", "Dashboard").in_nav(), LOGIN));
        assert!(!is_logout_link(&PageLink::new("old-login.html", "History").in_nav(), LOGIN));
    }
}

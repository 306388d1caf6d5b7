//! Application Configuration
//!
//! Configuration for the Auth application layer.

use platform::config::ClientConfig;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Page unauthenticated visitors are redirected to
    pub login_page: String,
    /// Page the password-reset email links back to
    pub reset_password_page: String,
    /// Storage key of the recent users list
    pub recent_users_key: String,
    /// Maximum number of remembered emails
    pub recent_users_limit: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::from_client(&ClientConfig::default())
    }
}

impl AuthConfig {
    pub fn from_client(config: &ClientConfig) -> Self {
        Self {
            login_page: config.login_page.clone(),
            reset_password_page: config.reset_password_page.clone(),
            recent_users_key: config.recent_users_key.clone(),
            recent_users_limit: config.recent_users_limit,
        }
    }

    /// Builder: login page
    pub fn with_login_page(mut self, page: impl Into<String>) -> Self {
        self.login_page = page.into();
        self
    }

    /// Builder: recent users cap
    pub fn with_recent_users_limit(mut self, limit: usize) -> Self {
        self.recent_users_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_client_config() {
        let config = AuthConfig::default();
        assert_eq!(config.login_page, "login.html");
        assert_eq!(config.reset_password_page, "reset-password.html");
        assert_eq!(config.recent_users_key, "recentUsers");
        assert_eq!(config.recent_users_limit, 10);
    }

    #[test]
    fn test_builders() {
        let config = AuthConfig::default()
            .with_login_page("signin.html")
            .with_recent_users_limit(3);
        assert_eq!(config.login_page, "signin.html");
        assert_eq!(config.recent_users_limit, 3);
    }
}

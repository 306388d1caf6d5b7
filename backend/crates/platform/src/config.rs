//! Client Configuration
//!
//! Connection settings for the hosted backend plus the page and storage
//! names the client relies on.

use std::env;
use std::path::PathBuf;

use reqwest::Url;
use thiserror::Error;

/// Local Supabase stack default (`supabase start`)
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:54321";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Bill client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project URL of the hosted backend
    pub backend_url: Url,
    /// Public (anon) API key sent as `apikey`
    pub anon_key: String,
    /// Page unauthenticated visitors are sent to
    pub login_page: String,
    /// Page the password-reset email links back to
    pub reset_password_page: String,
    /// Storage key of the recent users list
    pub recent_users_key: String,
    /// Maximum number of remembered emails
    pub recent_users_limit: usize,
    /// Storage key of the persisted auth session
    pub session_storage_key: String,
    /// JSON file backing local storage (in-memory when `None`)
    pub storage_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            anon_key: String::new(),
            login_page: "login.html".to_string(),
            reset_password_page: "reset-password.html".to_string(),
            recent_users_key: "recentUsers".to_string(),
            recent_users_limit: 10,
            session_storage_key: "sb-auth-token".to_string(),
            storage_path: None,
        }
    }
}

impl ClientConfig {
    /// Create config for a given project
    pub fn new(backend_url: &str, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: parse_backend_url(backend_url)?,
            anon_key: anon_key.into(),
            ..Default::default()
        })
    }

    /// Create config for a local development stack
    pub fn development() -> Self {
        Self {
            anon_key: "development-anon-key".to_string(),
            ..Default::default()
        }
    }

    /// Load configuration from the environment (and `.env` if present)
    ///
    /// ## Variables
    /// * `SUPABASE_URL` - required
    /// * `SUPABASE_ANON_KEY` - required
    /// * `BILL_LOGIN_PAGE` - optional, defaults to `login.html`
    /// * `BILL_STORAGE_PATH` - optional JSON file for local storage
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let url = env::var("SUPABASE_URL").map_err(|_| ConfigError::MissingVar("SUPABASE_URL"))?;
        let anon_key =
            env::var("SUPABASE_ANON_KEY").map_err(|_| ConfigError::MissingVar("SUPABASE_ANON_KEY"))?;

        let mut config = Self::new(&url, anon_key)?;
        if let Ok(page) = env::var("BILL_LOGIN_PAGE") {
            config.login_page = page;
        }
        config.storage_path = env::var_os("BILL_STORAGE_PATH").map(PathBuf::from);

        Ok(config)
    }

    /// Base URL of the auth API (`<project>/auth/v1/`)
    pub fn auth_url(&self) -> Url {
        self.service_url("auth/v1/")
    }

    /// Base URL of the record API (`<project>/rest/v1/`)
    pub fn rest_url(&self) -> Url {
        self.service_url("rest/v1/")
    }

    fn service_url(&self, path: &str) -> Url {
        // backend_url always ends with '/', so join appends
        self.backend_url
            .join(path)
            .unwrap_or_else(|_| self.backend_url.clone())
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "not a base URL".to_string(),
        });
    }

    Ok(url)
}

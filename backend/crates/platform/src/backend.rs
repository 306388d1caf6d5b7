//! Hosted Backend HTTP Plumbing
//!
//! A thin reqwest wrapper shared by the auth gateway and the record
//! repositories: it attaches the project API key, sends the request and
//! decodes either the payload or the backend's error body.

use kernel::error::kind::ErrorKind;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ClientConfig;

/// Error code the record API returns when a single-row read matched no rows
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Errors talking to the hosted backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with an error body
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never completed (DNS, TLS, connection reset, ...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 2xx with a body we could not decode
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint '{0}'")]
    InvalidUrl(String),
}

impl BackendError {
    /// Build an API error (also used by in-memory backends)
    pub fn api(status: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        BackendError::Api {
            status,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Api { status, .. } => ErrorKind::from_status(*status),
            BackendError::Transport(e) if e.is_timeout() => ErrorKind::RequestTimeout,
            BackendError::Transport(_) => ErrorKind::ServiceUnavailable,
            BackendError::Decode(_) => ErrorKind::BadGateway,
            BackendError::InvalidUrl(_) => ErrorKind::InternalServerError,
        }
    }

    /// Backend-specific error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            BackendError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Message reported by the backend itself
    ///
    /// `None` for transport and decoding failures.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            BackendError::Api { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Single-row read matched no rows
    pub fn is_no_rows(&self) -> bool {
        self.code() == Some(NO_ROWS_CODE)
    }
}

/// Supplier of the signed-in user's access token
///
/// Implemented by the auth gateways so record repositories can authorize
/// their requests without depending on the auth crate.
pub trait AccessTokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Error body shapes of the auth API (`msg`, `error_description`) and the
/// record API (`code`, `message`)
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<serde_json::Value>,
    error_code: Option<String>,
    error: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

impl ErrorBody {
    fn into_error(self, status: reqwest::StatusCode) -> BackendError {
        let code = self.error_code.clone().or_else(|| match &self.code {
            Some(serde_json::Value::String(code)) => Some(code.clone()),
            _ => self.error.clone(),
        });

        let message = self
            .msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unexpected backend response")
                    .to_string()
            });

        BackendError::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

/// HTTP client for one backend service (auth or records)
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
    anon_key: String,
}

impl BackendClient {
    pub fn new(base_url: Url, anon_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            anon_key: anon_key.into(),
        }
    }

    /// Client for the auth API of a project
    pub fn auth(config: &ClientConfig) -> Self {
        Self::new(config.auth_url(), config.anon_key.clone())
    }

    /// Client for the record API of a project
    pub fn rest(config: &ClientConfig) -> Self {
        Self::new(config.rest_url(), config.anon_key.clone())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path relative to the service base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| BackendError::InvalidUrl(path.to_string()))
    }

    /// Build a request carrying the API key and bearer token
    ///
    /// Without a user access token the anon key is used as bearer, which is
    /// what the backend expects for anonymous calls.
    pub fn request(&self, method: Method, url: Url, access_token: Option<&str>) -> RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Send a request and decode a JSON payload
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = Self::check(request.send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a request whose success body is irrelevant
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<(), BackendError> {
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn check(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.into_error(status),
            Err(_) if !body.trim().is_empty() => BackendError::Api {
                status: status.as_u16(),
                code: None,
                message: body.trim().to_string(),
            },
            Err(_) => ErrorBody::default().into_error(status),
        };

        tracing::debug!(
            status = status.as_u16(),
            code = error.code().unwrap_or("-"),
            "Backend returned an error"
        );

        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn client_for(server: &MockServer) -> BackendClient {
        let base = Url::parse(&format!("{}/rest/v1/", server.uri())).unwrap();
        BackendClient::new(base, "anon-key")
    }

    #[tokio::test]
    async fn test_send_json_attaches_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/calculations"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.endpoint("calculations").unwrap();
        let request = client.request(Method::GET, url, Some("user-token"));
        let values: Vec<i32> = client.send_json(request).await.unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_anon_key_is_default_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/ping"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.endpoint("/ping").unwrap();
        client
            .send_empty(client.request(Method::POST, url, None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_record_api_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(406).set_body_json(json!({
                "code": "PGRST116",
                "details": "The result contains 0 rows",
                "hint": null,
                "message": "JSON object requested, multiple (or no) rows returned"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.endpoint("profiles").unwrap();
        let err = client
            .send_json::<serde_json::Value>(client.request(Method::GET, url, None))
            .await
            .unwrap_err();

        assert!(err.is_no_rows());
        assert_eq!(err.kind(), ErrorKind::NotAcceptable);
        assert_eq!(
            err.api_message(),
            Some("JSON object requested, multiple (or no) rows returned")
        );
    }

    #[tokio::test]
    async fn test_auth_api_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": 400,
                "error_code": "invalid_credentials",
                "msg": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.endpoint("token").unwrap();
        let err = client
            .send_empty(client.request(Method::POST, url, None))
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some("invalid_credentials"));
        assert_eq!(err.api_message(), Some("Invalid login credentials"));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_plain_text_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.endpoint("calculations").unwrap();
        let err = client
            .send_empty(client.request(Method::GET, url, None))
            .await
            .unwrap_err();

        assert_eq!(err.api_message(), Some("upstream unavailable"));
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.endpoint("calculations").unwrap();
        let err = client
            .send_json::<Vec<i32>>(client.request(Method::GET, url, None))
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::Decode(_)));
        assert!(err.api_message().is_none());
    }
}

// backend/ - outbound calls to the auth backend (session oracle + logout)

use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::BackendConfig;
use crate::gate::{OracleVerdict, SessionContext};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Backend transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend responded with status {0}")]
    Status(StatusCode),
}

/// Result of a backend logout call.
#[derive(Debug, Clone, Default)]
pub struct LogoutReceipt {
    /// `Set-Cookie` headers the backend sent back, to relay to the browser.
    pub set_cookies: Vec<HeaderValue>,
}

/// The external auth service this gateway defers to.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Ask whether the credentials in `ctx` belong to a live session.
    /// Never fails: transport problems come back as `Unreachable`.
    async fn session(&self, ctx: &SessionContext) -> OracleVerdict;

    /// Invalidate the session identified by `ctx`.
    async fn logout(&self, ctx: &SessionContext) -> Result<LogoutReceipt, BackendError>;
}

/// `AuthBackend` over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    session_url: Url,
    logout_url: Url,
}

impl HttpAuthBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let session_url = join(&base, &config.session_path)?;
        let logout_url = join(&base, &config.logout_path)?;

        // Redirects are answers too: a 3xx from the session endpoint is "not authenticated"
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            session_url,
            logout_url,
        })
    }

    pub fn session_url(&self) -> &Url {
        &self.session_url
    }
}

/// Append `path` to whatever path `base` already has, so a base of
/// `https://api/v1` yields `https://api/v1/auth/session`.
fn join(base: &Url, path: &str) -> Result<Url, BackendError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| BackendError::InvalidUrl(format!("{} cannot carry a path", base)))?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn session(&self, ctx: &SessionContext) -> OracleVerdict {
        let mut request = self
            .client
            .get(self.session_url.clone())
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-store");
        if let Some(cookie) = ctx.cookie_header() {
            request = request.header(header::COOKIE, cookie);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Session oracle unreachable at {}: {}", self.session_url, e);
                return OracleVerdict::Unreachable;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Session oracle answered {}", status);
            return OracleVerdict::Unauthenticated;
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => OracleVerdict::from_session_body(&body),
            Err(e) if e.is_decode() => {
                tracing::debug!("Session oracle body was not JSON: {}", e);
                OracleVerdict::Unauthenticated
            }
            Err(e) => {
                tracing::warn!("Session oracle body could not be read: {}", e);
                OracleVerdict::Unreachable
            }
        }
    }

    async fn logout(&self, ctx: &SessionContext) -> Result<LogoutReceipt, BackendError> {
        let mut request = self.client.post(self.logout_url.clone());
        if let Some(cookie) = ctx.cookie_header() {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await?;
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .cloned()
            .collect();

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        Ok(LogoutReceipt { set_cookies })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn builds_endpoint_urls_from_config() {
        let mut config = AppConfig::development().backend;
        config.base_url = "http://backend.internal:8000".to_string();

        let backend = HttpAuthBackend::new(&config).expect("backend");
        assert_eq!(backend.session_url().as_str(), "http://backend.internal:8000/auth/session");
        assert_eq!(backend.logout_url.as_str(), "http://backend.internal:8000/auth/logout");
    }

    #[test]
    fn keeps_the_base_url_path_prefix() {
        let mut config = AppConfig::development().backend;
        config.base_url = "https://api.example.com/v1".to_string();

        let backend = HttpAuthBackend::new(&config).expect("backend");
        assert_eq!(backend.session_url().as_str(), "https://api.example.com/v1/auth/session");
        assert_eq!(backend.logout_url.as_str(), "https://api.example.com/v1/auth/logout");

        config.base_url = "https://api.example.com/v1/".to_string();
        config.session_path = "auth/session/".to_string();
        let backend = HttpAuthBackend::new(&config).expect("backend");
        assert_eq!(backend.session_url().as_str(), "https://api.example.com/v1/auth/session");
    }

    #[test]
    fn rejects_non_hierarchical_base_url() {
        let mut config = AppConfig::development().backend;
        config.base_url = "mailto:auth@example.com".to_string();

        assert!(matches!(HttpAuthBackend::new(&config), Err(BackendError::InvalidUrl(_))));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let mut config = AppConfig::development().backend;
        config.base_url = "not a url".to_string();

        assert!(matches!(HttpAuthBackend::new(&config), Err(BackendError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn dead_backend_is_unreachable() {
        let port = portpicker::pick_unused_port().expect("free port");
        let mut config = AppConfig::development().backend;
        config.base_url = format!("http://127.0.0.1:{}", port);
        config.timeout_ms = 500;

        let backend = HttpAuthBackend::new(&config).expect("backend");
        let ctx = SessionContext::new(Some("ls_session=abc".to_string()));
        assert_eq!(backend.session(&ctx).await, OracleVerdict::Unreachable);
        assert!(backend.logout(&ctx).await.is_err());
    }
}

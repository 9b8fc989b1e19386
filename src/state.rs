use std::sync::Arc;
use std::time::Duration;

use crate::backend::{AuthBackend, BackendError, HttpAuthBackend};
use crate::config::{AppConfig, PagesConfig};
use crate::gate::Gatekeeper;

/// Shared, read-only per-process state handed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn AuthBackend>,
    pub gatekeeper: Arc<Gatekeeper>,
    pub http: reqwest::Client,
}

impl AppState {
    /// State wired to the real HTTP backend described by `config`.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let backend = HttpAuthBackend::new(&config.backend)?;
        Self::with_backend(config, Arc::new(backend))
    }

    pub fn with_backend(config: AppConfig, backend: Arc<dyn AuthBackend>) -> anyhow::Result<Self> {
        let gatekeeper = Gatekeeper::new(config.routing.clone(), config.fallback.clone());
        let http = page_client(&config.pages)?;
        Ok(Self {
            config: Arc::new(config),
            backend,
            gatekeeper: Arc::new(gatekeeper),
            http,
        })
    }
}

/// Client for the page renderer. Redirects go back to the browser untouched,
/// with a `Location` the browser can resolve against the public host.
fn page_client(config: &PagesConfig) -> Result<reqwest::Client, BackendError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

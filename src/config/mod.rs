use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub routing: RoutingRules,
    pub fallback: FallbackPolicy,
    pub company: CompanyCookieConfig,
    pub pages: PagesConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub session_path: String,
    pub logout_path: String,
    pub timeout_ms: u64,
}

/// Path layout the gatekeeper classifies against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRules {
    pub login_path: String,
    pub demo_prefix: String,
    pub public_prefixes: Vec<String>,
    pub static_prefixes: Vec<String>,
    pub api_prefixes: Vec<String>,
}

/// Cookie-presence fallback used only when the session oracle cannot be reached.
///
/// Accepting an unverified cookie as proof of a session is a product decision,
/// so the whole policy can be switched off with `GATE_FALLBACK_ENABLED=false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackPolicy {
    pub enabled: bool,
    pub cookie_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyCookieConfig {
    pub cookie_name: String,
    pub max_age_days: i64,
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesConfig {
    pub upstream_url: Option<String>,
    pub max_body_bytes: usize,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl Default for RoutingRules {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            demo_prefix: "/demo".to_string(),
            public_prefixes: vec![
                "/login".to_string(),
                "/signup".to_string(),
                "/logout".to_string(),
                "/legal".to_string(),
            ],
            static_prefixes: vec!["/_next".to_string()],
            api_prefixes: vec!["/api".to_string()],
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            cookie_names: vec![
                "ls_session".to_string(),
                "ls_jwt".to_string(),
                "session".to_string(),
            ],
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("GATEWAY_HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("GATEWAY_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Backend overrides
        if let Ok(v) = env::var("BACKEND_URL") {
            self.backend.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("BACKEND_SESSION_PATH") {
            self.backend.session_path = v;
        }
        if let Ok(v) = env::var("BACKEND_LOGOUT_PATH") {
            self.backend.logout_path = v;
        }
        if let Ok(v) = env::var("BACKEND_TIMEOUT_MS") {
            self.backend.timeout_ms = v.parse().unwrap_or(self.backend.timeout_ms);
        }

        // Routing overrides
        if let Ok(v) = env::var("GATE_LOGIN_PATH") {
            self.routing.login_path = v;
        }
        if let Ok(v) = env::var("GATE_DEMO_PREFIX") {
            self.routing.demo_prefix = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("GATE_PUBLIC_PREFIXES") {
            self.routing.public_prefixes = split_list(&v);
        }

        // Fallback overrides
        if let Ok(v) = env::var("GATE_FALLBACK_ENABLED") {
            self.fallback.enabled = v.parse().unwrap_or(self.fallback.enabled);
        }
        if let Ok(v) = env::var("GATE_FALLBACK_COOKIES") {
            self.fallback.cookie_names = split_list(&v);
        }

        // Company cookie overrides
        if let Ok(v) = env::var("COMPANY_COOKIE_NAME") {
            self.company.cookie_name = v;
        }
        if let Ok(v) = env::var("COMPANY_COOKIE_MAX_AGE_DAYS") {
            self.company.max_age_days = v.parse().unwrap_or(self.company.max_age_days);
        }
        if let Ok(v) = env::var("COMPANY_COOKIE_SECURE") {
            self.company.secure = v.parse().unwrap_or(self.company.secure);
        }

        // Page renderer overrides
        if let Ok(v) = env::var("PAGES_UPSTREAM_URL") {
            let v = v.trim_end_matches('/').to_string();
            self.pages.upstream_url = if v.is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("PAGES_MAX_BODY_BYTES") {
            self.pages.max_body_bytes = v.parse().unwrap_or(self.pages.max_body_bytes);
        }
        if let Ok(v) = env::var("PAGES_TIMEOUT_MS") {
            self.pages.timeout_ms = v.parse().unwrap_or(self.pages.timeout_ms);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
                session_path: "/auth/session".to_string(),
                logout_path: "/auth/logout".to_string(),
                timeout_ms: 5000,
            },
            routing: RoutingRules::default(),
            fallback: FallbackPolicy::default(),
            company: CompanyCookieConfig {
                cookie_name: "active_company_id".to_string(),
                max_age_days: 30,
                secure: false,
            },
            pages: PagesConfig {
                upstream_url: None,
                max_body_bytes: 10 * 1024 * 1024, // 10MB
                timeout_ms: 15000,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                base_url: "http://backend:8000".to_string(),
                session_path: "/auth/session".to_string(),
                logout_path: "/auth/logout".to_string(),
                timeout_ms: 3000,
            },
            routing: RoutingRules::default(),
            fallback: FallbackPolicy::default(),
            company: CompanyCookieConfig {
                cookie_name: "active_company_id".to_string(),
                max_age_days: 30,
                secure: true,
            },
            pages: PagesConfig {
                upstream_url: Some("http://pages:3001".to_string()),
                max_body_bytes: 5 * 1024 * 1024, // 5MB
                timeout_ms: 10000,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                base_url: "http://backend:8000".to_string(),
                session_path: "/auth/session".to_string(),
                logout_path: "/auth/logout".to_string(),
                timeout_ms: 2000,
            },
            routing: RoutingRules::default(),
            fallback: FallbackPolicy::default(),
            company: CompanyCookieConfig {
                cookie_name: "active_company_id".to_string(),
                max_age_days: 30,
                secure: true,
            },
            pages: PagesConfig {
                upstream_url: Some("http://pages:3001".to_string()),
                max_body_bytes: 2 * 1024 * 1024, // 2MB
                timeout_ms: 10000,
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

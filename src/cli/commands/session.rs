use clap::Subcommand;
use serde_json::json;

use crate::backend::{AuthBackend, HttpAuthBackend};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::gate::{EdgeDecision, Gatekeeper, OracleVerdict, SessionContext};

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Ask the session oracle about a cookie header")]
    Check {
        #[arg(long, help = "Raw Cookie header to forward, e.g. 'ls_session=abc'")]
        cookie: Option<String>,
        #[arg(long, help = "Backend base URL (defaults to BACKEND_URL)")]
        backend: Option<String>,
    },

    #[command(about = "Run the edge gatekeeper for a path and show its decision")]
    Decide {
        #[arg(help = "Request path, optionally with a query string")]
        path: String,
        #[arg(long, help = "Raw Cookie header to forward")]
        cookie: Option<String>,
        #[arg(long, help = "Backend base URL (defaults to BACKEND_URL)")]
        backend: Option<String>,
    },

    #[command(about = "Invalidate a backend session")]
    Logout {
        #[arg(long, help = "Raw Cookie header identifying the session")]
        cookie: Option<String>,
        #[arg(long, help = "Backend base URL (defaults to BACKEND_URL)")]
        backend: Option<String>,
    },
}

fn http_backend(base_url: Option<String>) -> anyhow::Result<HttpAuthBackend> {
    let mut backend_config = config::config().backend.clone();
    if let Some(url) = base_url {
        backend_config.base_url = url;
    }
    Ok(HttpAuthBackend::new(&backend_config)?)
}

pub async fn handle(cmd: SessionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SessionCommands::Check { cookie, backend } => {
            let backend = http_backend(backend)?;
            let ctx = SessionContext::new(cookie);

            match backend.session(&ctx).await {
                OracleVerdict::Authenticated(user) => output_success(
                    &output_format,
                    "Session is authenticated",
                    Some(json!({ "verdict": "authenticated", "user": user })),
                ),
                OracleVerdict::Unauthenticated => output_success(
                    &output_format,
                    "Session is not authenticated",
                    Some(json!({ "verdict": "unauthenticated" })),
                ),
                OracleVerdict::Unreachable => output_error(
                    &output_format,
                    &format!("Session oracle at {} is unreachable", backend.session_url()),
                    Some("UNREACHABLE"),
                ),
            }
        }
        SessionCommands::Decide { path, cookie, backend } => {
            let backend = http_backend(backend)?;
            let app_config = config::config();
            let gatekeeper = Gatekeeper::new(app_config.routing.clone(), app_config.fallback.clone());
            let ctx = SessionContext::new(cookie);

            let (path_only, query) = match path.split_once('?') {
                Some((p, q)) => (p.to_string(), Some(q.to_string())),
                None => (path.clone(), None),
            };

            let class = gatekeeper.classify(&path_only);
            let decision = gatekeeper.evaluate(&path_only, query.as_deref(), &ctx, &backend).await;
            let message = match &decision {
                EdgeDecision::Continue => format!("{} continues", path),
                EdgeDecision::Rewrite { target } => format!("{} is rewritten to {}", path, target),
                EdgeDecision::Redirect { location } => format!("{} redirects to {}", path, location),
            };

            output_success(
                &output_format,
                &message,
                Some(json!({
                    "path": path,
                    "class": class,
                    "decision": decision,
                })),
            )
        }
        SessionCommands::Logout { cookie, backend } => {
            let backend = http_backend(backend)?;
            let ctx = SessionContext::new(cookie);

            match backend.logout(&ctx).await {
                Ok(receipt) => {
                    let cookies: Vec<String> = receipt
                        .set_cookies
                        .iter()
                        .filter_map(|v| v.to_str().ok().map(str::to_string))
                        .collect();
                    output_success(
                        &output_format,
                        "Backend session invalidated",
                        Some(json!({ "set_cookies": cookies })),
                    )
                }
                Err(e) => output_error(&output_format, &e.to_string(), Some("LOGOUT_FAILED")),
            }
        }
    }
}

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers;
use crate::middleware::edge_gatekeeper;
use crate::state::AppState;

/// Full gateway service: gatekeeper first, then routing on the (possibly
/// rewritten) path.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    // Wrapping the router (instead of Router::layer) so the demo rewrite
    // happens before route matching.
    let gated = from_fn_with_state(state.clone(), edge_gatekeeper).layer(routes(state));

    let app = Router::new()
        .fallback_service(gated)
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/session", get(handlers::session_get))
        .route("/api/company", get(handlers::company_get).post(handlers::company_post))
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .fallback(handlers::page)
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

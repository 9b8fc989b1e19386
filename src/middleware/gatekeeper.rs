use axum::{
    extract::{Request, State},
    http::uri::{PathAndQuery, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::gate::{EdgeDecision, SessionContext};
use crate::state::AppState;

/// Where a request was routed, inserted into request extensions by the
/// gatekeeper for downstream handlers.
#[derive(Clone, Debug)]
pub struct RoutedPath {
    /// Path the browser asked for (and still shows).
    pub visible_path: String,
    /// Path the request was routed to.
    pub canonical_path: String,
    pub demo: bool,
}

/// Edge gatekeeper middleware.
///
/// Must wrap the router rather than be added with `Router::layer`, otherwise
/// the demo rewrite would happen after routing and have no effect.
pub async fn edge_gatekeeper(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let ctx = SessionContext::from_headers(request.headers());

    let decision = state
        .gatekeeper
        .evaluate(&path, query.as_deref(), &ctx, state.backend.as_ref())
        .await;

    match decision {
        EdgeDecision::Continue => {
            request.extensions_mut().insert(RoutedPath {
                visible_path: path.clone(),
                canonical_path: path,
                demo: false,
            });
            next.run(request).await
        }
        EdgeDecision::Rewrite { target } => {
            let uri = match rewrite_uri(request.uri(), &target) {
                Some(uri) => uri,
                None => {
                    // Unreachable for paths that parsed in the first place; pass through untouched
                    tracing::error!("Could not rewrite {} to {}", path, target);
                    return next.run(request).await;
                }
            };
            tracing::debug!("Rewriting {} -> {}", path, uri.path());

            let canonical_path = uri.path().to_string();
            *request.uri_mut() = uri;
            request.extensions_mut().insert(RoutedPath {
                visible_path: path,
                canonical_path,
                demo: true,
            });
            next.run(request).await
        }
        EdgeDecision::Redirect { location } => {
            tracing::info!("Redirecting unauthenticated request for {} to {}", path, location);
            Redirect::temporary(&location).into_response()
        }
    }
}

fn rewrite_uri(original: &Uri, target: &str) -> Option<Uri> {
    let mut parts = original.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(target).ok()?);
    Uri::from_parts(parts).ok()
}

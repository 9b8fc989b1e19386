// handlers/pages.rs - page delivery (router fallback)
//
// Anything the gatekeeper let through that is not a gateway endpoint is a
// page. Pages are rendered elsewhere: with PAGES_UPSTREAM_URL set the request
// is forwarded there at its canonical path, otherwise the gateway answers
// with a route descriptor.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use serde_json::json;

use crate::backend::BackendError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, RoutedPath};
use crate::state::AppState;

const VISIBLE_PATH_HEADER: &str = "x-gateway-visible-path";
const DEMO_HEADER: &str = "x-gateway-demo";

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

fn upstream_request_headers(incoming: &HeaderMap, routed: &RoutedPath) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in incoming.iter() {
        if is_hop_by_hop(name)
            || name == header::HOST
            || name == header::CONTENT_LENGTH
            || name == header::ACCEPT_ENCODING
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Ok(visible) = HeaderValue::from_str(&routed.visible_path) {
        headers.insert(HeaderName::from_static(VISIBLE_PATH_HEADER), visible);
    }
    headers.insert(
        HeaderName::from_static(DEMO_HEADER),
        HeaderValue::from_static(if routed.demo { "true" } else { "false" }),
    );
    headers
}

pub async fn page(
    State(state): State<AppState>,
    routed: Option<Extension<RoutedPath>>,
    request: Request,
) -> Result<Response, ApiError> {
    let routed = match routed {
        Some(Extension(routed)) => routed,
        None => {
            let path = request.uri().path().to_string();
            RoutedPath {
                visible_path: path.clone(),
                canonical_path: path,
                demo: false,
            }
        }
    };

    let Some(upstream) = state.config.pages.upstream_url.as_deref() else {
        return Ok(ApiResponse::success(json!({
            "page": routed.canonical_path,
            "visible_path": routed.visible_path,
            "demo": routed.demo,
        }))
        .into_response());
    };

    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", upstream, path_and_query);

    let body = axum::body::to_bytes(body, state.config.pages.max_body_bytes)
        .await
        .map_err(|e| ApiError::bad_request(format!("Request body could not be read: {}", e)))?;

    tracing::debug!("Forwarding {} {} to page renderer", parts.method, path_and_query);

    let upstream_response = state
        .http
        .request(parts.method.clone(), url)
        .headers(upstream_request_headers(&parts.headers, &routed))
        .body(body)
        .send()
        .await
        .map_err(BackendError::from)?;

    let status = upstream_response.status();
    let upstream_headers = upstream_response.headers().clone();
    let bytes = upstream_response.bytes().await.map_err(BackendError::from)?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    for (name, value) in upstream_headers.iter() {
        if is_hop_by_hop(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        response.headers_mut().append(name.clone(), value.clone());
    }

    Ok(response)
}

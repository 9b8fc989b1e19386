#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashboard_gateway::{app, config::AppConfig, AppState};
use serde_json::json;
use tokio::net::TcpListener;

pub const VALID_SESSION: &str = "ls_session=valid-token";
pub const EXPIRED_SESSION: &str = "ls_session=expired-token";

pub struct TestServer {
    pub base_url: String,
}

async fn serve(router: Router) -> Result<TestServer> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
    })
}

fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Stand-in for the auth backend.
///
/// `/auth/session`: the valid token gets a user, `ls_session=falsy` gets a 200
/// with `authenticated: false`, everything else a 401.
/// `/auth/logout`: 200 with a clearing Set-Cookie, or 500 when the cookie
/// header mentions `explode`.
async fn mock_session(headers: HeaderMap) -> Response {
    let cookies = cookie_header(&headers);
    if cookies.contains(VALID_SESSION) {
        return Json(json!({ "user": { "id": "u-1", "email": "analyst@example.com" } })).into_response();
    }
    if cookies.contains("ls_session=falsy") {
        return Json(json!({ "authenticated": false, "user": null })).into_response();
    }
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "not authenticated" }))).into_response()
}

async fn mock_logout(headers: HeaderMap) -> Response {
    if cookie_header(&headers).contains("explode") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "logout exploded").into_response();
    }
    (
        [(header::SET_COOKIE, "ls_session=; Path=/; Max-Age=0")],
        Json(json!({ "ok": true })),
    )
        .into_response()
}

pub async fn spawn_backend() -> Result<TestServer> {
    let router = Router::new()
        .route("/auth/session", get(mock_session))
        .route("/auth/logout", post(mock_logout));
    serve(router).await
}

/// Base URL of a port nothing is listening on.
pub fn dead_backend_url() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}", port))
}

pub fn test_config(backend_url: &str) -> AppConfig {
    let mut config = AppConfig::development();
    config.backend.base_url = backend_url.to_string();
    config.backend.timeout_ms = 1000;
    config
}

pub async fn spawn_gateway_with(config: AppConfig) -> Result<TestServer> {
    let state = AppState::new(config)?;
    serve(app(state)).await
}

pub async fn spawn_gateway(backend_url: &str) -> Result<TestServer> {
    spawn_gateway_with(test_config(backend_url)).await
}

/// Gateway in front of a live mock backend.
pub async fn gateway() -> Result<TestServer> {
    let backend = spawn_backend().await?;
    spawn_gateway(&backend.base_url).await
}

/// Gateway whose backend cannot be reached.
pub async fn gateway_with_dead_backend() -> Result<TestServer> {
    spawn_gateway(&dead_backend_url()?).await
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("reqwest client")
}

pub fn location(res: &reqwest::Response) -> Option<String> {
    res.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn set_cookies(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

mod common;

use anyhow::Result;
use std::time::Duration;

use axum::{
    extract::Request,
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use common::VALID_SESSION;

/// Page renderer stand-in that describes what it was asked for. `/moved`
/// answers with a redirect and `/stalled` never answers in time.
async fn spawn_renderer() -> Result<String> {
    async fn moved() -> impl IntoResponse {
        Redirect::temporary("/elsewhere")
    }

    async fn stalled() -> &'static str {
        tokio::time::sleep(Duration::from_secs(30)).await;
        "too late"
    }

    async fn render(request: Request) -> Json<Value> {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!({
            "path": request.uri().path(),
            "query": request.uri().query(),
            "visible_path": header("x-gateway-visible-path"),
            "demo": header("x-gateway-demo"),
            "cookie": header("cookie"),
        }))
    }

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let router = Router::new()
            .route("/moved", get(moved))
            .route("/stalled", get(stalled))
            .fallback(render);
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn demo_page_is_fetched_at_its_canonical_path() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let mut config = common::test_config(&backend.base_url);
    config.pages.upstream_url = Some(spawn_renderer().await?);
    let server = common::spawn_gateway_with(config).await?;

    let res = common::client()
        .get(format!("{}/demo/finance/cashflow?range=30d", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["path"], "/finance/cashflow");
    assert_eq!(body["query"], "range=30d");
    assert_eq!(body["visible_path"], "/demo/finance/cashflow");
    assert_eq!(body["demo"], "true");
    Ok(())
}

#[tokio::test]
async fn protected_page_is_forwarded_with_the_browser_cookie() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let mut config = common::test_config(&backend.base_url);
    config.pages.upstream_url = Some(spawn_renderer().await?);
    let server = common::spawn_gateway_with(config).await?;

    let res = common::client()
        .get(format!("{}/overview", server.base_url))
        .header("cookie", VALID_SESSION)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["path"], "/overview");
    assert_eq!(body["demo"], "false");
    assert_eq!(body["cookie"], VALID_SESSION);
    Ok(())
}

#[tokio::test]
async fn unreachable_renderer_is_a_bad_gateway() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let mut config = common::test_config(&backend.base_url);
    config.pages.upstream_url = Some(common::dead_backend_url()?);
    let server = common::spawn_gateway_with(config).await?;

    let res = common::client()
        .get(format!("{}/", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.json::<Value>().await?["ok"], false);
    Ok(())
}

#[tokio::test]
async fn renderer_redirects_reach_the_browser() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let mut config = common::test_config(&backend.base_url);
    config.pages.upstream_url = Some(spawn_renderer().await?);
    let server = common::spawn_gateway_with(config).await?;

    let res = common::client()
        .get(format!("{}/demo/moved", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&res).as_deref(), Some("/elsewhere"));
    Ok(())
}

#[tokio::test]
async fn stalled_renderer_times_out_as_bad_gateway() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let mut config = common::test_config(&backend.base_url);
    config.pages.upstream_url = Some(spawn_renderer().await?);
    config.pages.timeout_ms = 300;
    let server = common::spawn_gateway_with(config).await?;

    let res = tokio::time::timeout(
        Duration::from_secs(10),
        common::client()
            .get(format!("{}/demo/stalled", server.base_url))
            .send(),
    )
    .await??;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.json::<Value>().await?["ok"], false);
    Ok(())
}

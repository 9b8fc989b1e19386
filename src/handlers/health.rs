use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::gate::{OracleVerdict, SessionContext};
use crate::state::AppState;

/// GET /api/health - liveness plus whether the session oracle answers at all.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.backend.session(&SessionContext::anonymous()).await {
        OracleVerdict::Unreachable => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "ok": false,
                "error": "session backend unreachable",
                "status": "degraded",
                "timestamp": now,
                "backend": "unreachable"
            })),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "status": "ok",
                "timestamp": now,
                "backend": "ok"
            })),
        ),
    }
}

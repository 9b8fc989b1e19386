// handlers/session.rs - GET /api/session
//
// Browser-side session probe used by the page gate. Asks the oracle afresh
// with the browser's cookies; there is no cookie fallback on this path.

use axum::{extract::State, http::HeaderMap};
use serde::Serialize;

use crate::error::ApiError;
use crate::gate::{OracleVerdict, SessionContext, SessionUser};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionProbe {
    pub authenticated: bool,
    pub user: Option<SessionUser>,
}

pub async fn session_get(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SessionProbe> {
    let ctx = SessionContext::from_headers(&headers);

    match state.backend.session(&ctx).await {
        OracleVerdict::Authenticated(user) => Ok(ApiResponse::success(SessionProbe {
            authenticated: true,
            user: Some(user),
        })),
        OracleVerdict::Unauthenticated => Ok(ApiResponse::success(SessionProbe {
            authenticated: false,
            user: None,
        })),
        OracleVerdict::Unreachable => Err(ApiError::service_unavailable("Session service unreachable")),
    }
}

// handlers/logout.rs - GET|POST /logout
//
// Best-effort backend logout, then always back to the login page. The user
// contract is "you end up at login", not "the backend confirmed".

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};

use crate::gate::SessionContext;
use crate::state::AppState;

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let ctx = SessionContext::from_headers(&headers);
    let mut response = Redirect::to(&state.config.routing.login_path).into_response();

    match state.backend.logout(&ctx).await {
        Ok(receipt) => {
            tracing::info!("Backend session invalidated");
            for cookie in receipt.set_cookies {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
        }
        Err(e) => {
            tracing::warn!("Backend logout failed, redirecting to login anyway: {}", e);
        }
    }

    response
}

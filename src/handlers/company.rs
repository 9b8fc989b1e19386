// handlers/company.rs - active company context handshake
//
// GET  /api/company  - report the current selection
// POST /api/company  - set ({ "company_id": "acme" }) or clear ({ "company_id": null })
//
// The identifier is opaque here; whether it names a real tenant is the
// backend's business.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, HeaderValue},
    Json,
};
use cookie::{time::Duration, Cookie, SameSite};
use serde::{Deserialize, Serialize};

use crate::config::CompanyCookieConfig;
use crate::error::ApiError;
use crate::gate::SessionContext;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompanySelection {
    #[serde(default)]
    pub company_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CompanyContext {
    pub company_id: Option<String>,
}

/// Cookie selecting `company_id`, replacing any previous selection.
pub fn company_cookie(config: &CompanyCookieConfig, company_id: &str) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), company_id.to_string()))
        .path("/")
        .max_age(Duration::days(config.max_age_days))
        .same_site(SameSite::Lax)
        .http_only(true)
        .secure(config.secure)
        .build()
}

/// Cookie that makes the browser drop the selection entirely.
pub fn company_cookie_removal(config: &CompanyCookieConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((config.cookie_name.clone(), String::new()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .secure(config.secure)
        .build();
    cookie.make_removal();
    cookie
}

fn header_value(cookie: &Cookie<'_>) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&cookie.encoded().to_string())
        .map_err(|_| ApiError::bad_request("company_id cannot be stored in a cookie"))
}

/// GET /api/company
pub async fn company_get(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<CompanyContext> {
    let ctx = SessionContext::from_headers(&headers);
    let company_id = ctx
        .cookie(&state.config.company.cookie_name)
        .filter(|id| !id.is_empty());

    Ok(ApiResponse::success(CompanyContext { company_id }))
}

/// POST /api/company
pub async fn company_post(
    State(state): State<AppState>,
    payload: Result<Json<CompanySelection>, JsonRejection>,
) -> ApiResult<CompanyContext> {
    let Json(selection) = payload.map_err(|rejection| {
        tracing::debug!("Rejected company selection: {}", rejection.body_text());
        ApiError::invalid_json(rejection.body_text())
    })?;

    // A blank identifier is a clear, never an empty-valued cookie
    let company_id = selection.company_id.filter(|id| !id.trim().is_empty());
    let config = &state.config.company;

    let cookie = match &company_id {
        Some(id) => {
            tracing::info!("Active company set to {}", id);
            company_cookie(config, id)
        }
        None => {
            tracing::info!("Active company cleared");
            company_cookie_removal(config)
        }
    };

    Ok(ApiResponse::success(CompanyContext { company_id }).with_cookie(header_value(&cookie)?))
}

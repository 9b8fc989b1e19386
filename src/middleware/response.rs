use axum::{
    response::{IntoResponse, Json, Response},
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that adds the `ok: true` envelope.
///
/// Object payloads are flattened into the envelope
/// (`{ "ok": true, "company_id": "acme" }`); anything else lands under `data`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub cookies: Vec<HeaderValue>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            cookies: Vec::new(),
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
            cookies: Vec::new(),
        }
    }

    /// Attach a `Set-Cookie` header
    pub fn with_cookie(mut self, cookie: HeaderValue) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "ok": false,
                        "error": "Failed to serialize response data"
                    }))
                ).into_response();
            }
        };

        let envelope = match data_value {
            Value::Object(mut fields) => {
                fields.insert("ok".to_string(), Value::Bool(true));
                Value::Object(fields)
            }
            other => json!({ "ok": true, "data": other }),
        };

        let mut response = (status, Json(envelope)).into_response();
        for cookie in self.cookies {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        response
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

use axum::http::{header, HeaderMap};
use cookie::Cookie;
use serde::Serialize;
use serde_json::Value;

/// Inbound credentials for one request: the raw `Cookie` header, nothing else.
///
/// Every gate function takes this explicitly so decisions never depend on
/// ambient cookie state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    cookie_header: Option<String>,
}

impl SessionContext {
    pub fn new(cookie_header: Option<String>) -> Self {
        let cookie_header = cookie_header.filter(|raw| !raw.trim().is_empty());
        Self { cookie_header }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build from request headers. Multiple `Cookie` headers (HTTP/2 splits
    /// them) are joined back into one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let parts: Vec<&str> = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        if parts.is_empty() {
            Self::anonymous()
        } else {
            Self::new(Some(parts.join("; ")))
        }
    }

    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie_header.as_deref()
    }

    /// Value of the named cookie, if present. Values that do not percent-decode
    /// to UTF-8 are returned raw.
    pub fn cookie(&self, name: &str) -> Option<String> {
        let raw = self.cookie_header.as_deref()?;
        raw.split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                Cookie::parse_encoded(pair.to_string())
                    .or_else(|_| Cookie::parse(pair.to_string()))
                    .ok()
            })
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string())
    }

    /// First of `names` present with a non-empty value.
    pub fn first_present<'a>(&self, names: &'a [String]) -> Option<&'a str> {
        names
            .iter()
            .find(|name| self.cookie(name).is_some_and(|v| !v.is_empty()))
            .map(String::as_str)
    }
}

/// Opaque identity payload returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionUser(pub Value);

/// What the page-side gate knows about the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Authenticated(SessionUser),
    Unauthenticated,
}

/// Answer from the session oracle.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleVerdict {
    Authenticated(SessionUser),
    /// The oracle answered and said no.
    Unauthenticated,
    /// The oracle could not be asked.
    Unreachable,
}

impl OracleVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            OracleVerdict::Authenticated(_) => "authenticated",
            OracleVerdict::Unauthenticated => "unauthenticated",
            OracleVerdict::Unreachable => "unreachable",
        }
    }

    /// Interpret a 2xx session body: a truthy `user` or `authenticated` field
    /// means a live session.
    pub fn from_session_body(body: &Value) -> Self {
        if let Some(user) = body.get("user").filter(|u| is_truthy(u)) {
            return OracleVerdict::Authenticated(SessionUser(user.clone()));
        }
        if body.get("authenticated").is_some_and(is_truthy) {
            let user = body.get("user").cloned().unwrap_or(Value::Null);
            return OracleVerdict::Authenticated(SessionUser(user));
        }
        OracleVerdict::Unauthenticated
    }
}

impl From<OracleVerdict> for SessionState {
    /// Page-side view: anything short of a confirmed session is "not logged in".
    fn from(verdict: OracleVerdict) -> Self {
        match verdict {
            OracleVerdict::Authenticated(user) => SessionState::Authenticated(user),
            OracleVerdict::Unauthenticated | OracleVerdict::Unreachable => SessionState::Unauthenticated,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn names() -> Vec<String> {
        vec!["ls_session".to_string(), "ls_jwt".to_string(), "session".to_string()]
    }

    #[test]
    fn reads_named_cookies() {
        let ctx = SessionContext::new(Some("theme=dark; ls_jwt=abc.def; active_company_id=acme".into()));
        assert_eq!(ctx.cookie("ls_jwt").as_deref(), Some("abc.def"));
        assert_eq!(ctx.cookie("active_company_id").as_deref(), Some("acme"));
        assert_eq!(ctx.cookie("missing"), None);
    }

    #[test]
    fn joins_split_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("session=xyz"));

        let ctx = SessionContext::from_headers(&headers);
        assert_eq!(ctx.cookie_header(), Some("a=1; session=xyz"));
        assert_eq!(ctx.first_present(&names()), Some("session"));
    }

    #[test]
    fn empty_cookie_values_do_not_count_as_present() {
        let ctx = SessionContext::new(Some("ls_session=; theme=dark".into()));
        assert_eq!(ctx.first_present(&names()), None);
    }

    #[test]
    fn undecodable_values_still_count_as_present() {
        let ctx = SessionContext::new(Some("theme=dark; ls_session=%FF".into()));
        assert_eq!(ctx.cookie("ls_session").as_deref(), Some("%FF"));
        assert_eq!(ctx.first_present(&names()), Some("ls_session"));
    }

    #[test]
    fn cookie_names_must_match_exactly() {
        let ctx = SessionContext::new(Some("my_session=1; ls_session_old=2".into()));
        assert_eq!(ctx.first_present(&names()), None);
    }

    #[test]
    fn blank_header_is_anonymous() {
        assert_eq!(SessionContext::new(Some("  ".into())), SessionContext::anonymous());
        assert_eq!(SessionContext::from_headers(&HeaderMap::new()).cookie_header(), None);
    }

    #[test]
    fn session_body_with_user_is_authenticated() {
        let body = json!({ "user": { "id": "u-1", "email": "a@b.co" } });
        assert_eq!(
            OracleVerdict::from_session_body(&body),
            OracleVerdict::Authenticated(SessionUser(json!({ "id": "u-1", "email": "a@b.co" })))
        );
    }

    #[test]
    fn session_body_with_authenticated_flag_is_authenticated() {
        let verdict = OracleVerdict::from_session_body(&json!({ "authenticated": true }));
        assert_eq!(verdict, OracleVerdict::Authenticated(SessionUser(Value::Null)));
    }

    #[test]
    fn falsy_session_bodies_are_unauthenticated() {
        for body in [
            json!({}),
            json!({ "user": null }),
            json!({ "authenticated": false }),
            json!({ "user": false, "authenticated": 0 }),
            json!(null),
        ] {
            assert_eq!(OracleVerdict::from_session_body(&body), OracleVerdict::Unauthenticated, "{}", body);
        }
    }

    #[test]
    fn unreachable_collapses_to_unauthenticated_on_the_page() {
        assert_eq!(SessionState::from(OracleVerdict::Unreachable), SessionState::Unauthenticated);
        assert_eq!(SessionState::from(OracleVerdict::Unauthenticated), SessionState::Unauthenticated);
    }
}

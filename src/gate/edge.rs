use serde::Serialize;

use crate::backend::AuthBackend;
use crate::config::{FallbackPolicy, RoutingRules};
use super::classify::{classify, PathClass};
use super::demo::rewrite_path_and_query;
use super::session::{OracleVerdict, SessionContext};

/// Outcome of the edge gatekeeper for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum EdgeDecision {
    /// Pass the request through unmodified.
    Continue,
    /// Route internally to `target`; the browser URL stays as requested.
    Rewrite { target: String },
    /// Send the browser to `location`.
    Redirect { location: String },
}

/// Why a protected request was let through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowReason {
    Session,
    FallbackCookie(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allow(AllowReason),
    Deny,
}

/// Authorization for a protected path, given the oracle's verdict.
///
/// The fallback cookies are only looked at when the oracle was unreachable;
/// an authoritative "no" is never overridden.
pub fn authorize(verdict: &OracleVerdict, ctx: &SessionContext, fallback: &FallbackPolicy) -> Access {
    match verdict {
        OracleVerdict::Authenticated(_) => Access::Allow(AllowReason::Session),
        OracleVerdict::Unauthenticated => Access::Deny,
        OracleVerdict::Unreachable if fallback.enabled => match ctx.first_present(&fallback.cookie_names) {
            Some(name) => Access::Allow(AllowReason::FallbackCookie(name.to_string())),
            None => Access::Deny,
        },
        OracleVerdict::Unreachable => Access::Deny,
    }
}

/// Login URL for a denied request, carrying the original path as `redirect`
/// unless the request was for the login page itself.
pub fn login_redirect(original_path: &str, rules: &RoutingRules) -> String {
    if original_path == rules.login_path {
        return rules.login_path.clone();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("redirect", original_path)
        .finish();
    format!("{}?{}", rules.login_path, query)
}

#[derive(Debug, Clone)]
pub struct Gatekeeper {
    rules: RoutingRules,
    fallback: FallbackPolicy,
}

impl Gatekeeper {
    pub fn new(rules: RoutingRules, fallback: FallbackPolicy) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &RoutingRules {
        &self.rules
    }

    pub fn classify(&self, path: &str) -> PathClass {
        classify(path, &self.rules)
    }

    /// Decide a protected request from an already-obtained verdict.
    pub fn decide_protected(&self, path: &str, verdict: &OracleVerdict, ctx: &SessionContext) -> EdgeDecision {
        match authorize(verdict, ctx, &self.fallback) {
            Access::Allow(AllowReason::Session) => EdgeDecision::Continue,
            Access::Allow(AllowReason::FallbackCookie(name)) => {
                tracing::warn!(
                    "Session oracle unreachable; allowing {} on presence of fallback cookie '{}'",
                    path,
                    name
                );
                EdgeDecision::Continue
            }
            Access::Deny => EdgeDecision::Redirect {
                location: login_redirect(path, &self.rules),
            },
        }
    }

    /// Run the full per-request state machine. The oracle is consulted only
    /// for protected paths, exactly once.
    pub async fn evaluate(
        &self,
        path: &str,
        query: Option<&str>,
        ctx: &SessionContext,
        backend: &dyn AuthBackend,
    ) -> EdgeDecision {
        let class = self.classify(path);
        let decision = match class {
            PathClass::Public => EdgeDecision::Continue,
            PathClass::Demo => EdgeDecision::Rewrite {
                target: rewrite_path_and_query(path, query, &self.rules),
            },
            PathClass::Protected => {
                let verdict = backend.session(ctx).await;
                tracing::debug!("Session oracle verdict for {}: {}", path, verdict.as_str());
                self.decide_protected(path, &verdict, ctx)
            }
        };

        tracing::debug!("Gate {} [{}] -> {:?}", path, class.as_str(), decision);
        decision
    }
}

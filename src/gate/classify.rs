use serde::Serialize;

use crate::config::RoutingRules;
use super::demo::rewrite_demo_path;

/// How the gatekeeper treats a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathClass {
    Public,
    Demo,
    Protected,
}

impl PathClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathClass::Public => "public",
            PathClass::Demo => "demo",
            PathClass::Protected => "protected",
        }
    }
}

/// True when `path` equals `prefix` or sits below it (`prefix/...`).
pub fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// True when `path` is strictly below the demo prefix, i.e. has at least one
/// non-empty segment after it.
pub fn is_demo_path(path: &str, rules: &RoutingRules) -> bool {
    let prefix = rules.demo_prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.starts_with('/') && rest.len() > 1,
        None => false,
    }
}

fn is_demo_root(path: &str, rules: &RoutingRules) -> bool {
    let prefix = rules.demo_prefix.trim_end_matches('/');
    path == prefix || path.strip_prefix(prefix) == Some("/")
}

fn is_asset_or_api(path: &str, rules: &RoutingRules) -> bool {
    rules.static_prefixes.iter().any(|p| is_under(path, p))
        || rules.api_prefixes.iter().any(|p| is_under(path, p))
        || path.contains('.')
}

/// Classify a request path (no query string). Total over all inputs.
pub fn classify(path: &str, rules: &RoutingRules) -> PathClass {
    if path == "/" || path.is_empty() {
        return PathClass::Public;
    }

    if rules.public_prefixes.iter().any(|p| is_under(path, p)) || is_demo_root(path, rules) {
        return PathClass::Public;
    }

    if is_asset_or_api(path, rules) {
        return PathClass::Public;
    }

    if is_demo_path(path, rules) {
        // Never rewrite onto asset or API delivery
        let target = rewrite_demo_path(path, rules);
        if is_asset_or_api(&target, rules) {
            return PathClass::Public;
        }
        return PathClass::Demo;
    }

    PathClass::Protected
}

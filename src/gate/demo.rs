use crate::config::RoutingRules;

/// Map a demo path onto the canonical page path by stripping one leading
/// demo segment. `/demo` and `/demo/` map to `/`; paths outside the demo
/// prefix are returned unchanged.
pub fn rewrite_demo_path(path: &str, rules: &RoutingRules) -> String {
    let prefix = rules.demo_prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}

/// Rewrite a full path-and-query, carrying the query string through untouched.
pub fn rewrite_path_and_query(path: &str, query: Option<&str>, rules: &RoutingRules) -> String {
    let canonical = rewrite_demo_path(path, rules);
    match query {
        Some(q) if !q.is_empty() => format!("{}?{}", canonical, q),
        _ => canonical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RoutingRules {
        RoutingRules::default()
    }

    #[test]
    fn strips_the_demo_segment() {
        assert_eq!(rewrite_demo_path("/demo/overview", &rules()), "/overview");
        assert_eq!(rewrite_demo_path("/demo/finance/cashflow", &rules()), "/finance/cashflow");
    }

    #[test]
    fn demo_root_maps_to_root() {
        assert_eq!(rewrite_demo_path("/demo", &rules()), "/");
        assert_eq!(rewrite_demo_path("/demo/", &rules()), "/");
    }

    #[test]
    fn strips_exactly_one_segment() {
        assert_eq!(rewrite_demo_path("/demo/demo/overview", &rules()), "/demo/overview");
    }

    #[test]
    fn leaves_other_paths_alone() {
        assert_eq!(rewrite_demo_path("/overview", &rules()), "/overview");
        assert_eq!(rewrite_demo_path("/demonstration", &rules()), "/demonstration");
    }

    #[test]
    fn keeps_the_query_string() {
        assert_eq!(
            rewrite_path_and_query("/demo/overview", Some("range=30d"), &rules()),
            "/overview?range=30d"
        );
        assert_eq!(rewrite_path_and_query("/demo/overview", Some(""), &rules()), "/overview");
        assert_eq!(rewrite_path_and_query("/demo/overview", None, &rules()), "/overview");
    }
}

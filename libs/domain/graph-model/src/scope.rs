// [libs/domain/graph-model/src/scope.rs]
//! Scope checking (§3 invariant 2, GLOSSARY "Scope", "Apex domain").

/// Extracts the host component from a node id of the shape
/// `subdomain:api.example.com`, `http_service:https://api.example.com/`,
/// or `endpoint:https://api.example.com/path`. Returns `None` if no
/// host-bearing prefix is recognized.
pub fn extract_host(node_id: &str) -> Option<String> {
    let (_, rest) = node_id.split_once(':')?;
    let without_scheme = rest
        .strip_prefix("https://")
        .or_else(|| rest.strip_prefix("http://"))
        .unwrap_or(rest);
    let host_and_path = without_scheme.split(['/', '?']).next().unwrap_or(without_scheme);
    let host = host_and_path.split(':').next().unwrap_or(host_and_path);
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// True if `host` is the apex domain itself or a subdomain of it.
pub fn is_in_scope(host: &str, apex_domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let apex = apex_domain.trim_end_matches('.').to_ascii_lowercase();
    host == apex || host.ends_with(&format!(".{apex}"))
}

/// The example-reserved domains that must never be persisted, per the
/// export-time filter in §4.2 ("Scope filtering at export").
pub fn is_reserved_example_domain(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host == "example.com" || host.ends_with(".example.com") || host == "example.org" || host.ends_with(".example.org")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_host_from_subdomain_id() {
        assert_eq!(extract_host("subdomain:api.example.com"), Some("api.example.com".to_string()));
    }

    #[test]
    fn extracts_host_from_url_shaped_id() {
        assert_eq!(
            extract_host("http_service:https://api.example.com:8443/status"),
            Some("api.example.com".to_string())
        );
        assert_eq!(
            extract_host("endpoint:https://api.example.com/v1/users?x=1"),
            Some("api.example.com".to_string())
        );
    }

    #[test]
    fn scope_check_accepts_apex_and_subdomains_only() {
        assert!(is_in_scope("example.com", "example.com"));
        assert!(is_in_scope("api.example.com", "example.com"));
        assert!(!is_in_scope("dev.other.com", "example.com"));
        assert!(!is_in_scope("notexample.com", "example.com"));
    }

    #[test]
    fn reserved_example_domains_are_flagged() {
        assert!(is_reserved_example_domain("example.com"));
        assert!(is_reserved_example_domain("www.example.org"));
        assert!(!is_reserved_example_domain("colombes.fr"));
    }
}

// [libs/core/scoring/src/category.rs]
//! Endpoint categorization from path shape (§4.4.3 step 1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointCategory {
    Api,
    Admin,
    Auth,
    Public,
    Static,
    Legacy,
    Healthcheck,
    Unknown,
}

impl EndpointCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointCategory::Api => "API",
            EndpointCategory::Admin => "ADMIN",
            EndpointCategory::Auth => "AUTH",
            EndpointCategory::Public => "PUBLIC",
            EndpointCategory::Static => "STATIC",
            EndpointCategory::Legacy => "LEGACY",
            EndpointCategory::Healthcheck => "HEALTHCHECK",
            EndpointCategory::Unknown => "UNKNOWN",
        }
    }

    /// Ordered rule list from §4.4.3 step 1. Order matters: the
    /// first matching rule wins, so `/admin/api/users` categorizes as
    /// `API`, not `ADMIN`, since `API` is checked first.
    pub fn classify(path: &str) -> EndpointCategory {
        let lower = path.to_ascii_lowercase();
        if lower.contains("/api/") || lower.starts_with("/api") || lower.contains("/v1/") || lower.contains("/v2/") || lower.contains("/graphql") {
            EndpointCategory::Api
        } else if lower.contains("/admin") || lower.contains("/dashboard") || lower.contains("/manage") || lower.contains("/panel") {
            EndpointCategory::Admin
        } else if lower.contains("/login") || lower.contains("/signin") || lower.contains("/auth") || lower.contains("/oauth") {
            EndpointCategory::Auth
        } else if lower.ends_with(".js") || lower.ends_with(".css") || lower.ends_with(".png") || lower.ends_with(".jpg") || lower.ends_with(".svg") || lower.ends_with(".woff2") {
            EndpointCategory::Static
        } else if lower.contains("/.env") || lower.contains("/.git") || lower.contains("/config") {
            EndpointCategory::Legacy
        } else if lower.contains("/health") || lower.contains("/ping") || lower.contains("/status") || lower.contains("/readyz") || lower.contains("/livez") {
            EndpointCategory::Healthcheck
        } else if lower == "/" || lower.is_empty() {
            EndpointCategory::Public
        } else {
            EndpointCategory::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_wins_over_admin_when_nested() {
        assert_eq!(EndpointCategory::classify("/admin/api/users"), EndpointCategory::Api);
    }

    #[test]
    fn healthcheck_and_public_are_checked_last() {
        assert_eq!(EndpointCategory::classify("/healthz"), EndpointCategory::Healthcheck);
        assert_eq!(EndpointCategory::classify("/"), EndpointCategory::Public);
    }

    #[test]
    fn classifies_api_auth_static_legacy() {
        assert_eq!(EndpointCategory::classify("/api/users/1"), EndpointCategory::Api);
        assert_eq!(EndpointCategory::classify("/login"), EndpointCategory::Auth);
        assert_eq!(EndpointCategory::classify("/assets/app.js"), EndpointCategory::Static);
        assert_eq!(EndpointCategory::classify("/.env"), EndpointCategory::Legacy);
    }

    #[test]
    fn unrecognized_path_is_unknown() {
        assert_eq!(EndpointCategory::classify("/something-else"), EndpointCategory::Unknown);
    }
}

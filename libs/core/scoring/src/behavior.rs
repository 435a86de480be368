// [libs/core/scoring/src/behavior.rs]
//! Behavior hint derivation from HTTP method and path (§4.4.3 step 2).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BehaviorHint {
    ReadOnly,
    StateChanging,
    IdBasedAccess,
    Other,
    Unknown,
}

impl BehaviorHint {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorHint::ReadOnly => "READ_ONLY",
            BehaviorHint::StateChanging => "STATE_CHANGING",
            BehaviorHint::IdBasedAccess => "ID_BASED_ACCESS",
            BehaviorHint::Other => "OTHER",
            BehaviorHint::Unknown => "UNKNOWN",
        }
    }

    /// `POST`/`PUT`/`PATCH`/`DELETE` dominate over the id-pattern check:
    /// a state-changing id-based endpoint gets `STATE_CHANGING` here,
    /// and `has_id_pattern` is reported separately by the caller so
    /// hypothesis generation (§4.4.3 step 5) can still see both.
    pub fn derive(method: &str, path_and_query: &str) -> BehaviorHint {
        let method = method.to_ascii_uppercase();
        if matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE") {
            return BehaviorHint::StateChanging;
        }
        if has_id_pattern(path_and_query) {
            return BehaviorHint::IdBasedAccess;
        }
        if method == "GET" || method == "HEAD" {
            return BehaviorHint::ReadOnly;
        }
        if method.is_empty() {
            BehaviorHint::Unknown
        } else {
            BehaviorHint::Other
        }
    }
}

/// `id=`, `user_id=` query parameters, or a `/:id`-shaped path segment.
pub fn has_id_pattern(path_and_query: &str) -> bool {
    let lower = path_and_query.to_ascii_lowercase();
    if lower.contains("id=") || lower.contains("user_id=") {
        return true;
    }
    lower.split('/').any(|segment| {
        let segment = segment.split('?').next().unwrap_or(segment);
        segment.starts_with(':') || (segment.chars().all(|c| c.is_ascii_digit()) && !segment.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_is_always_state_changing() {
        assert_eq!(BehaviorHint::derive("POST", "/api/users/:id"), BehaviorHint::StateChanging);
    }

    #[test]
    fn get_with_id_path_is_id_based_access() {
        assert_eq!(BehaviorHint::derive("GET", "/api/users/:id"), BehaviorHint::IdBasedAccess);
    }

    #[test]
    fn plain_get_is_read_only() {
        assert_eq!(BehaviorHint::derive("GET", "/api/users"), BehaviorHint::ReadOnly);
    }

    #[test]
    fn query_string_id_param_is_detected() {
        assert!(has_id_pattern("/export?user_id=42"));
    }
}

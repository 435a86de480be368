// [libs/core/scoring/src/parameter.rs]
//! Parameter sensitivity classification (§4.4.3 step 4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterSensitivity {
    Low,
    Medium,
    High,
}

impl ParameterSensitivity {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterSensitivity::Low => "LOW",
            ParameterSensitivity::Medium => "MEDIUM",
            ParameterSensitivity::High => "HIGH",
        }
    }

    /// `password, token, key, secret -> HIGH`; `id, user -> MEDIUM`; else `LOW`.
    pub fn classify(name: &str) -> ParameterSensitivity {
        let lower = name.to_ascii_lowercase();
        const HIGH: &[&str] = &["password", "passwd", "token", "key", "secret", "apikey", "api_key"];
        const MEDIUM: &[&str] = &["id", "user", "user_id", "username", "email", "account"];
        if HIGH.iter().any(|needle| lower.contains(needle)) {
            ParameterSensitivity::High
        } else if MEDIUM.iter().any(|needle| lower.contains(needle)) {
            ParameterSensitivity::Medium
        } else {
            ParameterSensitivity::Low
        }
    }
}

/// Extracts parameter names from a path template and query string, per
/// §4.4.3 step 4 ("extract parameters from path/query").
pub fn extract_parameter_names(path: &str, query: &str) -> Vec<String> {
    let mut names = Vec::new();
    for segment in path.split('/') {
        if let Some(stripped) = segment.strip_prefix(':') {
            if !stripped.is_empty() {
                names.push(stripped.to_string());
            }
        }
    }
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let name = pair.split('=').next().unwrap_or(pair);
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    names
}

// [libs/domain/reflection/src/merge_back.rs]
//! Turns sandboxed script output into graph-upsert candidates, or
//! counts it against the unknown-shape metric if the shape is not
//! recognized (§4.5, "Merge-back").

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single fact recovered from a reflection script's stdout, tagged
/// with its provenance so downstream graph writes can record
/// `source=reflection:<script_type>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeCandidate {
    pub kind: MergeCandidateKind,
    pub value: String,
    pub source: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeCandidateKind {
    Subdomain,
    Technology,
    ExposureFinding,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeOutcome {
    pub candidates: Vec<MergeCandidate>,
    pub unrecognized_shapes: u64,
}

/// Recognizes the three stdout shapes the script generator's templates
/// emit: `{"subdomains": [...]}`, `{"technologies": [...]}`, and
/// `{"exposure_findings": [...]}`. A document matching none of these
/// increments `unrecognized_shapes` instead of failing the caller.
pub fn merge_back(script_type: &str, output: &Value) -> MergeOutcome {
    let source = format!("reflection:{script_type}");

    if let Some(subdomains) = output.get("subdomains").and_then(Value::as_array) {
        let candidates = subdomains
            .iter()
            .filter_map(Value::as_str)
            .map(|host| MergeCandidate {
                kind: MergeCandidateKind::Subdomain,
                value: host.to_string(),
                source: source.clone(),
            })
            .collect();
        return MergeOutcome { candidates, unrecognized_shapes: 0 };
    }

    if let Some(technologies) = output.get("technologies").and_then(Value::as_array) {
        let candidates = technologies
            .iter()
            .filter_map(Value::as_str)
            .map(|tech| MergeCandidate {
                kind: MergeCandidateKind::Technology,
                value: tech.to_string(),
                source: source.clone(),
            })
            .collect();
        return MergeOutcome { candidates, unrecognized_shapes: 0 };
    }

    if let Some(findings) = output.get("exposure_findings").and_then(Value::as_array) {
        let candidates = findings
            .iter()
            .filter_map(|finding| finding.get("url").and_then(Value::as_str))
            .map(|url| MergeCandidate {
                kind: MergeCandidateKind::ExposureFinding,
                value: url.to_string(),
                source: source.clone(),
            })
            .collect();
        return MergeOutcome { candidates, unrecognized_shapes: 0 };
    }

    MergeOutcome { candidates: Vec::new(), unrecognized_shapes: 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subdomain_shape_is_tagged_with_script_source() {
        let outcome = merge_back("dns_bruteforce", &json!({"subdomains": ["dev.example.com"]}));
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].source, "reflection:dns_bruteforce");
        assert_eq!(outcome.candidates[0].kind, MergeCandidateKind::Subdomain);
    }

    #[test]
    fn exposure_findings_extract_urls() {
        let outcome = merge_back("config_checker", &json!({"exposure_findings": [{"url": "https://x/.env", "checked": true}]}));
        assert_eq!(outcome.candidates[0].value, "https://x/.env");
    }

    #[test]
    fn unrecognized_shape_is_counted_not_dropped_silently() {
        let outcome = merge_back("mystery", &json!({"status": "not_implemented"}));
        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.unrecognized_shapes, 1);
    }
}

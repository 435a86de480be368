// [libs/domain/reflection/src/analyzer.rs]
//! Per-tool analyzer registry (§4.5, "Analyzer").

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub kind: String,
    pub severity: String,
    pub message: String,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentOpportunity {
    pub kind: String,
    pub targets: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub action: String,
    pub script_type: Option<String>,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerResult {
    pub valid: bool,
    pub completeness_score: f64,
    pub issues: Vec<Issue>,
    pub enrichment_opportunities: Vec<EnrichmentOpportunity>,
    pub suggested_actions: Vec<SuggestedAction>,
}

impl AnalyzerResult {
    fn clean() -> Self {
        Self {
            valid: true,
            completeness_score: 1.0,
            issues: Vec::new(),
            enrichment_opportunities: Vec::new(),
            suggested_actions: Vec::new(),
        }
    }
}

pub type AnalyzerFn = fn(&Value) -> AnalyzerResult;

/// Returns the pre-declared analyzer for `tool_name`, if one exists.
/// Unregistered tools fall back to a permissive pass-through in
/// `analyze` rather than failing the phase.
pub fn registry() -> HashMap<&'static str, AnalyzerFn> {
    let mut analyzers: HashMap<&'static str, AnalyzerFn> = HashMap::new();
    analyzers.insert("subdomain_enum", analyze_subdomain_enum);
    analyzers.insert("http_probe", analyze_http_probe);
    analyzers.insert("wayback", analyze_wayback);
    analyzers.insert("dns_resolve", analyze_dns_resolve);
    analyzers
}

pub fn analyze(tool_name: &str, output: &Value) -> AnalyzerResult {
    match registry().get(tool_name) {
        Some(analyzer) => analyzer(output),
        None => AnalyzerResult::clean(),
    }
}

fn analyze_subdomain_enum(output: &Value) -> AnalyzerResult {
    let subdomains = output.get("subdomains").and_then(Value::as_array).map(Vec::len).unwrap_or(0);
    if subdomains == 0 {
        return AnalyzerResult {
            valid: true,
            completeness_score: 0.0,
            issues: vec![Issue {
                kind: "empty_result".to_string(),
                severity: "WARNING".to_string(),
                message: "subdomain_enum returned no hosts".to_string(),
                data: None,
            }],
            enrichment_opportunities: vec![EnrichmentOpportunity {
                kind: "dns_bruteforce".to_string(),
                targets: Vec::new(),
                reason: "no passive sources returned results; a targeted wordlist may surface hosts".to_string(),
            }],
            suggested_actions: vec![
                SuggestedAction {
                    action: "retry".to_string(),
                    script_type: None,
                    targets: Vec::new(),
                },
                SuggestedAction {
                    action: "generate_script".to_string(),
                    script_type: Some("dns_bruteforce".to_string()),
                    targets: Vec::new(),
                },
            ],
        };
    }
    AnalyzerResult::clean()
}

fn analyze_http_probe(output: &Value) -> AnalyzerResult {
    let results = output.get("results").and_then(Value::as_array).cloned().unwrap_or_default();
    let total = results.len().max(1);
    let server_errors = results
        .iter()
        .filter(|r| r.get("status_code").and_then(Value::as_u64).map(|code| (500..600).contains(&code)).unwrap_or(false))
        .count();

    if server_errors * 2 > total {
        return AnalyzerResult {
            valid: true,
            completeness_score: 1.0 - (server_errors as f64 / total as f64),
            issues: vec![Issue {
                kind: "many_server_errors".to_string(),
                severity: "WARNING".to_string(),
                message: format!("{server_errors}/{total} probed hosts returned 5xx"),
                data: None,
            }],
            enrichment_opportunities: Vec::new(),
            suggested_actions: vec![SuggestedAction {
                action: "investigate".to_string(),
                script_type: None,
                targets: Vec::new(),
            }],
        };
    }
    AnalyzerResult::clean()
}

fn analyze_wayback(output: &Value) -> AnalyzerResult {
    let entries = output.as_array().cloned().unwrap_or_default();
    let api_hits: Vec<String> = entries
        .iter()
        .filter_map(|entry| entry.get("path").and_then(Value::as_str))
        .filter(|path| path.contains("/api/"))
        .map(str::to_string)
        .collect();

    if !api_hits.is_empty() {
        return AnalyzerResult {
            valid: true,
            completeness_score: 1.0,
            issues: Vec::new(),
            enrichment_opportunities: vec![EnrichmentOpportunity {
                kind: "api_discovery".to_string(),
                targets: api_hits,
                reason: "archived URLs reference an API namespace".to_string(),
            }],
            suggested_actions: Vec::new(),
        };
    }
    AnalyzerResult::clean()
}

fn analyze_dns_resolve(output: &Value) -> AnalyzerResult {
    let entries = output.as_array().cloned().unwrap_or_default();
    if entries.is_empty() {
        return AnalyzerResult {
            valid: true,
            completeness_score: 0.0,
            issues: vec![Issue {
                kind: "empty_result".to_string(),
                severity: "INFO".to_string(),
                message: "dns_resolve returned no records".to_string(),
                data: None,
            }],
            enrichment_opportunities: Vec::new(),
            suggested_actions: Vec::new(),
        };
    }
    AnalyzerResult::clean()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_subdomain_list_suggests_retry_and_bruteforce() {
        let result = analyze("subdomain_enum", &json!({"subdomains": []}));
        assert_eq!(result.completeness_score, 0.0);
        assert!(result.suggested_actions.iter().any(|a| a.action == "retry"));
        assert!(result
            .suggested_actions
            .iter()
            .any(|a| a.script_type.as_deref() == Some("dns_bruteforce")));
    }

    #[test]
    fn majority_5xx_probe_suggests_investigation() {
        let output = json!({"results": [
            {"url": "a", "status_code": 500},
            {"url": "b", "status_code": 503},
            {"url": "c", "status_code": 200},
        ]});
        let result = analyze("http_probe", &output);
        assert!(result.suggested_actions.iter().any(|a| a.action == "investigate"));
    }

    #[test]
    fn wayback_api_paths_suggest_api_discovery() {
        let output = json!([{"path": "/api/v1/users", "method": "GET", "source": "wayback", "origin": "https://x"}]);
        let result = analyze("wayback", &output);
        assert_eq!(result.enrichment_opportunities[0].kind, "api_discovery");
    }

    #[test]
    fn unregistered_tool_passes_through_clean() {
        let result = analyze("asn_lookup", &json!([]));
        assert!(result.valid);
        assert_eq!(result.completeness_score, 1.0);
    }
}

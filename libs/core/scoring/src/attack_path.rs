// [libs/core/scoring/src/attack_path.rs]
//! Attack path scoring and action-suggestion gating (§4.4.5).

use crate::behavior::BehaviorHint;
use crate::category::EndpointCategory;
use serde::{Deserialize, Serialize};

pub struct EndpointAggregateInput {
    pub category: EndpointCategory,
    pub behavior: BehaviorHint,
    pub is_historical_source: bool,
    pub method: String,
}

pub struct VulnerabilityAggregateInput {
    pub severity: String,
    pub status: String,
}

pub struct AttackPathInputs {
    pub subdomain_priority: f64,
    pub tags: Vec<String>,
    pub org_name: Option<String>,
    pub has_mx: bool,
    pub has_spf: bool,
    pub has_dmarc: bool,
    pub has_backend_tech_hint: bool,
    pub endpoints: Vec<EndpointAggregateInput>,
    pub vulnerabilities: Vec<VulnerabilityAggregateInput>,
}

const TAG_KEYWORDS: &[(&str, f64)] = &[("admin", 5.0), ("auth", 5.0), ("dev", 4.0), ("backup", 4.0), ("mail", 4.0)];
const CDN_ORGS: &[&str] = &["cloudflare", "akamai", "fastly"];

/// Computes the attack-path composite score from subdomain priority,
/// DNS tag keywords, CDN ownership, MX/SPF/DMARC posture, technology
/// hints, and the aggregated endpoint/vulnerability signal.
pub fn score_attack_path(inputs: &AttackPathInputs) -> f64 {
    let mut score = inputs.subdomain_priority;

    let tag_text = inputs.tags.join(" ").to_ascii_lowercase();
    for (keyword, bonus) in TAG_KEYWORDS {
        if tag_text.contains(keyword) {
            score += bonus;
        }
    }

    if let Some(org) = &inputs.org_name {
        let org_lower = org.to_ascii_lowercase();
        if CDN_ORGS.iter().any(|cdn| org_lower.contains(cdn)) {
            score -= 1.0;
        }
    }

    if inputs.has_mx && inputs.has_spf {
        score += 2.0;
    } else if inputs.has_mx && !inputs.has_dmarc {
        score += 1.0;
    }

    if inputs.has_backend_tech_hint {
        score += 3.0;
    }

    for endpoint in &inputs.endpoints {
        score += match endpoint.category {
            EndpointCategory::Admin | EndpointCategory::Auth => 4.0,
            EndpointCategory::Api => 2.0,
            EndpointCategory::Legacy => 2.0,
            _ => 0.0,
        };
        if endpoint.behavior == BehaviorHint::StateChanging {
            score += 2.0;
        }
        if endpoint.behavior == BehaviorHint::IdBasedAccess {
            score += 1.0;
        }
        if endpoint.is_historical_source {
            score += 2.0;
        }
        if matches!(endpoint.method.to_ascii_uppercase().as_str(), "POST" | "PUT" | "PATCH" | "DELETE") {
            score += 1.0;
        }
    }

    for vuln in &inputs.vulnerabilities {
        score += match vuln.severity.to_ascii_uppercase().as_str() {
            "CRITICAL" => 7.0,
            "HIGH" => 5.0,
            "MEDIUM" => 3.0,
            "LOW" => 1.0,
            _ => 0.0,
        };
        if vuln.status.eq_ignore_ascii_case("CONFIRMED") {
            score += 3.0;
        }
    }

    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    NucleiScan,
    Ffuf,
    ExploitLab,
}

impl SuggestedAction {
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestedAction::NucleiScan => "nuclei_scan",
            SuggestedAction::Ffuf => "ffuf",
            SuggestedAction::ExploitLab => "exploit_lab",
        }
    }
}

fn is_high_value_category(category: EndpointCategory) -> bool {
    matches!(category, EndpointCategory::Admin | EndpointCategory::Auth | EndpointCategory::Api)
}

/// Gates action suggestions on the thresholds in §4.4.5:
/// `nuclei_scan` needs max endpoint risk >= 30 or a high-value
/// category; `ffuf` needs max risk >= 40 or ADMIN/AUTH/API; exploit
/// lab needs a CRITICAL/HIGH severity vulnerability present.
pub fn suggest_actions(max_endpoint_risk: f64, endpoint_categories: &[EndpointCategory], has_exploitable_vulnerability: bool) -> Vec<SuggestedAction> {
    let has_high_value = endpoint_categories.iter().copied().any(is_high_value_category);
    let mut actions = Vec::new();

    if max_endpoint_risk >= 30.0 || has_high_value {
        actions.push(SuggestedAction::NucleiScan);
    }
    if max_endpoint_risk >= 40.0 || has_high_value {
        actions.push(SuggestedAction::Ffuf);
    }
    if has_exploitable_vulnerability {
        actions.push(SuggestedAction::ExploitLab);
    }
    actions
}

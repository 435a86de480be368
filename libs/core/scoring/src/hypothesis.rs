// [libs/core/scoring/src/hypothesis.rs]
//! Category -> attack-type hypothesis generation (§4.4.3 step 5).

use crate::category::EndpointCategory;
use crate::parameter::ParameterSensitivity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisCandidate {
    pub attack_type: &'static str,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub priority: u8,
}

/// Generates hypotheses for an endpoint that has already crossed the
/// mission's `risk_score_threshold`. Capped at 3 per endpoint, in a
/// fixed order of preference: IDOR, AUTH_BYPASS/BRUTE_FORCE, SQLI,
/// then any technology-hint-driven candidate.
pub fn generate_hypotheses(
    category: EndpointCategory,
    has_id_pattern: bool,
    path: &str,
    parameter_sensitivities: &[ParameterSensitivity],
    tech_stack_hint: Option<&str>,
) -> Vec<HypothesisCandidate> {
    let mut hypotheses = Vec::new();

    if has_id_pattern {
        hypotheses.push(HypothesisCandidate {
            attack_type: "IDOR",
            title: "Potential insecure direct object reference".to_string(),
            description: format!("Endpoint uses an id-based access pattern: {path}"),
            confidence: 0.6,
            priority: 3,
        });
    }

    match category {
        EndpointCategory::Admin => hypotheses.push(HypothesisCandidate {
            attack_type: "AUTH_BYPASS",
            title: "Potential authentication bypass".to_string(),
            description: format!("Administrative endpoint detected: {path}"),
            confidence: 0.5,
            priority: 4,
        }),
        EndpointCategory::Auth => hypotheses.push(HypothesisCandidate {
            attack_type: "BRUTE_FORCE",
            title: "Potential brute-force attack surface".to_string(),
            description: format!("Authentication endpoint detected: {path}"),
            confidence: 0.6,
            priority: 5,
        }),
        EndpointCategory::Api => {
            if parameter_sensitivities
                .iter()
                .any(|sensitivity| matches!(sensitivity, ParameterSensitivity::Medium | ParameterSensitivity::High))
            {
                hypotheses.push(HypothesisCandidate {
                    attack_type: "SQLI",
                    title: "Potential SQL injection".to_string(),
                    description: "Sensitive parameter detected on an API endpoint".to_string(),
                    confidence: 0.4,
                    priority: 4,
                });
            }
        }
        _ => {}
    }

    if matches!(tech_stack_hint, Some("PHP") | Some("ASP.NET")) {
        hypotheses.push(HypothesisCandidate {
            attack_type: "CODE_INJECTION",
            title: "Potential code injection".to_string(),
            description: format!("Legacy technology stack detected: {}", tech_stack_hint.unwrap()),
            confidence: 0.3,
            priority: 3,
        });
    }

    hypotheses.truncate(3);
    hypotheses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_changing_id_based_api_endpoint_yields_idor_and_sqli_not_auth_bypass() {
        let hypotheses = generate_hypotheses(EndpointCategory::Api, true, "/api/users/:id/update", &[ParameterSensitivity::Medium], None);
        let types: Vec<&str> = hypotheses.iter().map(|h| h.attack_type).collect();
        assert!(types.contains(&"IDOR"));
        assert!(types.contains(&"SQLI"));
        assert!(!types.contains(&"AUTH_BYPASS"));
    }

    #[test]
    fn admin_category_yields_auth_bypass() {
        let hypotheses = generate_hypotheses(EndpointCategory::Admin, false, "/admin/panel", &[], None);
        assert_eq!(hypotheses[0].attack_type, "AUTH_BYPASS");
    }

    #[test]
    fn hypotheses_are_capped_at_three() {
        let hypotheses = generate_hypotheses(
            EndpointCategory::Admin,
            true,
            "/admin/users/:id",
            &[ParameterSensitivity::High],
            Some("PHP"),
        );
        assert!(hypotheses.len() <= 3);
    }
}

// [libs/core/scoring/src/risk.rs]
//! Likelihood/impact base rates per category and the risk formula
//! (§4.4.3 step 3, §3 invariant 4, §8 property 7).

use crate::behavior::BehaviorHint;
use crate::category::EndpointCategory;

/// Base `(likelihood, impact)` per category. `ADMIN`/`AUTH` are rated
/// highest likelihood since they are the most commonly attacked
/// surfaces; `LEGACY` carries the highest impact since it covers
/// leaked config/VCS paths. Values live in [0,10] per §3 invariant 4.
fn base_rates(category: EndpointCategory) -> (f64, f64) {
    match category {
        EndpointCategory::Admin => (7.0, 8.0),
        EndpointCategory::Auth => (8.0, 7.0),
        EndpointCategory::Legacy => (6.0, 9.0),
        EndpointCategory::Api => (6.0, 6.0),
        EndpointCategory::Public => (4.0, 3.0),
        EndpointCategory::Unknown => (3.0, 3.0),
        EndpointCategory::Healthcheck => (2.0, 1.0),
        EndpointCategory::Static => (1.0, 1.0),
    }
}

/// Applies the behavior modifiers on top of the category base rate:
/// state-changing methods raise likelihood (an attacker can cause
/// effect, not just observe), id-based access raises impact (a
/// successful hit exposes or mutates another principal's data).
pub fn likelihood_and_impact(category: EndpointCategory, behavior: BehaviorHint, has_id_pattern: bool) -> (f64, f64) {
    let (mut likelihood, mut impact) = base_rates(category);
    if behavior == BehaviorHint::StateChanging {
        likelihood = (likelihood + 1.0).min(10.0);
    }
    if has_id_pattern {
        impact = (impact + 1.0).min(10.0);
    }
    (likelihood, impact)
}

/// `risk_score = clamp(likelihood * impact, 0, 100)`.
pub fn risk_score(likelihood: f64, impact: f64) -> f64 {
    (likelihood.clamp(0.0, 10.0) * impact.clamp(0.0, 10.0)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_changing_id_based_api_crosses_default_threshold() {
        let (likelihood, impact) = likelihood_and_impact(EndpointCategory::Api, BehaviorHint::StateChanging, true);
        let risk = risk_score(likelihood, impact);
        assert!(risk >= 40.0, "expected risk >= 40, got {risk}");
    }

    #[test]
    fn static_assets_score_low() {
        let (likelihood, impact) = likelihood_and_impact(EndpointCategory::Static, BehaviorHint::ReadOnly, false);
        assert!(risk_score(likelihood, impact) < 10.0);
    }

    #[test]
    fn risk_score_clamps_above_100() {
        assert_eq!(risk_score(11.0, 11.0), 100.0);
    }
}

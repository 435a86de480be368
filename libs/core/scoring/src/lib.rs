// [libs/core/scoring/src/lib.rs]
//! Deterministic heuristic scoring shared by the recon pipeline's
//! Endpoint Intelligence and Planning phases (§4.4.3, §4.4.5).
//! None of this depends on the reasoner: every rule here is a fixed
//! table or ordered pattern match so the pipeline's correctness does
//! not hinge on LLM output quality.

pub mod attack_path;
pub mod behavior;
pub mod category;
pub mod hypothesis;
pub mod parameter;
pub mod risk;

pub use attack_path::{score_attack_path, suggest_actions, AttackPathInputs, SuggestedAction};
pub use behavior::BehaviorHint;
pub use category::EndpointCategory;
pub use hypothesis::{generate_hypotheses, HypothesisCandidate};
pub use parameter::ParameterSensitivity;
pub use risk::{likelihood_and_impact, risk_score};

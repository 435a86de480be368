// [libs/domain/reflection/src/lib.rs]
//! Reflection Loop: inspects a tool's raw output immediately after it
//! runs, decides whether the result is good enough, and when it is
//! not, can generate and sandbox-execute a small script to try to
//! close the gap (§4.5).

pub mod analyzer;
pub mod merge_back;
pub mod sandbox;
pub mod script_generator;

pub use analyzer::{analyze, AnalyzerResult, EnrichmentOpportunity, Issue, SuggestedAction};
pub use merge_back::{merge_back, MergeCandidate, MergeCandidateKind, MergeOutcome};
pub use sandbox::{execute as execute_sandboxed, SandboxError};
pub use script_generator::{generate_script, GeneratedScript};

use tracing::{instrument, warn};

const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Caps how many times the loop will generate-and-run a script for a
/// single tool invocation before giving up and surfacing the analyzer
/// result as-is.
#[derive(Debug, Clone, Copy)]
pub struct IterationBudget {
    max_iterations: u32,
    spent: u32,
}

impl Default for IterationBudget {
    fn default() -> Self {
        Self { max_iterations: DEFAULT_MAX_ITERATIONS, spent: 0 }
    }
}

impl IterationBudget {
    pub fn new(max_iterations: u32) -> Self {
        Self { max_iterations, spent: 0 }
    }

    pub fn remaining(&self) -> u32 {
        self.max_iterations.saturating_sub(self.spent)
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    pub fn consume_one(&mut self) {
        self.spent = self.spent.saturating_add(1);
    }
}

/// Final shape of one reflection pass over a tool's output: the
/// analyzer's verdict plus whatever remediation scripts ran and what
/// they produced.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReflectionOutcome {
    pub analysis: Option<AnalyzerResult>,
    pub merged: Vec<MergeCandidate>,
    pub unrecognized_shapes: u64,
    pub iterations_used: u32,
}

/// Runs the analyzer for `tool_name`, and for every `generate_script`
/// suggested action it emits, generates and sandbox-executes the
/// matching template, merging back whatever shape the script produced.
/// Stops early once the iteration budget is exhausted.
#[instrument(skip(output, work_root, budget), fields(tool_name))]
pub async fn reflect(
    tool_name: &str,
    output: &serde_json::Value,
    work_root: &std::path::Path,
    budget: &mut IterationBudget,
) -> ReflectionOutcome {
    let analysis = analyze(tool_name, output);
    let mut outcome = ReflectionOutcome {
        analysis: Some(analysis.clone()),
        merged: Vec::new(),
        unrecognized_shapes: 0,
        iterations_used: 0,
    };

    for action in &analysis.suggested_actions {
        if action.action != "generate_script" {
            continue;
        }
        let Some(script_type) = &action.script_type else { continue };
        if !budget.has_remaining() {
            warn!(script_type, "iteration budget exhausted, skipping remediation script");
            break;
        }

        let script = generate_script(script_type, &action.targets);
        budget.consume_one();
        outcome.iterations_used += 1;

        match execute_sandboxed(&script, work_root).await {
            Ok(script_output) => {
                let merge = merge_back(script_type, &script_output);
                outcome.unrecognized_shapes += merge.unrecognized_shapes;
                outcome.merged.extend(merge.candidates);
            }
            Err(error) => {
                warn!(script_type, %error, "reflection script failed");
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn empty_subdomain_enum_triggers_bruteforce_and_merges_hosts() {
        let temp = tempfile::tempdir().unwrap();
        let mut budget = IterationBudget::default();
        let outcome = reflect("subdomain_enum", &json!({"subdomains": []}), temp.path(), &mut budget).await;
        assert_eq!(outcome.iterations_used, 1);
        assert_eq!(budget.remaining(), 2);
    }

    #[tokio::test]
    async fn exhausted_budget_skips_remediation() {
        let temp = tempfile::tempdir().unwrap();
        let mut budget = IterationBudget::new(0);
        let outcome = reflect("subdomain_enum", &json!({"subdomains": []}), temp.path(), &mut budget).await;
        assert_eq!(outcome.iterations_used, 0);
        assert!(outcome.merged.is_empty());
    }

    #[tokio::test]
    async fn clean_output_runs_no_scripts() {
        let temp = tempfile::tempdir().unwrap();
        let mut budget = IterationBudget::default();
        let outcome = reflect("asn_lookup", &json!([]), temp.path(), &mut budget).await;
        assert_eq!(outcome.iterations_used, 0);
        assert_eq!(budget.remaining(), 3);
    }
}

// [libs/domain/reasoner/src/lib.rs]
//! The LLM agent boundary, treated as an opaque function per §9:
//! "the pipeline's correctness does NOT depend on LLM quality". Every
//! deterministic rule (risk scoring, categorization, hypothesis
//! generation) lives in `warden-scoring`; this crate only carries the
//! narrow interface a reasoner implementation plugs into, plus a
//! no-op stub for environments without one configured.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct ReasoningContext {
    pub mission_id: String,
    pub phase: String,
    pub prompt: String,
    pub facts: Value,
}

#[derive(Debug, Clone)]
pub struct ReasoningResult {
    pub summary: String,
    pub structured: Value,
}

#[async_trait]
pub trait Reasoner: Send + Sync {
    async fn reason(&self, context: ReasoningContext) -> ReasoningResult;
}

/// A reasoner that performs no inference, returning the input facts
/// unchanged as enrichment. Wired in when no LLM backend is
/// configured so the pipeline's deterministic path is unaffected.
pub struct NullReasoner;

#[async_trait]
impl Reasoner for NullReasoner {
    #[instrument(skip(self, context))]
    async fn reason(&self, context: ReasoningContext) -> ReasoningResult {
        ReasoningResult {
            summary: format!("no reasoner configured for phase {}", context.phase),
            structured: context.facts,
        }
    }
}

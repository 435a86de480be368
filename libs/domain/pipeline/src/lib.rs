// [libs/domain/pipeline/src/lib.rs]
//! Recon Pipeline Core: the phase sequence that turns a mission's
//! target domain into a scored, evidenced attack graph (§4.4).
//!
//! `run_mission` drives `MissionPhase::SEQUENCE` end to end; each
//! phase is also independently callable (the orchestrator's
//! checkpoint/resume logic in §4.3 restarts from a specific
//! phase rather than always running the whole sequence).

pub mod context;
pub mod errors;
pub mod ingest;
pub mod phases;

pub use context::{CancellationToken, EventSink, NullEventSink, PipelineContext};
pub use errors::PipelineError;

use serde::{Deserialize, Serialize};
use serde_json::json;
use warden_graph_model::EventType;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionRunOutcome {
    pub passive_recon: Option<phases::p1_passive_recon::PhaseOutcome>,
    pub safety_net: Option<phases::safety_net::SafetyCheckResult>,
    pub active_recon: Option<phases::p2_active_recon::PhaseOutcome>,
    pub endpoint_intel: Option<phases::p3_endpoint_intel::PhaseOutcome>,
    pub verification: Option<phases::p4_verification::PhaseOutcome>,
    pub planning: Option<phases::p5_planning::PhaseOutcome>,
    pub reporting: Option<phases::p6_reporting::PhaseOutcome>,
    pub cancelled_before_phase: Option<&'static str>,
}

/// Runs every phase in §4.3's fixed sequence, stopping cleanly
/// (without error) if `ctx.cancellation` is observed between phases.
pub async fn run_mission(ctx: &PipelineContext) -> Result<MissionRunOutcome, PipelineError> {
    let mut outcome = MissionRunOutcome::default();

    macro_rules! checked_phase {
        ($name:literal, $field:ident, $module:path) => {
            if ctx.cancellation.is_cancelled() {
                outcome.cancelled_before_phase = Some($name);
                ctx.emit(EventType::MissionStatus, $name, json!({"cancelled": true}));
                return Ok(outcome);
            }
            outcome.$field = Some($module(ctx).await?);
        };
    }

    checked_phase!("PASSIVE_RECON", passive_recon, phases::p1_passive_recon::run);
    checked_phase!("SAFETY_NET", safety_net, phases::safety_net::run);
    checked_phase!("ACTIVE_RECON", active_recon, phases::p2_active_recon::run);
    checked_phase!("ENDPOINT_INTEL", endpoint_intel, phases::p3_endpoint_intel::run);
    checked_phase!("VERIFICATION", verification, phases::p4_verification::run);
    checked_phase!("PLANNING", planning, phases::p5_planning::run);
    checked_phase!("REPORTING", reporting, phases::p6_reporting::run);

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use warden_graph_model::{Mission, MissionMode, MissionOptions};
    use warden_graph_store::{GraphRepository, GraphStoreClient};
    use warden_reasoner::NullReasoner;
    use warden_tool_client::MockToolProvider;

    #[tokio::test]
    async fn cancelling_before_start_skips_every_phase() {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        let graph = Arc::new(GraphRepository::new(client));
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], MissionOptions::default());
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let ctx = PipelineContext {
            mission,
            graph,
            tools: Arc::new(MockToolProvider::default()),
            reasoner: Arc::new(NullReasoner),
            events: Arc::new(NullEventSink),
            cancellation,
            reflection_work_root: std::env::temp_dir(),
        };

        let outcome = run_mission(&ctx).await.unwrap();
        assert_eq!(outcome.cancelled_before_phase, Some("PASSIVE_RECON"));
        assert!(outcome.passive_recon.is_none());
    }

    #[tokio::test]
    async fn full_sequence_runs_to_reporting_on_empty_target() {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        let graph = Arc::new(GraphRepository::new(client));
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], MissionOptions::default());

        let ctx = PipelineContext {
            mission,
            graph,
            tools: Arc::new(MockToolProvider::default()),
            reasoner: Arc::new(NullReasoner),
            events: Arc::new(NullEventSink),
            cancellation: CancellationToken::new(),
            reflection_work_root: std::env::temp_dir(),
        };

        let outcome = run_mission(&ctx).await.unwrap();
        assert!(outcome.reporting.is_some());
        assert_eq!(outcome.reporting.unwrap().reports_generated, 4);
    }
}

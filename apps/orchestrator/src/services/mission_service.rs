// [apps/orchestrator/src/services/mission_service.rs]
//! Drives a mission's phase sequence (§4.3): wraps each phase in
//! its soft timeout, writes a durable checkpoint before and after it,
//! applies the phase-completion checkpoint policy, and forwards every
//! pipeline event onto the event bus.

use crate::state::AppState;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use warden_graph_model::{EventEnvelope, EventType, Mission, MissionPhase, MissionStatus, NodeType};
use warden_pipeline::{CancellationToken, EventSink, PipelineContext};

/// Bridges the pipeline's synchronous `EventSink` callback onto the
/// orchestrator's async event bus: `emit` just pushes onto an
/// unbounded channel, a background task drains it into
/// `EventBus::publish`.
struct BusEventSink {
    mission_id: String,
    sender: mpsc::UnboundedSender<EventEnvelope>,
}

impl EventSink for BusEventSink {
    fn emit(&self, event_type: EventType, phase: Option<&str>, payload: serde_json::Value) {
        let envelope = EventEnvelope::new(event_type, self.mission_id.clone(), phase.unwrap_or("UNKNOWN"), "warden-pipeline", payload);
        let _ = self.sender.send(envelope);
    }
}

/// A phase's expected graph growth (§4.3, "Checkpoint policy").
/// Failing the check never aborts the mission -- it only emits a
/// `LOG` warning event, since a domain can legitimately have zero
/// live HTTP services or zero findable endpoints.
fn checkpoint_expectation(phase: MissionPhase) -> Option<(NodeType, &'static str)> {
    match phase {
        MissionPhase::PassiveRecon => Some((NodeType::Subdomain, "expected at least one SUBDOMAIN after passive recon")),
        MissionPhase::ActiveRecon => Some((NodeType::HttpService, "expected at least one HTTP_SERVICE after active recon")),
        MissionPhase::Reporting => Some((NodeType::Report, "expected at least one REPORT after reporting")),
        _ => None,
    }
}

/// Spawns the background task that owns a mission's phase sequence
/// end to end, registers its cancellation token in `AppState`, and
/// returns immediately -- callers (the `POST /missions` handler)
/// don't block on mission completion.
pub async fn launch(state: Arc<AppState>, mission: Mission) {
    let mission_id = mission.id.clone();
    let cancellation = CancellationToken::new();

    let (tx, mut rx) = mpsc::unbounded_channel::<EventEnvelope>();
    let bus_for_forwarder = state.event_bus.clone();
    tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            bus_for_forwarder.publish(envelope).await;
        }
    });

    let task_state = state.clone();
    let task_cancellation = cancellation.clone();
    let handle = tokio::spawn(async move {
        run_to_completion(task_state, mission, task_cancellation, tx).await;
    });

    state.register_running(mission_id, cancellation, handle).await;
}

async fn run_to_completion(state: Arc<AppState>, mut mission: Mission, cancellation: CancellationToken, event_tx: mpsc::UnboundedSender<EventEnvelope>) {
    let mission_id = mission.id.clone();

    mission.status = MissionStatus::Running;
    if let Err(error) = state.missions.checkpoint(&mission_id, mission.status, mission.current_phase, &mission.progress).await {
        error!("failed to persist mission {mission_id} start: {error}");
        state.forget_running(&mission_id).await;
        return;
    }

    let sink: Arc<dyn EventSink> = Arc::new(BusEventSink { mission_id: mission_id.clone(), sender: event_tx.clone() });
    let ctx = PipelineContext {
        mission: mission.clone(),
        graph: state.graph.clone(),
        tools: state.tools.clone(),
        reasoner: state.reasoner.clone(),
        events: sink,
        cancellation: cancellation.clone(),
        reflection_work_root: std::env::temp_dir(),
    };

    let mut final_status = MissionStatus::Completed;

    for phase in MissionPhase::SEQUENCE {
        if cancellation.is_cancelled() {
            final_status = MissionStatus::Cancelled;
            break;
        }

        mission.current_phase = Some(*phase);
        if let Err(error) = state.missions.checkpoint(&mission_id, MissionStatus::Running, mission.current_phase, &mission.progress).await {
            warn!("failed to persist phase checkpoint for {mission_id}: {error}");
        }

        let timeout = match phase {
            MissionPhase::ActiveRecon | MissionPhase::Verification => state.config.active_phase_timeout,
            MissionPhase::PassiveRecon => state.config.passive_phase_timeout,
            _ => state.config.default_phase_timeout,
        };

        let phase_result = tokio::time::timeout(timeout, run_phase(*phase, &ctx)).await;
        match phase_result {
            Err(_elapsed) => {
                warn!("mission {mission_id} phase {} exceeded its soft timeout", phase.as_str());
                mission.progress.errors.push(phase_timeout_error(*phase));
                final_status = MissionStatus::Failed;
                break;
            }
            Ok(Err(pipeline_error)) => {
                error!("mission {mission_id} phase {} failed: {pipeline_error}", phase.as_str());
                mission.progress.errors.push(pipeline_error_record(*phase, &pipeline_error));
                final_status = MissionStatus::Failed;
                break;
            }
            Ok(Ok(())) => {}
        }

        if let Some((node_type, warning)) = checkpoint_expectation(*phase) {
            match state.graph.query_nodes(&mission_id, Some(&[node_type]), None, 1, 0).await {
                Ok((nodes, _)) if nodes.is_empty() => {
                    ctx.emit(EventType::Log, phase.as_str(), json!({"level": "WARNING", "message": warning}));
                }
                Err(error) => warn!("checkpoint query failed for {mission_id}: {error}"),
                _ => {}
            }
        }
    }

    mission.status = final_status;
    if let Err(error) = state.missions.checkpoint(&mission_id, mission.status, mission.current_phase, &mission.progress).await {
        error!("failed to persist final status for mission {mission_id}: {error}");
    }
    ctx.emit(EventType::MissionStatus, mission.current_phase.map(|p| p.as_str()).unwrap_or("REPORTING"), json!({"status": status_str(final_status)}));

    state.forget_running(&mission_id).await;
    info!("mission {mission_id} finished with status {}", status_str(final_status));
}

async fn run_phase(phase: MissionPhase, ctx: &PipelineContext) -> Result<(), warden_pipeline::PipelineError> {
    use warden_pipeline::phases::*;
    match phase {
        MissionPhase::PassiveRecon => p1_passive_recon::run(ctx).await.map(|_| ()),
        MissionPhase::SafetyNet => safety_net::run(ctx).await.map(|_| ()),
        MissionPhase::ActiveRecon => p2_active_recon::run(ctx).await.map(|_| ()),
        MissionPhase::EndpointIntel => p3_endpoint_intel::run(ctx).await.map(|_| ()),
        MissionPhase::Verification => p4_verification::run(ctx).await.map(|_| ()),
        MissionPhase::Planning => p5_planning::run(ctx).await.map(|_| ()),
        MissionPhase::Reporting => p6_reporting::run(ctx).await.map(|_| ()),
    }
}

fn status_str(status: MissionStatus) -> &'static str {
    match status {
        MissionStatus::Pending => "pending",
        MissionStatus::Running => "running",
        MissionStatus::Completed => "completed",
        MissionStatus::Failed => "failed",
        MissionStatus::Cancelled => "cancelled",
    }
}

fn phase_timeout_error(phase: MissionPhase) -> warden_graph_model::MissionError {
    warden_graph_model::MissionError {
        code: "E203".to_string(),
        stage: phase.as_str().to_string(),
        message: format!("phase {} exceeded its soft timeout", phase.as_str()),
        retryable: true,
        recoverable: true,
        occurred_at: chrono::Utc::now(),
    }
}

fn pipeline_error_record(phase: MissionPhase, error: &warden_pipeline::PipelineError) -> warden_graph_model::MissionError {
    let code = error.code();
    warden_graph_model::MissionError {
        code: code.code_str().to_string(),
        stage: phase.as_str().to_string(),
        message: error.to_string(),
        retryable: code.retryable(),
        recoverable: code.recoverable(),
        occurred_at: chrono::Utc::now(),
    }
}

/// Marks a mission cancelled: flips its cooperative cancellation
/// token if the mission is currently running, and regardless writes
/// the `cancelled` status immediately so a client polling
/// `GET /missions/{id}` sees the request took effect even before the
/// background task notices the flag between phases.
pub async fn cancel(state: &Arc<AppState>, mission_id: &str) -> Result<(), warden_graph_store::GraphError> {
    if let Some(cancellation) = state.cancellation_for(mission_id).await {
        cancellation.cancel();
    }
    let mut mission = state.missions.get(mission_id).await?;
    if !mission.status.is_terminal() {
        mission.status = MissionStatus::Cancelled;
        state.missions.checkpoint(mission_id, mission.status, mission.current_phase, &mission.progress).await?;
        state.event_bus.publish(EventEnvelope::new(EventType::MissionStatus, mission_id, mission.current_phase.map(|p| p.as_str()).unwrap_or("UNKNOWN"), "warden-orchestrator", json!({"status": "cancelled"}))).await;
    }
    Ok(())
}

// [libs/domain/pipeline/src/context.rs]
//! Shared state threaded through every phase function.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use warden_graph_model::{EventType, Mission};
use warden_graph_store::GraphRepository;
use warden_reasoner::Reasoner;
use warden_tool_client::ToolProvider;

/// Receives phase/tool/log events as the pipeline runs. The
/// orchestrator's implementation wraps these into `EventEnvelope`s and
/// publishes them on the event bus (§4.1); tests can use a
/// recording sink instead.
pub trait EventSink: Send + Sync {
    fn emit(&self, event_type: EventType, phase: Option<&str>, payload: Value);
}

/// Sink that drops every event, for phase unit tests that don't care
/// about the emitted stream.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event_type: EventType, _phase: Option<&str>, _payload: Value) {}
}

/// Cooperative cancellation flag shared between the orchestrator and
/// the running pipeline (§4.3 "Cancellation is cooperative").
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct PipelineContext {
    pub mission: Mission,
    pub graph: Arc<GraphRepository>,
    pub tools: Arc<dyn ToolProvider>,
    pub reasoner: Arc<dyn Reasoner>,
    pub events: Arc<dyn EventSink>,
    pub cancellation: CancellationToken,
    pub reflection_work_root: PathBuf,
}

impl PipelineContext {
    pub fn apex_domain(&self) -> &str {
        &self.mission.target_domain
    }

    pub fn mission_id(&self) -> &str {
        &self.mission.id
    }

    pub fn emit(&self, event_type: EventType, phase: &str, payload: Value) {
        self.events.emit(event_type, Some(phase), payload);
    }
}

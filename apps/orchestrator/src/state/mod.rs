// [apps/orchestrator/src/state/mod.rs]
//! Composition root: every shared dependency a handler needs, wired
//! once at boot and cloned cheaply (everything inside is an `Arc`).

use crate::config::OrchestratorConfig;
use crate::services::event_bus::EventBus;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use warden_graph_store::{GraphRepository, MissionStore};
use warden_pipeline::CancellationToken;
use warden_reasoner::Reasoner;
use warden_tool_client::ToolProvider;

/// Bookkeeping for a mission whose phase sequence is currently
/// executing: the cancellation flag the orchestrator flips on a
/// cancel request, and the task driving the phases so shutdown can
/// wait on it.
pub struct RunningMission {
    pub cancellation: CancellationToken,
    pub handle: JoinHandle<()>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<OrchestratorConfig>,
    pub graph: Arc<GraphRepository>,
    pub missions: Arc<MissionStore>,
    pub tools: Arc<dyn ToolProvider>,
    pub reasoner: Arc<dyn Reasoner>,
    pub event_bus: Arc<EventBus>,
    pub running: Arc<RwLock<HashMap<String, RunningMission>>>,
}

impl AppState {
    /// `event_bus` is built by the caller (not here) because
    /// `graph`'s `GraphEventSink` must already be wired to it before
    /// `GraphRepository` is constructed -- see `bootstrap`.
    pub fn new(config: OrchestratorConfig, graph: GraphRepository, missions: MissionStore, tools: Arc<dyn ToolProvider>, reasoner: Arc<dyn Reasoner>, event_bus: Arc<EventBus>) -> Self {
        Self {
            config: Arc::new(config),
            graph: Arc::new(graph),
            missions: Arc::new(missions),
            tools,
            reasoner,
            event_bus,
            running: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register_running(&self, mission_id: String, cancellation: CancellationToken, handle: JoinHandle<()>) {
        self.running.write().await.insert(mission_id, RunningMission { cancellation, handle });
    }

    pub async fn cancellation_for(&self, mission_id: &str) -> Option<CancellationToken> {
        self.running.read().await.get(mission_id).map(|running| running.cancellation.clone())
    }

    pub async fn forget_running(&self, mission_id: &str) {
        self.running.write().await.remove(mission_id);
    }

    pub async fn running_mission_count(&self) -> usize {
        self.running.read().await.len()
    }
}

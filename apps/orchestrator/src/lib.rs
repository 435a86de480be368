// [apps/orchestrator/src/lib.rs]
//! Mission control surface for the Warden reconnaissance platform:
//! HTTP API, SSE event stream and phase-sequence orchestration
//! (§4.3, §5, §6). Exposed as a library so integration tests can
//! build a router against an in-memory graph store without spawning
//! the binary.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;

pub use config::OrchestratorConfig;
pub use errors::OrchestratorError;
pub use state::AppState;

use services::event_bus::{BusGraphEventSink, EventBus};
use std::sync::Arc;
use warden_graph_model::sink::GraphEventSink;
use warden_graph_store::{GraphRepository, GraphStoreClient, MissionStore};
use warden_reasoner::{NullReasoner, Reasoner};
use warden_tool_client::{HttpToolProvider, ToolProvider};

/// Connects to the graph store and assembles the shared application
/// state. Split out of `main.rs` so tests can call it directly with a
/// `:memory:` URL instead of relying on process environment.
pub async fn bootstrap(config: OrchestratorConfig) -> Result<Arc<AppState>, warden_graph_store::GraphError> {
    let client = GraphStoreClient::connect(&config.database_url, config.database_auth_token.clone()).await?;

    let event_bus = Arc::new(EventBus::new(config.ring_buffer_capacity));
    let graph_sink: Arc<dyn GraphEventSink> = Arc::new(BusGraphEventSink::new(event_bus.clone()));
    let graph = GraphRepository::with_sink(client.clone(), graph_sink);
    let missions = MissionStore::new(client);

    let tools: Arc<dyn ToolProvider> = Arc::new(HttpToolProvider::new(config.tool_sidecar_base_url.clone()));
    let reasoner: Arc<dyn Reasoner> = Arc::new(NullReasoner);

    let state = Arc::new(AppState::new(config, graph, missions, tools, reasoner, event_bus));
    services::reaper::spawn(state.clone());
    Ok(state)
}

// [apps/orchestrator/tests/stream_test.rs]
//! Checks the SSE endpoint's response shape without draining the
//! (intentionally unbounded) event body -- the dedup/replay logic
//! itself is covered by the unit tests in `services::event_bus` and
//! `services::dedup`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use warden_graph_store::{GraphRepository, GraphStoreClient, MissionStore};
use warden_orchestrator::services::event_bus::EventBus;
use warden_orchestrator::{routes, AppState, OrchestratorConfig};
use warden_reasoner::NullReasoner;
use warden_tool_client::MockToolProvider;

async fn test_state() -> Arc<AppState> {
    let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
    let graph = GraphRepository::new(client.clone());
    let missions = MissionStore::new(client);
    let config = OrchestratorConfig {
        database_url: ":memory:".to_string(),
        database_auth_token: None,
        listen_port: 0,
        max_workers: 2,
        risk_score_threshold: 40,
        max_reflection_iterations: 1,
        ring_buffer_capacity: 200,
        dedup_window_size: 5000,
        active_phase_timeout: Duration::from_secs(5),
        passive_phase_timeout: Duration::from_secs(5),
        default_phase_timeout: Duration::from_secs(5),
        tool_sidecar_base_url: "http://localhost:9000".to_string(),
    };
    let event_bus = Arc::new(EventBus::new(config.ring_buffer_capacity));
    Arc::new(AppState::new(config, graph, missions, Arc::new(MockToolProvider::default()), Arc::new(NullReasoner), event_bus))
}

#[tokio::test]
async fn subscribing_to_an_unknown_mission_still_opens_an_event_stream() {
    let state = test_state().await;
    let app = routes::build(state);
    let request = Request::builder().method("GET").uri("/sse/events/ghost-mission").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "text/event-stream");
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let state = test_state().await;
    let app = routes::build(state);
    let request = Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// [apps/orchestrator/tests/mission_lifecycle.rs]
//! Exercises the mission control HTTP surface end to end against an
//! in-memory graph store and a mock tool provider (§8, "a
//! mission created via the API eventually reaches a terminal status").

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
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

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn creating_a_mission_returns_pending_status_and_is_listed() {
    let state = test_state().await;
    let app = routes::build(state.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/missions")
        .header("content-type", "application/json")
        .body(Body::from(json!({"target_domain": "example.test"}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let mission_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["target_domain"], "example.test");

    let list_request = Request::builder().method("GET").uri("/missions").body(Body::empty()).unwrap();
    let list_response = app.oneshot(list_request).await.unwrap();
    let listed = body_json(list_response).await;
    assert!(listed.as_array().unwrap().iter().any(|m| m["id"] == mission_id));
}

#[tokio::test]
async fn empty_target_domain_is_rejected() {
    let state = test_state().await;
    let app = routes::build(state);

    let request = Request::builder()
        .method("POST")
        .uri("/missions")
        .header("content-type", "application/json")
        .body(Body::from(json!({"target_domain": ""}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelling_a_running_mission_marks_it_cancelled() {
    let state = test_state().await;
    let app = routes::build(state.clone());

    let create_request = Request::builder()
        .method("POST")
        .uri("/missions")
        .header("content-type", "application/json")
        .body(Body::from(json!({"target_domain": "cancel.test"}).to_string()))
        .unwrap();
    let created = body_json(app.clone().oneshot(create_request).await.unwrap()).await;
    let mission_id = created["id"].as_str().unwrap().to_string();

    let cancel_request = Request::builder().method("POST").uri(format!("/missions/{mission_id}/cancel")).body(Body::empty()).unwrap();
    let cancel_response = app.clone().oneshot(cancel_request).await.unwrap();
    assert_eq!(cancel_response.status(), StatusCode::OK);

    let get_request = Request::builder().method("GET").uri(format!("/missions/{mission_id}")).body(Body::empty()).unwrap();
    let fetched = body_json(app.oneshot(get_request).await.unwrap()).await;
    assert_eq!(fetched["status"], "cancelled");
}

#[tokio::test]
async fn cancelling_an_unknown_mission_is_not_found() {
    let state = test_state().await;
    let app = routes::build(state);
    let request = Request::builder().method("POST").uri("/missions/does-not-exist/cancel").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn data_clear_requires_explicit_confirmation() {
    let state = test_state().await;
    let app = routes::build(state);
    let request = Request::builder().method("DELETE").uri("/data/clear").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// [apps/orchestrator/tests/graph_endpoints.rs]
//! Exercises the low-level graph read/write endpoints (§6.1)
//! against an in-memory store, independent of mission execution.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use warden_graph_model::sink::GraphEventSink;
use warden_graph_store::{GraphRepository, GraphStoreClient, MissionStore};
use warden_orchestrator::services::event_bus::{BusGraphEventSink, EventBus};
use warden_orchestrator::{routes, AppState, OrchestratorConfig};
use warden_pipeline::ingest;
use warden_reasoner::NullReasoner;
use warden_tool_client::MockToolProvider;

async fn test_state() -> (Arc<AppState>, Arc<EventBus>) {
    let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
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
    let sink: Arc<dyn GraphEventSink> = Arc::new(BusGraphEventSink::new(event_bus.clone()));
    let graph = GraphRepository::with_sink(client.clone(), sink);
    let missions = MissionStore::new(client);
    let state = Arc::new(AppState::new(config, graph, missions, Arc::new(MockToolProvider::default()), Arc::new(NullReasoner), event_bus.clone()));
    (state, event_bus)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn upserting_then_querying_a_node_round_trips_through_http() {
    let (state, event_bus) = test_state().await;
    let mut events = event_bus.subscribe("mission-1").await;
    let app = routes::build(state);
    let node = ingest::subdomain_node("mission-1", "api.example.test", "CT_LOG");

    let upsert_request = Request::builder()
        .method("POST")
        .uri("/nodes")
        .header("content-type", "application/json")
        .body(Body::from(json!({"mission_id": "mission-1", "apex_domain": "example.test", "node": node}).to_string()))
        .unwrap();
    let upsert_response = app.clone().oneshot(upsert_request).await.unwrap();
    assert_eq!(upsert_response.status(), StatusCode::OK);

    let query_request = Request::builder()
        .method("POST")
        .uri("/nodes/query")
        .header("content-type", "application/json")
        .body(Body::from(json!({"mission_id": "mission-1", "node_types": ["Subdomain"]}).to_string()))
        .unwrap();
    let query_response = app.oneshot(query_request).await.unwrap();
    assert_eq!(query_response.status(), StatusCode::OK);
    let parsed = body_json(query_response).await;
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["nodes"][0]["id"], "subdomain:api.example.test");

    let (_, published) = tokio::time::timeout(Duration::from_secs(1), events.recv()).await.unwrap().unwrap();
    assert_eq!(published.event_type, warden_graph_model::EventType::NodeAdded);
    assert_eq!(published.mission_id, "mission-1");
}

#[tokio::test]
async fn patching_an_unknown_node_is_not_found() {
    let (state, _event_bus) = test_state().await;
    let app = routes::build(state);
    let request = Request::builder()
        .method("PATCH")
        .uri("/nodes/does-not-exist")
        .header("content-type", "application/json")
        .body(Body::from(json!({"mission_id": "mission-1", "patch": {}}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_upsert_reports_counts_for_nodes_and_edges() {
    let (state, event_bus) = test_state().await;
    let mut events = event_bus.subscribe("mission-2").await;
    let app = routes::build(state);
    let domain = ingest::domain_node("mission-2", "example.test");
    let subdomain = ingest::subdomain_node("mission-2", "www.example.test", "CT_LOG");

    let request = Request::builder()
        .method("POST")
        .uri("/graph/batchUpsert")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "mission_id": "mission-2",
                "apex_domain": "example.test",
                "nodes": [domain, subdomain],
                "edges": [],
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = body_json(response).await;
    assert_eq!(parsed["nodes_upserted"], 2);
    assert_eq!(parsed["edges_upserted"], 0);

    let (_, published) = tokio::time::timeout(Duration::from_secs(1), events.recv()).await.unwrap().unwrap();
    assert_eq!(published.event_type, warden_graph_model::EventType::NodesBatch);
}

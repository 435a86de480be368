// [apps/orchestrator/src/routes.rs]
//! HTTP surface (§6.1): mission control, graph read/write, and
//! the SSE stream, all mounted under one CORS-enabled router.

use crate::handlers::{graph, missions, stream};
use crate::state::AppState;
use axum::http::{header, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let mission_routes = Router::new()
        .route("/", post(missions::create_mission).get(missions::list_missions))
        .route("/:mission_id", get(missions::get_mission).delete(missions::delete_mission))
        .route("/:mission_id/cancel", post(missions::cancel_mission))
        .route("/:mission_id/stats", get(missions::mission_stats))
        .route("/:mission_id/edges", get(missions::mission_edges))
        .route("/:mission_id/export", get(missions::mission_export));

    let graph_routes = Router::new()
        .route("/nodes", post(graph::upsert_node))
        .route("/nodes/:node_id", patch(graph::patch_node))
        .route("/nodes/query", post(graph::query_nodes))
        .route("/edges", post(graph::upsert_edge))
        .route("/edges/batch", post(graph::batch_edges))
        .route("/graph/batchUpsert", post(graph::batch_upsert));

    let data_routes = Router::new().route("/data/clear", delete(graph::clear_data));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/missions", mission_routes)
        .merge(graph_routes)
        .merge(data_routes)
        .route("/sse/events/:mission_id", get(stream::events))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

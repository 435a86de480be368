// [apps/orchestrator/src/handlers/graph.rs]
//! Graph read/write endpoints (§6.1). These are the low-level
//! primitives the pipeline itself uses through `GraphRepository`;
//! exposing them lets an external caller (a dashboard, a script)
//! enrich a mission's graph directly.

use crate::errors::OrchestratorError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use warden_graph_model::{Edge, Node, NodeType, PropertyBag};

#[derive(Debug, Deserialize)]
pub struct UpsertNodeRequest {
    pub mission_id: String,
    pub apex_domain: String,
    pub node: Node,
}

pub async fn upsert_node(State(state): State<Arc<AppState>>, Json(request): Json<UpsertNodeRequest>) -> Result<Json<Node>, OrchestratorError> {
    Ok(Json(state.graph.upsert_node(request.node, &request.apex_domain).await?))
}

#[derive(Debug, Deserialize)]
pub struct PatchNodeRequest {
    pub mission_id: String,
    pub patch: PropertyBag,
}

pub async fn patch_node(State(state): State<Arc<AppState>>, Path(node_id): Path<String>, Json(request): Json<PatchNodeRequest>) -> Result<Json<Node>, OrchestratorError> {
    let (_before, after) = state.graph.patch_node(&request.mission_id, &node_id, request.patch).await?;
    Ok(Json(after))
}

#[derive(Debug, Deserialize)]
pub struct QueryNodesRequest {
    pub mission_id: String,
    #[serde(default)]
    pub node_types: Option<Vec<NodeType>>,
    #[serde(default)]
    pub risk_score_min: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    100
}

#[derive(Debug, serde::Serialize)]
pub struct QueryNodesResponse {
    pub nodes: Vec<Node>,
    pub total: u64,
}

pub async fn query_nodes(State(state): State<Arc<AppState>>, Json(request): Json<QueryNodesRequest>) -> Result<Json<QueryNodesResponse>, OrchestratorError> {
    let (nodes, total) = state
        .graph
        .query_nodes(&request.mission_id, request.node_types.as_deref(), request.risk_score_min, request.limit, request.offset)
        .await?;
    Ok(Json(QueryNodesResponse { nodes, total }))
}

#[derive(Debug, Deserialize)]
pub struct UpsertEdgeRequest {
    pub edge: Edge,
}

pub async fn upsert_edge(State(state): State<Arc<AppState>>, Json(request): Json<UpsertEdgeRequest>) -> Result<Json<Edge>, OrchestratorError> {
    Ok(Json(state.graph.upsert_edge(request.edge).await?))
}

#[derive(Debug, Deserialize)]
pub struct BatchEdgesRequest {
    pub edges: Vec<Edge>,
}

pub async fn batch_edges(State(state): State<Arc<AppState>>, Json(request): Json<BatchEdgesRequest>) -> Result<Json<serde_json::Value>, OrchestratorError> {
    let mut upserted = Vec::with_capacity(request.edges.len());
    for edge in request.edges {
        upserted.push(state.graph.upsert_edge(edge).await?);
    }
    Ok(Json(serde_json::json!({"edges_upserted": upserted.len()})))
}

#[derive(Debug, Deserialize)]
pub struct BatchUpsertRequest {
    pub mission_id: String,
    pub apex_domain: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

pub async fn batch_upsert(State(state): State<Arc<AppState>>, Json(request): Json<BatchUpsertRequest>) -> Result<Json<serde_json::Value>, OrchestratorError> {
    let counts = state.graph.batch_upsert(&request.mission_id, request.nodes, request.edges, &request.apex_domain).await?;
    Ok(Json(serde_json::json!({"nodes_upserted": counts.nodes_upserted, "edges_upserted": counts.edges_upserted})))
}

#[derive(Debug, Deserialize)]
pub struct ClearDataQuery {
    #[serde(default)]
    pub confirm: String,
}

/// Wipes every mission's graph data. Requires `?confirm=YES` so this
/// can never be triggered by an accidental bare `DELETE` (§6.1).
pub async fn clear_data(State(state): State<Arc<AppState>>, Query(query): Query<ClearDataQuery>) -> Result<Json<serde_json::Value>, OrchestratorError> {
    if query.confirm != "YES" {
        return Err(OrchestratorError::BadRequest("must pass ?confirm=YES to clear all data".to_string()));
    }
    let missions = state.missions.list().await?;
    let mut cleared = 0;
    for mission in missions {
        state.graph.delete_mission(&mission.id).await?;
        state.event_bus.forget(&mission.id).await;
        cleared += 1;
    }
    Ok(Json(serde_json::json!({"missions_cleared": cleared})))
}

// [apps/orchestrator/src/handlers/missions.rs]
//! Mission control endpoints (§6.1).

use crate::errors::OrchestratorError;
use crate::services::mission_service;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use warden_graph_model::{Mission, MissionMode, MissionOptions};

#[derive(Debug, Deserialize)]
pub struct CreateMissionRequest {
    pub target_domain: String,
    #[serde(default)]
    pub mode: Option<MissionMode>,
    #[serde(default)]
    pub seed_subdomains: Vec<String>,
    #[serde(default)]
    pub options: Option<MissionOptions>,
}

pub async fn create_mission(State(state): State<Arc<AppState>>, Json(request): Json<CreateMissionRequest>) -> Result<Json<Mission>, OrchestratorError> {
    if request.target_domain.trim().is_empty() {
        return Err(OrchestratorError::BadRequest("target_domain must not be empty".to_string()));
    }

    let options = request.options.unwrap_or(MissionOptions {
        max_workers: state.config.max_workers,
        risk_score_threshold: state.config.risk_score_threshold,
        max_reflection_iterations: state.config.max_reflection_iterations,
        ..MissionOptions::default()
    });

    let mission = Mission::new(request.target_domain, request.mode.unwrap_or(MissionMode::Balanced), request.seed_subdomains, options);
    state.missions.create(&mission).await?;

    mission_service::launch(state.clone(), mission.clone()).await;
    Ok(Json(mission))
}

pub async fn list_missions(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Mission>>, OrchestratorError> {
    Ok(Json(state.missions.list().await?))
}

pub async fn get_mission(State(state): State<Arc<AppState>>, Path(mission_id): Path<String>) -> Result<Json<Mission>, OrchestratorError> {
    state.missions.get(&mission_id).await.map(Json).map_err(|error| match error {
        warden_graph_store::GraphError::MissionNotFound(id) => OrchestratorError::MissionNotFound(id),
        other => other.into(),
    })
}

pub async fn cancel_mission(State(state): State<Arc<AppState>>, Path(mission_id): Path<String>) -> Result<Json<serde_json::Value>, OrchestratorError> {
    let mission = state.missions.get(&mission_id).await?;
    if mission.status.is_terminal() {
        return Err(OrchestratorError::MissionAlreadyTerminal(mission_id));
    }
    mission_service::cancel(&state, &mission_id).await?;
    Ok(Json(serde_json::json!({"cancelled": true})))
}

pub async fn delete_mission(State(state): State<Arc<AppState>>, Path(mission_id): Path<String>) -> Result<Json<serde_json::Value>, OrchestratorError> {
    let counts = state.graph.delete_mission(&mission_id).await?;
    state.event_bus.forget(&mission_id).await;
    Ok(Json(serde_json::json!({"nodes_deleted": counts.nodes_deleted, "edges_deleted": counts.edges_deleted})))
}

pub async fn mission_stats(State(state): State<Arc<AppState>>, Path(mission_id): Path<String>) -> Result<Json<serde_json::Value>, OrchestratorError> {
    let stats = state.graph.stats(&mission_id).await?;
    Ok(Json(serde_json::json!({
        "total_nodes": stats.total_nodes,
        "total_edges": stats.total_edges,
        "nodes_by_type": stats.nodes_by_type,
    })))
}

pub async fn mission_edges(State(state): State<Arc<AppState>>, Path(mission_id): Path<String>) -> Result<Json<Vec<warden_graph_model::Edge>>, OrchestratorError> {
    Ok(Json(state.graph.get_edges(&mission_id).await?))
}

pub async fn mission_export(State(state): State<Arc<AppState>>, Path(mission_id): Path<String>) -> Result<Json<serde_json::Value>, OrchestratorError> {
    let mission = state.missions.get(&mission_id).await?;
    let snapshot = state.graph.export_snapshot(&mission_id, &mission.target_domain).await?;
    Ok(Json(serde_json::json!({"nodes": snapshot.nodes, "edges": snapshot.edges})))
}

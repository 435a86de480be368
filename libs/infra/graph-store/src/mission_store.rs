// [libs/infra/graph-store/src/mission_store.rs]
//! Mission record persistence (§3 "Mission", §6.4 "missions table").
//!
//! Kept separate from `repository.rs` because missions are a single
//! row per id rather than part of the node/edge graph, but they live
//! in the same database and go through the same connection pool.

use crate::client::GraphStoreClient;
use crate::errors::GraphError;
use chrono::{DateTime, Utc};
use libsql::{params, Row};
use warden_graph_model::{Mission, MissionPhase, MissionProgress, MissionStatus};

pub struct MissionStore {
    client: GraphStoreClient,
}

impl MissionStore {
    pub fn new(client: GraphStoreClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, mission: &Mission) -> Result<(), GraphError> {
        let connection = self.client.connection()?;
        connection
            .execute(
                "INSERT INTO missions (id, target_domain, mode, status, current_phase, seed_subdomains, options, progress, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    mission.id.clone(),
                    mission.target_domain.clone(),
                    mode_str(mission.mode),
                    status_str(mission.status),
                    mission.current_phase.map(|p| p.as_str().to_string()),
                    serde_json::to_string(&mission.seed_subdomains).map_err(|e| GraphError::Mapping(e.to_string()))?,
                    serde_json::to_string(&mission.options).map_err(|e| GraphError::Mapping(e.to_string()))?,
                    serde_json::to_string(&mission.progress).map_err(|e| GraphError::Mapping(e.to_string()))?,
                    mission.created_at.to_rfc3339(),
                    mission.updated_at.to_rfc3339(),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn get(&self, mission_id: &str) -> Result<Mission, GraphError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, target_domain, mode, status, current_phase, seed_subdomains, options, progress, created_at, updated_at FROM missions WHERE id = ?1",
                params![mission_id.to_string()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => row_to_mission(&row),
            None => Err(GraphError::MissionNotFound(mission_id.to_string())),
        }
    }

    pub async fn list(&self) -> Result<Vec<Mission>, GraphError> {
        let connection = self.client.connection()?;
        let mut rows = connection
            .query(
                "SELECT id, target_domain, mode, status, current_phase, seed_subdomains, options, progress, created_at, updated_at FROM missions ORDER BY created_at DESC",
                (),
            )
            .await?;
        let mut missions = Vec::new();
        while let Some(row) = rows.next().await? {
            missions.push(row_to_mission(&row)?);
        }
        Ok(missions)
    }

    /// Durable phase-boundary write (SPEC_FULL §11, "outbox-style
    /// durability"): status, current phase and progress are written
    /// together so a crash between phases never leaves the persisted
    /// row pointing at a phase the in-memory mission already left.
    pub async fn checkpoint(&self, mission_id: &str, status: MissionStatus, current_phase: Option<MissionPhase>, progress: &MissionProgress) -> Result<(), GraphError> {
        let connection = self.client.connection()?;
        let updated = connection
            .execute(
                "UPDATE missions SET status = ?1, current_phase = ?2, progress = ?3, updated_at = ?4 WHERE id = ?5",
                params![
                    status_str(status),
                    current_phase.map(|p| p.as_str().to_string()),
                    serde_json::to_string(progress).map_err(|e| GraphError::Mapping(e.to_string()))?,
                    Utc::now().to_rfc3339(),
                    mission_id.to_string(),
                ],
            )
            .await?;
        if updated == 0 {
            return Err(GraphError::MissionNotFound(mission_id.to_string()));
        }
        Ok(())
    }

    pub async fn delete(&self, mission_id: &str) -> Result<(), GraphError> {
        let connection = self.client.connection()?;
        let deleted = connection.execute("DELETE FROM missions WHERE id = ?1", params![mission_id.to_string()]).await?;
        if deleted == 0 {
            return Err(GraphError::MissionNotFound(mission_id.to_string()));
        }
        Ok(())
    }
}

fn mode_str(mode: warden_graph_model::MissionMode) -> &'static str {
    use warden_graph_model::MissionMode::*;
    match mode {
        Stealth => "stealth",
        Balanced => "balanced",
        Aggressive => "aggressive",
    }
}

fn status_str(status: MissionStatus) -> &'static str {
    use MissionStatus::*;
    match status {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

fn parse_mode(value: &str) -> Result<warden_graph_model::MissionMode, GraphError> {
    use warden_graph_model::MissionMode::*;
    match value {
        "stealth" => Ok(Stealth),
        "balanced" => Ok(Balanced),
        "aggressive" => Ok(Aggressive),
        other => Err(GraphError::Mapping(format!("unknown mission mode {other}"))),
    }
}

fn parse_status(value: &str) -> Result<MissionStatus, GraphError> {
    use MissionStatus::*;
    match value {
        "pending" => Ok(Pending),
        "running" => Ok(Running),
        "completed" => Ok(Completed),
        "failed" => Ok(Failed),
        "cancelled" => Ok(Cancelled),
        other => Err(GraphError::Mapping(format!("unknown mission status {other}"))),
    }
}

fn parse_phase(value: &str) -> Result<MissionPhase, GraphError> {
    MissionPhase::SEQUENCE
        .iter()
        .copied()
        .find(|p| p.as_str() == value)
        .ok_or_else(|| GraphError::Mapping(format!("unknown mission phase {value}")))
}

fn row_to_mission(row: &Row) -> Result<Mission, GraphError> {
    let id: String = row.get(0).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let target_domain: String = row.get(1).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let mode_raw: String = row.get(2).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let status_raw: String = row.get(3).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let current_phase_raw: Option<String> = row.get(4).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let seed_subdomains_raw: String = row.get(5).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let options_raw: String = row.get(6).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let progress_raw: String = row.get(7).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let created_at_raw: String = row.get(8).map_err(|e| GraphError::Mapping(e.to_string()))?;
    let updated_at_raw: String = row.get(9).map_err(|e| GraphError::Mapping(e.to_string()))?;

    Ok(Mission {
        id,
        target_domain,
        mode: parse_mode(&mode_raw)?,
        status: parse_status(&status_raw)?,
        current_phase: current_phase_raw.map(|p| parse_phase(&p)).transpose()?,
        seed_subdomains: serde_json::from_str(&seed_subdomains_raw).map_err(|e| GraphError::Mapping(e.to_string()))?,
        options: serde_json::from_str(&options_raw).map_err(|e| GraphError::Mapping(e.to_string()))?,
        progress: serde_json::from_str(&progress_raw).map_err(|e| GraphError::Mapping(e.to_string()))?,
        created_at: parse_timestamp(&created_at_raw)?,
        updated_at: parse_timestamp(&updated_at_raw)?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, GraphError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)).map_err(|e| GraphError::Mapping(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_graph_model::{MissionMode, MissionOptions};

    async fn memory_store() -> MissionStore {
        let client = GraphStoreClient::connect(":memory:", None).await.unwrap();
        MissionStore::new(client)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = memory_store().await;
        let mission = Mission::new("example.test", MissionMode::Balanced, vec!["api".to_string()], MissionOptions::default());
        store.create(&mission).await.unwrap();

        let loaded = store.get(&mission.id).await.unwrap();
        assert_eq!(loaded.target_domain, "example.test");
        assert_eq!(loaded.status, MissionStatus::Pending);
        assert_eq!(loaded.seed_subdomains, vec!["api".to_string()]);
    }

    #[tokio::test]
    async fn checkpoint_updates_status_and_phase() {
        let store = memory_store().await;
        let mission = Mission::new("example.test", MissionMode::Balanced, vec![], MissionOptions::default());
        store.create(&mission).await.unwrap();

        store.checkpoint(&mission.id, MissionStatus::Running, Some(MissionPhase::ActiveRecon), &mission.progress).await.unwrap();

        let loaded = store.get(&mission.id).await.unwrap();
        assert_eq!(loaded.status, MissionStatus::Running);
        assert_eq!(loaded.current_phase, Some(MissionPhase::ActiveRecon));
    }

    #[tokio::test]
    async fn get_unknown_mission_is_not_found() {
        let store = memory_store().await;
        let result = store.get("missing").await;
        assert!(matches!(result, Err(GraphError::MissionNotFound(_))));
    }

    #[tokio::test]
    async fn list_orders_by_creation_time_descending() {
        let store = memory_store().await;
        let first = Mission::new("a.example.test", MissionMode::Balanced, vec![], MissionOptions::default());
        store.create(&first).await.unwrap();
        let second = Mission::new("b.example.test", MissionMode::Balanced, vec![], MissionOptions::default());
        store.create(&second).await.unwrap();

        let missions = store.list().await.unwrap();
        assert_eq!(missions.len(), 2);
    }
}

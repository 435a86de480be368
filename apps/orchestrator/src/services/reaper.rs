// [apps/orchestrator/src/services/reaper.rs]
//! Background maintenance daemon (SPEC_FULL §11, "ReaperService"):
//! once a mission reaches a terminal state and has no running task
//! left in `AppState`, its event bus channel is dropped so a
//! long-lived orchestrator doesn't accumulate one ring buffer per
//! mission forever.

use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;
use warden_graph_model::MissionStatus;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub fn spawn(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sweep(&state).await;
        }
    });
}

async fn sweep(state: &Arc<AppState>) {
    let missions = match state.missions.list().await {
        Ok(missions) => missions,
        Err(error) => {
            tracing::warn!("reaper: failed to list missions: {error}");
            return;
        }
    };

    let mut reaped = 0;
    for mission in missions.into_iter().filter(|m| m.status.is_terminal()) {
        if state.cancellation_for(&mission.id).await.is_some() {
            continue;
        }
        state.event_bus.forget(&mission.id).await;
        reaped += 1;
    }

    if reaped > 0 {
        info!("reaper: released {reaped} terminal mission channel(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrchestratorConfig;
    use std::time::Duration as StdDuration;
    use warden_graph_store::{GraphRepository, GraphStoreClient, MissionStore};
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
            max_workers: 1,
            risk_score_threshold: 40,
            max_reflection_iterations: 3,
            ring_buffer_capacity: 100,
            dedup_window_size: 100,
            active_phase_timeout: StdDuration::from_secs(1),
            passive_phase_timeout: StdDuration::from_secs(1),
            default_phase_timeout: StdDuration::from_secs(1),
            tool_sidecar_base_url: "http://localhost:9000".to_string(),
        };
        let event_bus = Arc::new(crate::services::event_bus::EventBus::new(100));
        Arc::new(AppState::new(config, graph, missions, Arc::new(MockToolProvider::default()), Arc::new(NullReasoner), event_bus))
    }

    #[tokio::test]
    async fn sweep_forgets_terminal_missions_not_currently_running() {
        let state = test_state().await;
        let mission = warden_graph_model::Mission::new("example.test", warden_graph_model::MissionMode::Balanced, vec![], warden_graph_model::MissionOptions::default());
        state.missions.create(&mission).await.unwrap();
        state
            .missions
            .checkpoint(&mission.id, MissionStatus::Completed, None, &mission.progress)
            .await
            .unwrap();
        state.event_bus.publish(warden_graph_model::EventEnvelope::new(warden_graph_model::EventType::MissionStatus, &mission.id, "REPORTING", "test", serde_json::json!({}))).await;

        sweep(&state).await;
        assert_eq!(state.event_bus.mission_count().await, 0);
    }
}

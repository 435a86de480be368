// [apps/orchestrator/src/handlers/stream.rs]
//! `GET /sse/events/{mission_id}` -- the live event stream (§4.1,
//! §6.2). A reconnecting client sends `Last-Event-ID` (header
//! or `lastEventId` query param); without one it gets a `SNAPSHOT`
//! of the mission's current graph state before joining the live feed.

use crate::services::dedup::DedupWindow;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use warden_graph_model::{EventEnvelope, EventType};

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(rename = "lastEventId", default)]
    pub last_event_id: Option<u64>,
}

fn last_event_seq(headers: &HeaderMap, query: &StreamQuery) -> Option<u64> {
    headers
        .get("Last-Event-ID")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .or(query.last_event_id)
}

async fn snapshot_envelope(state: &Arc<AppState>, mission_id: &str) -> Option<EventEnvelope> {
    let mission = state.missions.get(mission_id).await.ok()?;
    let snapshot = state.graph.export_snapshot(mission_id, &mission.target_domain).await.ok()?;
    let payload = serde_json::json!({
        "node_count": snapshot.nodes.len(),
        "edge_count": snapshot.edges.len(),
        "mission_status": mission.status,
    });
    Some(EventEnvelope::new(EventType::Snapshot, mission_id, mission.current_phase.map(|p| p.as_str()).unwrap_or("UNKNOWN"), "warden-orchestrator", payload))
}

pub async fn events(
    State(state): State<Arc<AppState>>,
    Path(mission_id): Path<String>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let since = last_event_seq(&headers, &query);

    let mut backlog: Vec<(u64, EventEnvelope)> = match since {
        Some(seq) => state.event_bus.replay_since(&mission_id, seq).await,
        None => Vec::new(),
    };

    let mut lead_in = Vec::new();
    if since.is_none() {
        if let Some(envelope) = snapshot_envelope(&state, &mission_id).await {
            lead_in.push((0u64, envelope));
        }
    }
    lead_in.append(&mut backlog);

    let receiver = state.event_bus.subscribe(&mission_id).await;
    let dedup_capacity = state.config.dedup_window_size.max(5000);

    let backlog_stream = stream::iter(lead_in.into_iter().map(Ok::<_, Infallible>));
    let live_stream = stream::unfold((receiver, DedupWindow::new(dedup_capacity)), |(mut receiver, mut dedup)| async move {
        loop {
            match receiver.recv().await {
                Ok((seq, envelope)) => {
                    if dedup.insert(envelope.event_id) {
                        return Some((Ok((seq, envelope)), (receiver, dedup)));
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    let combined = backlog_stream.chain(live_stream).map(|item: Result<(u64, EventEnvelope), Infallible>| {
        item.map(|(seq, envelope)| {
            let data = serde_json::to_string(&envelope).unwrap_or_else(|_| "{}".to_string());
            Event::default().id(seq.to_string()).event(envelope.event_type.as_str()).data(data)
        })
    });

    Sse::new(combined).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keepalive"))
}

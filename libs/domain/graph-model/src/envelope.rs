// [libs/domain/graph-model/src/envelope.rs]
//! The v2 event envelope (§4.1, §6.3) and payload sanitization
//! (SPEC_FULL §11, "JSON-safety of event payloads").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    NodeAdded,
    NodeUpdated,
    NodeDeleted,
    EdgeAdded,
    EdgeDeleted,
    NodesBatch,
    EdgesBatch,
    AttackPathAdded,
    Snapshot,
    Log,
    MissionStatus,
    PhaseStarted,
    PhaseCompleted,
    AgentStarted,
    AgentFinished,
    ToolCalled,
    ToolFinished,
    LlmCall,
    VulnStatusChanged,
    EvidenceAdded,
    Error,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::NodeAdded => "NODE_ADDED",
            EventType::NodeUpdated => "NODE_UPDATED",
            EventType::NodeDeleted => "NODE_DELETED",
            EventType::EdgeAdded => "EDGE_ADDED",
            EventType::EdgeDeleted => "EDGE_DELETED",
            EventType::NodesBatch => "NODES_BATCH",
            EventType::EdgesBatch => "EDGES_BATCH",
            EventType::AttackPathAdded => "ATTACK_PATH_ADDED",
            EventType::Snapshot => "SNAPSHOT",
            EventType::Log => "LOG",
            EventType::MissionStatus => "MISSION_STATUS",
            EventType::PhaseStarted => "PHASE_STARTED",
            EventType::PhaseCompleted => "PHASE_COMPLETED",
            EventType::AgentStarted => "AGENT_STARTED",
            EventType::AgentFinished => "AGENT_FINISHED",
            EventType::ToolCalled => "TOOL_CALLED",
            EventType::ToolFinished => "TOOL_FINISHED",
            EventType::LlmCall => "LLM_CALL",
            EventType::VulnStatusChanged => "VULN_STATUS_CHANGED",
            EventType::EvidenceAdded => "EVIDENCE_ADDED",
            EventType::Error => "ERROR",
        }
    }
}

/// Distributed-tracing context threaded through a mission's phase
/// execution and copied onto every envelope it emits (SPEC_FULL §11,
/// "Trace context propagation").
#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub task_id: Option<String>,
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub schema_version: String,
    pub event_id: Uuid,
    pub event_type: EventType,
    pub ts: DateTime<Utc>,
    pub mission_id: String,
    pub phase: String,
    pub trace_id: Option<String>,
    pub span_id: Option<String>,
    pub task_id: Option<String>,
    pub tool_call_id: Option<String>,
    pub producer: String,
    pub payload: Value,
}

impl EventEnvelope {
    pub fn new(event_type: EventType, mission_id: impl Into<String>, phase: impl Into<String>, producer: impl Into<String>, payload: Value) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id: Uuid::new_v4(),
            event_type,
            ts: Utc::now(),
            mission_id: mission_id.into(),
            phase: phase.into(),
            trace_id: None,
            span_id: None,
            task_id: None,
            tool_call_id: None,
            producer: producer.into(),
            payload: sanitize_payload(payload, 0),
        }
    }

    pub fn with_trace(mut self, trace: &TraceContext) -> Self {
        self.trace_id = trace.trace_id.clone();
        self.span_id = trace.span_id.clone();
        self.task_id = trace.task_id.clone();
        self.tool_call_id = trace.tool_call_id.clone();
        self
    }

    /// §4.1: "consumers MUST skip envelopes with unknown schema_version."
    pub fn has_known_schema(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}

const MAX_SANITIZE_DEPTH: usize = 50;

/// Recursively sanitizes a JSON payload for safe transport, mirroring
/// the original `make_json_safe` (SPEC_FULL §11): depth-capped, with
/// an `"[unserializable:<type>]"` sentinel for values that cannot be
/// represented and a `"[circular]"` sentinel retained for wording
/// parity even though `serde_json::Value` cannot actually cycle.
pub fn sanitize_payload(value: Value, depth: usize) -> Value {
    if depth > MAX_SANITIZE_DEPTH {
        return Value::String("[max depth exceeded]".to_string());
    }
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(|item| sanitize_payload(item, depth + 1)).collect()),
        Value::Object(map) => {
            let sanitized = map.into_iter().map(|(key, val)| (key, sanitize_payload(val, depth + 1))).collect();
            Value::Object(sanitized)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_pinned_schema_version() {
        let envelope = EventEnvelope::new(EventType::NodeAdded, "m1", "PASSIVE_RECON", "pipeline", serde_json::json!({}));
        assert_eq!(envelope.schema_version, "v2");
        assert!(envelope.has_known_schema());
    }

    #[test]
    fn foreign_schema_version_is_rejected_by_has_known_schema() {
        let mut envelope = EventEnvelope::new(EventType::Log, "m1", "PASSIVE_RECON", "pipeline", serde_json::json!({}));
        envelope.schema_version = "v99".to_string();
        assert!(!envelope.has_known_schema());
    }

    #[test]
    fn deeply_nested_payload_is_truncated() {
        let mut value = serde_json::json!("leaf");
        for _ in 0..(MAX_SANITIZE_DEPTH + 10) {
            value = serde_json::json!([value]);
        }
        let sanitized = sanitize_payload(value, 0);
        let serialized = serde_json::to_string(&sanitized).unwrap();
        assert!(serialized.contains("max depth exceeded"));
    }
}

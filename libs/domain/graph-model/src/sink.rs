// [libs/domain/graph-model/src/sink.rs]
//! Graph mutation event sink (§4.1, §4.2).
//!
//! The graph store isn't scoped to a single mission the way a pipeline
//! phase is, so this sink takes `mission_id` explicitly on every call
//! rather than assuming one ambient mission the way
//! `warden-pipeline::EventSink` does.

use crate::envelope::EventType;
use serde_json::Value;

pub trait GraphEventSink: Send + Sync {
    fn emit(&self, event_type: EventType, mission_id: &str, payload: Value);
}

/// Sink that drops every event, the default for repositories built
/// without a bus handle (unit tests, one-off scripts).
pub struct NullGraphEventSink;

impl GraphEventSink for NullGraphEventSink {
    fn emit(&self, _event_type: EventType, _mission_id: &str, _payload: Value) {}
}

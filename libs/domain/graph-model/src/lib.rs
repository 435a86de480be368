// [libs/domain/graph-model/src/lib.rs]
//! Typed property graph domain model shared by every Warden component.
//!
//! This crate owns the closed enums, entity shapes and write-boundary
//! validation described in §3 ("DATA MODEL"). It has no I/O: the
//! graph store (`warden-graph-store`) persists these types, the
//! pipeline (`warden-pipeline`) produces them, and the orchestrator
//! serializes them over HTTP/SSE. Keeping validation here means every
//! caller gets the same scope/enum/score enforcement regardless of
//! which edge of the system they sit on.

pub mod edge;
pub mod envelope;
pub mod error;
pub mod evidence;
pub mod mission;
pub mod node;
pub mod scope;
pub mod sink;

pub use edge::{Edge, EdgeRelation};
pub use envelope::{EventEnvelope, EventType};
pub use error::{ErrorCode, ErrorFamily};
pub use evidence::Evidence;
pub use mission::{Mission, MissionError, MissionMode, MissionOptions, MissionPhase, MissionProgress, MissionStatus};
pub use node::{Node, NodeType, PropertyBag};
pub use sink::{GraphEventSink, NullGraphEventSink};

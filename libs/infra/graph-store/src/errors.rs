// [libs/infra/graph-store/src/errors.rs]
//! Error catalog for the Graph Store, mapped onto
//! `warden_graph_model::ErrorCode` so the orchestrator can decide
//! retry/recovery policy without matching on store internals.

use thiserror::Error;
use warden_graph_model::ErrorCode;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query rejected: {0}")]
    Query(#[from] libsql::Error),

    #[error("row mapping failed: {0}")]
    Mapping(String),

    #[error("unknown node type: {0}")]
    UnknownType(String),

    #[error("unknown edge relation: {0}")]
    UnknownRelation(String),

    #[error("node id {0} is out of mission scope")]
    OutOfScope(String),

    #[error("invalid property on node {node_id}: {reason}")]
    BadProperty { node_id: String, reason: String },

    #[error("edge endpoint missing: {0}")]
    MissingEndpoint(String),

    #[error("node {0} not found")]
    NotFound(String),

    #[error("mission {0} not found")]
    MissionNotFound(String),

    #[error("batch transaction failed: {0}")]
    Transaction(String),
}

impl GraphError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GraphError::Connection(_) => ErrorCode::E301Unavailable,
            GraphError::Query(_) | GraphError::Transaction(_) => ErrorCode::E501Generic,
            GraphError::Mapping(_) => ErrorCode::E504Serialization,
            GraphError::UnknownType(_) | GraphError::UnknownRelation(_) => ErrorCode::E402ValidationFailure,
            GraphError::OutOfScope(_) => ErrorCode::E402ValidationFailure,
            GraphError::BadProperty { .. } => ErrorCode::E402ValidationFailure,
            GraphError::MissingEndpoint(_) => ErrorCode::E402ValidationFailure,
            GraphError::NotFound(_) | GraphError::MissionNotFound(_) => ErrorCode::E403NotFound,
        }
    }
}

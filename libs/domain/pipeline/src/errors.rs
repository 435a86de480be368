// [libs/domain/pipeline/src/errors.rs]
//! Phase-level failure taxonomy (§4.3 "Failure taxonomy", §7).

use thiserror::Error;
use warden_graph_model::ErrorCode;
use warden_graph_store::GraphError;
use warden_tool_client::ToolError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("tool invocation failed: {0}")]
    Tool(#[from] ToolError),

    #[error("graph store failure: {0}")]
    Graph(#[from] GraphError),

    #[error("phase {stage} exceeded its soft timeout")]
    PhaseTimedOut { stage: &'static str },
}

impl PipelineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::Tool(error) => error.code(),
            PipelineError::Graph(error) => error.code(),
            PipelineError::PhaseTimedOut { .. } => ErrorCode::E203Timeout,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().retryable()
    }

    pub fn is_recoverable(&self) -> bool {
        self.code().recoverable()
    }
}

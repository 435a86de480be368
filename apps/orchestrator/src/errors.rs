// [apps/orchestrator/src/errors.rs]
//! HTTP-facing error taxonomy (§7). Wraps every component error
//! this crate touches and renders it as the `{error_code, message,
//! stage}` JSON body consumers key their retry logic on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use warden_graph_model::ErrorCode;
use warden_graph_store::GraphError;
use warden_pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("graph store failure: {0}")]
    Graph(#[from] GraphError),

    #[error("pipeline failure: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("mission {0} not found")]
    MissionNotFound(String),

    #[error("mission {0} is already in a terminal state")]
    MissionAlreadyTerminal(String),

    #[error("request rejected: {0}")]
    BadRequest(String),
}

impl OrchestratorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrchestratorError::Graph(error) => error.code(),
            OrchestratorError::Pipeline(error) => error.code(),
            OrchestratorError::MissionNotFound(_) => ErrorCode::E403NotFound,
            OrchestratorError::MissionAlreadyTerminal(_) => ErrorCode::E402ValidationFailure,
            OrchestratorError::BadRequest(_) => ErrorCode::E402ValidationFailure,
        }
    }

    fn status(&self) -> StatusCode {
        match self.code().family() {
            warden_graph_model::ErrorFamily::Data if matches!(self.code(), ErrorCode::E403NotFound) => StatusCode::NOT_FOUND,
            warden_graph_model::ErrorFamily::Data => StatusCode::BAD_REQUEST,
            warden_graph_model::ErrorFamily::Network | warden_graph_model::ErrorFamily::Service => StatusCode::SERVICE_UNAVAILABLE,
            warden_graph_model::ErrorFamily::Tool => StatusCode::BAD_GATEWAY,
            warden_graph_model::ErrorFamily::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OrchestratorError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error_code": self.code().code_str(),
            "message": self.to_string(),
            "retryable": self.code().retryable(),
        }));
        (status, body).into_response()
    }
}

// [libs/infra/tool-client/src/errors.rs]
//! Tool invocation failure catalog (§4.4.1, §7).

use thiserror::Error;
use warden_graph_model::ErrorCode;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("timed out waiting for {0}")]
    TimedOut(String),

    #[error("connection refused by {0}")]
    ConnectionRefused(String),

    #[error("dns resolution failed for {0}")]
    DnsFailure(String),

    #[error("tls handshake failed for {0}")]
    TlsFailure(String),

    #[error("tool {0} is not a recognized provider")]
    UnknownTool(String),

    #[error("tool {0} exited with a failure")]
    ExecutionFailed(String),

    #[error("tool {0} returned output that did not match its declared schema: {1}")]
    InvalidOutput(String, String),

    #[error("transport error calling {0}: {1}")]
    Transport(String, #[source] reqwest::Error),
}

impl ToolError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ToolError::TimedOut(_) => ErrorCode::E101TimedOut,
            ToolError::ConnectionRefused(_) => ErrorCode::E102ConnectionRefused,
            ToolError::DnsFailure(_) => ErrorCode::E103DnsFailure,
            ToolError::TlsFailure(_) => ErrorCode::E104TlsFailure,
            ToolError::UnknownTool(_) => ErrorCode::E201NotFound,
            ToolError::ExecutionFailed(_) => ErrorCode::E202ExecutionFailed,
            ToolError::InvalidOutput(..) => ErrorCode::E204InvalidOutput,
            ToolError::Transport(..) => ErrorCode::E101TimedOut,
        }
    }

    pub fn from_reqwest(tool: &str, error: reqwest::Error) -> ToolError {
        if error.is_timeout() {
            ToolError::TimedOut(tool.to_string())
        } else if error.is_connect() {
            ToolError::ConnectionRefused(tool.to_string())
        } else {
            ToolError::Transport(tool.to_string(), error)
        }
    }
}

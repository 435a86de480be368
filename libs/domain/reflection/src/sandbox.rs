// [libs/domain/reflection/src/sandbox.rs]
//! Sandboxed execution contract for generated scripts (§4.5,
//! "Sandboxed executor contract").

use crate::script_generator::GeneratedScript;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{instrument, warn};
use uuid::Uuid;

const MAX_WALLCLOCK: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("script exceeded the {0:?} wallclock budget")]
    TimedOut(Duration),

    #[error("failed to spawn sandboxed interpreter: {0}")]
    Spawn(String),

    #[error("script exited non-zero: {0}")]
    NonZeroExit(String),

    #[error("stdout was not a JSON document: {0}")]
    NonJsonOutput(String),
}

/// Runs `script` under a fresh `/tmp/exec-<uuid>` working directory
/// with a hard wallclock cap. Non-JSON stdout is treated as a failure
/// per the contract, not merely a warning.
#[instrument(skip(script), fields(script_type = %script.script_type))]
pub async fn execute(script: &GeneratedScript, work_root: &std::path::Path) -> Result<Value, SandboxError> {
    let exec_dir = work_root.join(format!("exec-{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&exec_dir).await.map_err(|e| SandboxError::Spawn(e.to_string()))?;
    let script_path = write_script_file(&exec_dir, script).await?;

    let run = async {
        let mut child = Command::new(script.interpreter)
            .arg(&script_path)
            .current_dir(&exec_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SandboxError::Spawn(e.to_string()))?;

        let output = child.wait_with_output().await.map_err(|e| SandboxError::Spawn(e.to_string()))?;
        if !output.status.success() {
            return Err(SandboxError::NonZeroExit(String::from_utf8_lossy(&output.stderr).to_string()));
        }
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        serde_json::from_str::<Value>(&stdout).map_err(|_| SandboxError::NonJsonOutput(stdout))
    };

    match tokio::time::timeout(MAX_WALLCLOCK, run).await {
        Ok(result) => result,
        Err(_) => {
            warn!("sandboxed script timed out");
            Err(SandboxError::TimedOut(MAX_WALLCLOCK))
        }
    }
}

async fn write_script_file(exec_dir: &std::path::Path, script: &GeneratedScript) -> Result<PathBuf, SandboxError> {
    let path = exec_dir.join("script.py");
    let mut file = tokio::fs::File::create(&path).await.map_err(|e| SandboxError::Spawn(e.to_string()))?;
    file.write_all(script.source.as_bytes()).await.map_err(|e| SandboxError::Spawn(e.to_string()))?;
    Ok(path)
}

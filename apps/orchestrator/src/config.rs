// [apps/orchestrator/src/config.rs]
//! Environment-driven configuration (SPEC_FULL §10.3). No CLI parsing:
//! the orchestrator is deployed as a single long-running service
//! configured entirely through its environment.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub listen_port: u16,
    pub max_workers: usize,
    pub risk_score_threshold: u8,
    pub max_reflection_iterations: u32,
    pub ring_buffer_capacity: usize,
    pub dedup_window_size: usize,
    pub active_phase_timeout: Duration,
    pub passive_phase_timeout: Duration,
    pub default_phase_timeout: Duration,
    pub tool_sidecar_base_url: String,
}

impl OrchestratorConfig {
    /// Reads configuration from the process environment, falling back
    /// to the defaults §4.3/§5 name for every field a deployer
    /// doesn't override. `DATABASE_URL` has no default: an orchestrator
    /// with nowhere to persist a mission should fail to boot rather
    /// than silently run against an ephemeral store.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingRequired("DATABASE_URL"))?;
        let database_auth_token = std::env::var("TURSO_AUTH_TOKEN").ok();

        Ok(Self {
            database_url,
            database_auth_token,
            listen_port: env_parsed("PORT", 8080),
            max_workers: env_parsed("WARDEN_MAX_WORKERS", 5),
            risk_score_threshold: env_parsed("WARDEN_RISK_SCORE_THRESHOLD", 40),
            max_reflection_iterations: env_parsed("WARDEN_MAX_REFLECTION_ITERATIONS", 3),
            ring_buffer_capacity: env_parsed("WARDEN_RING_BUFFER_CAPACITY", 1000),
            dedup_window_size: env_parsed("WARDEN_DEDUP_WINDOW_SIZE", 5000),
            active_phase_timeout: Duration::from_secs(env_parsed("WARDEN_ACTIVE_PHASE_TIMEOUT_SECS", 600)),
            passive_phase_timeout: Duration::from_secs(env_parsed("WARDEN_PASSIVE_PHASE_TIMEOUT_SECS", 120)),
            default_phase_timeout: Duration::from_secs(env_parsed("WARDEN_DEFAULT_PHASE_TIMEOUT_SECS", 300)),
            tool_sidecar_base_url: std::env::var("WARDEN_TOOL_SIDECAR_URL").unwrap_or_else(|_| "http://localhost:9000".to_string()),
        })
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok()).unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingRequired(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_database_url_is_an_error() {
        std::env::remove_var("DATABASE_URL");
        let result = OrchestratorConfig::from_env();
        assert!(matches!(result, Err(ConfigError::MissingRequired("DATABASE_URL"))));
    }

    #[test]
    fn unset_optional_vars_fall_back_to_documented_defaults() {
        std::env::set_var("DATABASE_URL", ":memory:");
        std::env::remove_var("WARDEN_MAX_WORKERS");
        let config = OrchestratorConfig::from_env().unwrap();
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.ring_buffer_capacity, 1000);
        std::env::remove_var("DATABASE_URL");
    }
}

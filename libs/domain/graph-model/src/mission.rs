// [libs/domain/graph-model/src/mission.rs]
//! Mission entity, phase sequence and state machine shape (§3, §4.3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionMode {
    Stealth,
    Balanced,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl MissionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MissionStatus::Completed | MissionStatus::Failed | MissionStatus::Cancelled)
    }

    /// Validates the state machine in §4.3:
    /// `pending -> running -> (completed | failed | cancelled)`,
    /// terminal states do not transition further.
    pub fn can_transition_to(self, next: MissionStatus) -> bool {
        use MissionStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
                | (Pending, Cancelled)
        )
    }
}

/// The default phase sequence from §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionPhase {
    PassiveRecon,
    SafetyNet,
    ActiveRecon,
    EndpointIntel,
    Verification,
    Planning,
    Reporting,
}

impl MissionPhase {
    pub const SEQUENCE: &'static [MissionPhase] = &[
        MissionPhase::PassiveRecon,
        MissionPhase::SafetyNet,
        MissionPhase::ActiveRecon,
        MissionPhase::EndpointIntel,
        MissionPhase::Verification,
        MissionPhase::Planning,
        MissionPhase::Reporting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MissionPhase::PassiveRecon => "PASSIVE_RECON",
            MissionPhase::SafetyNet => "SAFETY_NET",
            MissionPhase::ActiveRecon => "ACTIVE_RECON",
            MissionPhase::EndpointIntel => "ENDPOINT_INTEL",
            MissionPhase::Verification => "VERIFICATION",
            MissionPhase::Planning => "PLANNING",
            MissionPhase::Reporting => "REPORTING",
        }
    }

    pub fn next(self) -> Option<MissionPhase> {
        let index = Self::SEQUENCE.iter().position(|p| *p == self)?;
        Self::SEQUENCE.get(index + 1).copied()
    }

    /// Soft timeout per §4.3 ("Timeouts"): 600s for active/verification, 120s for passive.
    pub fn soft_timeout(self) -> Duration {
        match self {
            MissionPhase::ActiveRecon | MissionPhase::Verification => Duration::from_secs(600),
            MissionPhase::PassiveRecon => Duration::from_secs(120),
            _ => Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionOptions {
    pub max_workers: usize,
    pub risk_score_threshold: u8,
    pub max_reflection_iterations: u32,
    pub verification_top_k: usize,
    pub attack_path_top_k: usize,
}

impl Default for MissionOptions {
    fn default() -> Self {
        Self {
            max_workers: 5,
            risk_score_threshold: 40,
            max_reflection_iterations: 3,
            verification_top_k: 20,
            attack_path_top_k: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionProgress {
    /// Per-phase node/edge counts recorded at each checkpoint, keyed
    /// by phase name, used to render a progress snapshot to the UI.
    pub phase_counts: HashMap<String, u64>,
    pub errors: Vec<MissionError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionError {
    pub code: String,
    pub stage: String,
    pub message: String,
    pub retryable: bool,
    pub recoverable: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub target_domain: String,
    pub mode: MissionMode,
    pub status: MissionStatus,
    pub current_phase: Option<MissionPhase>,
    pub seed_subdomains: Vec<String>,
    pub options: MissionOptions,
    pub progress: MissionProgress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    pub fn new(target_domain: impl Into<String>, mode: MissionMode, seed_subdomains: Vec<String>, options: MissionOptions) -> Self {
        let now = Utc::now();
        Self {
            id: warden_identifiers::new_mission_id(),
            target_domain: target_domain.into(),
            mode,
            status: MissionStatus::Pending,
            current_phase: None,
            seed_subdomains,
            options,
            progress: MissionProgress::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_sequence_follows_the_documented_order() {
        let names: Vec<&str> = MissionPhase::SEQUENCE.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "PASSIVE_RECON",
                "SAFETY_NET",
                "ACTIVE_RECON",
                "ENDPOINT_INTEL",
                "VERIFICATION",
                "PLANNING",
                "REPORTING",
            ]
        );
    }

    #[test]
    fn terminal_states_cannot_transition() {
        for terminal in [MissionStatus::Completed, MissionStatus::Failed, MissionStatus::Cancelled] {
            for next in [MissionStatus::Pending, MissionStatus::Running, MissionStatus::Completed, MissionStatus::Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn pending_can_go_running_or_cancelled_only() {
        assert!(MissionStatus::Pending.can_transition_to(MissionStatus::Running));
        assert!(MissionStatus::Pending.can_transition_to(MissionStatus::Cancelled));
        assert!(!MissionStatus::Pending.can_transition_to(MissionStatus::Completed));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candidate strategy hyperparameters, fixed-length per run
pub type SolutionVector = Vec<f64>;

/// Position of a solution in behavior space (one entry per tracked trait)
pub type BehaviorDescriptor = Vec<f64>;

/// Best-known solution for one archive cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elite {
    pub solution: SolutionVector,
    pub objective: f64,
    pub descriptor: BehaviorDescriptor,
    pub metadata: EliteMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliteMetadata {
    pub generation: usize,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of scoring one candidate. Always well-formed: malformed
/// candidates come back with the penalty objective and `valid = false`
/// instead of an error.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub objective: f64,
    pub descriptor: BehaviorDescriptor,
    pub valid: bool,
}

/// Snapshot of optimizer progress persisted for the watchdog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerStatus {
    pub iterations: usize,
    pub num_elites: usize,
    pub coverage: f64,
    pub qd_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_checkpoint: Option<CheckpointInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointInfo {
    pub path: String,
    pub mtime: f64,
}

/// Completed round-trip trade from the strategy simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub entry_bar: usize,
    pub exit_bar: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    pub direction: Direction,
    pub size: f64,
    pub profit: f64,
    pub exit_reason: ExitReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Signal,
    StopLoss,
    EndOfData,
}

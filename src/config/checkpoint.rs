use super::traits::ConfigSection;
use crate::error::TradegridError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Persistence root; the writer creates `ribs_checkpoints/` under it
    pub root: PathBuf,
    /// Iterations between full archive snapshots (status is written every
    /// iteration regardless)
    pub archive_snapshot_every: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            archive_snapshot_every: 25,
        }
    }
}

impl ConfigSection for CheckpointConfig {
    fn section_name() -> &'static str {
        "checkpoint"
    }

    fn validate(&self) -> Result<(), TradegridError> {
        if self.archive_snapshot_every == 0 {
            return Err(TradegridError::Configuration(
                "Archive snapshot interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

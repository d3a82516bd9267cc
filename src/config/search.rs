use super::traits::ConfigSection;
use crate::error::TradegridError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Length of every solution vector; fixed for the run
    pub solution_dim: usize,
    pub num_emitters: usize,
    pub batch_size: usize,
    /// Initial step size of each emitter's search distribution
    pub initial_step_size: f64,
    /// Iterations without an archive insertion before an emitter is
    /// recentered on a sampled elite
    pub reseed_after: usize,
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            solution_dim: 5,
            num_emitters: 3,
            batch_size: 20,
            initial_step_size: 0.3,
            reseed_after: 10,
            seed: None,
        }
    }
}

impl ConfigSection for SearchConfig {
    fn section_name() -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<(), TradegridError> {
        if self.solution_dim == 0 {
            return Err(TradegridError::Configuration(
                "Solution dimension must be at least 1".to_string(),
            ));
        }
        if self.num_emitters == 0 {
            return Err(TradegridError::Configuration(
                "At least one emitter is required".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(TradegridError::Configuration(
                "Batch size must be at least 1".to_string(),
            ));
        }
        if self.initial_step_size <= 0.0 || !self.initial_step_size.is_finite() {
            return Err(TradegridError::Configuration(
                "Initial step size must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }
}

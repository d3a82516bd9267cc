use super::traits::ConfigSection;
use crate::error::TradegridError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    /// Per-side commission as a fraction of traded notional
    pub commission: f64,
    /// Minimum bars of market data required to score a candidate
    pub min_bars: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10000.0,
            commission: 0.001,
            min_bars: 50,
        }
    }
}

impl ConfigSection for SimulationConfig {
    fn section_name() -> &'static str {
        "simulation"
    }

    fn validate(&self) -> Result<(), TradegridError> {
        if self.initial_capital <= 0.0 {
            return Err(TradegridError::Configuration(
                "Initial capital must be positive".to_string(),
            ));
        }
        if self.commission < 0.0 || self.commission > 0.1 {
            return Err(TradegridError::Configuration(
                "Commission must be between 0 and 0.1".to_string(),
            ));
        }
        if self.min_bars < 2 {
            return Err(TradegridError::Configuration(
                "At least 2 bars are required for simulation".to_string(),
            ));
        }
        Ok(())
    }
}

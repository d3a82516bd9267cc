use super::traits::ConfigSection;
use crate::error::TradegridError;
use serde::{Deserialize, Serialize};

/// Descriptor grid for the archive: one (lower, upper, bins) triple per
/// behavioral axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub lower_bounds: Vec<f64>,
    pub upper_bounds: Vec<f64>,
    pub bins: Vec<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        // Axis 0: trades per 100 bars, axis 1: max drawdown pct
        Self {
            lower_bounds: vec![0.0, 0.0],
            upper_bounds: vec![20.0, 100.0],
            bins: vec![20, 20],
        }
    }
}

impl GridConfig {
    pub fn num_axes(&self) -> usize {
        self.bins.len()
    }

    pub fn total_cells(&self) -> usize {
        self.bins.iter().product()
    }
}

impl ConfigSection for GridConfig {
    fn section_name() -> &'static str {
        "grid"
    }

    fn validate(&self) -> Result<(), TradegridError> {
        if self.bins.is_empty() {
            return Err(TradegridError::Configuration(
                "Grid must have at least one axis".to_string(),
            ));
        }
        if self.lower_bounds.len() != self.bins.len() || self.upper_bounds.len() != self.bins.len()
        {
            return Err(TradegridError::Configuration(format!(
                "Grid axis mismatch: {} lower bounds, {} upper bounds, {} bin counts",
                self.lower_bounds.len(),
                self.upper_bounds.len(),
                self.bins.len()
            )));
        }
        for (axis, &count) in self.bins.iter().enumerate() {
            if count == 0 {
                return Err(TradegridError::Configuration(format!(
                    "Axis {} must have at least one bin",
                    axis
                )));
            }
        }
        for (axis, (lo, hi)) in self
            .lower_bounds
            .iter()
            .zip(&self.upper_bounds)
            .enumerate()
        {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(TradegridError::Configuration(format!(
                    "Axis {} bounds must be finite with lower < upper (got {} .. {})",
                    axis, lo, hi
                )));
            }
        }
        Ok(())
    }
}

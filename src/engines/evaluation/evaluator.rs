use crate::config::{GridConfig, SearchConfig, SimulationConfig};
use crate::data::MarketData;
use crate::engines::evaluation::{StrategyParams, StrategySimulator, PENALTY_OBJECTIVE};
use crate::types::Evaluation;

/// Scores one candidate against market data.
///
/// Implementations never fail: a malformed candidate or an unsimulatable
/// batch entry comes back as a penalized `Evaluation` so a whole batch
/// survives arbitrarily bad input.
pub trait Evaluator: Sync {
    fn evaluate(&self, solution: &[f64], data: &MarketData) -> Evaluation;
}

/// Default evaluator: the moving-average crossover simulation with a
/// drawdown-penalized Sharpe objective and
/// [trade frequency, max drawdown pct] descriptor.
pub struct SimulationEvaluator {
    simulator: StrategySimulator,
    solution_dim: usize,
    descriptor_axes: usize,
}

impl SimulationEvaluator {
    pub fn new(simulation: SimulationConfig, search: &SearchConfig, grid: &GridConfig) -> Self {
        Self {
            simulator: StrategySimulator::new(simulation),
            solution_dim: search.solution_dim,
            descriptor_axes: grid.num_axes(),
        }
    }

    fn penalized(&self) -> Evaluation {
        Evaluation {
            objective: PENALTY_OBJECTIVE,
            descriptor: vec![0.0; self.descriptor_axes],
            valid: false,
        }
    }

    fn validate_candidate(&self, solution: &[f64]) -> bool {
        solution.len() == self.solution_dim && solution.iter().all(|x| x.is_finite())
    }
}

impl Evaluator for SimulationEvaluator {
    fn evaluate(&self, solution: &[f64], data: &MarketData) -> Evaluation {
        if !self.validate_candidate(solution) {
            log::debug!(
                "Penalizing malformed candidate: len={} (expected {})",
                solution.len(),
                self.solution_dim
            );
            return self.penalized();
        }

        let params = StrategyParams::decode(solution);
        let metrics = match self.simulator.run(&params, data) {
            Ok(metrics) => metrics,
            Err(e) => {
                log::debug!("Penalizing unsimulatable candidate: {}", e);
                return self.penalized();
            }
        };

        let sharpe = metrics.get("sharpe_ratio").copied().unwrap_or(0.0);
        let max_drawdown = metrics.get("max_drawdown_pct").copied().unwrap_or(0.0);
        let frequency = metrics.get("trade_frequency").copied().unwrap_or(0.0);

        let objective = sharpe - max_drawdown / 100.0;
        if !objective.is_finite() {
            return self.penalized();
        }

        Evaluation {
            objective,
            descriptor: vec![frequency, max_drawdown],
            valid: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use polars::df;

    fn evaluator() -> SimulationEvaluator {
        let config = AppConfig::default();
        SimulationEvaluator::new(config.simulation, &config.search, &config.grid)
    }

    fn market(bars: usize) -> MarketData {
        let closes: Vec<f64> = (0..bars)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let opens = closes.clone();
        let highs: Vec<f64> = closes.iter().map(|c| c + 2.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 2.0).collect();
        let volume = vec![1000.0; bars];

        let frame = df! {
            "open" => &opens,
            "high" => &highs,
            "low" => &lows,
            "close" => &closes,
            "volume" => &volume,
        }
        .unwrap();
        MarketData::new(frame).unwrap()
    }

    #[test]
    fn test_wrong_length_candidate_is_penalized() {
        let eval = evaluator().evaluate(&[0.5, 0.5], &market(200));
        assert!(!eval.valid);
        assert_eq!(eval.objective, PENALTY_OBJECTIVE);
        assert!(eval.objective.is_finite());
        assert_eq!(eval.descriptor, vec![0.0, 0.0]);
    }

    #[test]
    fn test_empty_candidate_is_penalized() {
        let eval = evaluator().evaluate(&[], &market(200));
        assert!(!eval.valid);
        assert!(eval.objective.is_finite());
    }

    #[test]
    fn test_nan_candidate_is_penalized() {
        let eval = evaluator().evaluate(&[f64::NAN; 5], &market(200));
        assert!(!eval.valid);
        assert_eq!(eval.objective, PENALTY_OBJECTIVE);
    }

    #[test]
    fn test_infinite_candidate_is_penalized() {
        let eval = evaluator().evaluate(&[0.0, f64::INFINITY, 0.0, 0.0, 0.0], &market(200));
        assert!(!eval.valid);
    }

    #[test]
    fn test_insufficient_data_is_penalized_not_raised() {
        let eval = evaluator().evaluate(&[0.0; 5], &market(5));
        assert!(!eval.valid);
        assert_eq!(eval.objective, PENALTY_OBJECTIVE);
    }

    #[test]
    fn test_well_formed_candidate_scores() {
        let eval = evaluator().evaluate(&[0.0; 5], &market(300));
        assert!(eval.valid);
        assert!(eval.objective.is_finite());
        assert!(eval.objective > PENALTY_OBJECTIVE);
        assert_eq!(eval.descriptor.len(), 2);
        assert!(eval.descriptor.iter().all(|d| d.is_finite()));
    }
}

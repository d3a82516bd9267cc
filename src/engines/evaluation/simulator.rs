use crate::config::SimulationConfig;
use crate::data::MarketData;
use crate::engines::evaluation::Portfolio;
use crate::engines::metrics::MetricsEngine;
use crate::error::{Result, TradegridError};
use std::collections::HashMap;

/// Strategy hyperparameters decoded from an unconstrained solution vector.
///
/// Each component is squashed through a sigmoid and scaled into its trading
/// range, so any finite real vector maps to a runnable strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub entry_threshold: f64,
    pub position_fraction: f64,
    pub stop_loss_pct: f64,
}

impl StrategyParams {
    pub fn decode(solution: &[f64]) -> Self {
        let component = |i: usize| solution.get(i).copied().unwrap_or(0.0);

        let fast_period = scale(sigmoid(component(0)), 2.0, 50.0).round() as usize;
        let slow_gap = scale(sigmoid(component(1)), 5.0, 150.0).round() as usize;
        let entry_threshold = scale(sigmoid(component(2)), 0.0, 0.02);
        let position_fraction = scale(sigmoid(component(3)), 0.05, 0.5);
        let stop_loss_pct = scale(sigmoid(component(4)), 0.02, 0.2);

        Self {
            fast_period,
            slow_period: fast_period + slow_gap,
            entry_threshold,
            position_fraction,
            stop_loss_pct,
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn scale(unit: f64, lo: f64, hi: f64) -> f64 {
    lo + unit * (hi - lo)
}

/// Moving-average crossover simulation: the default fitness collaborator.
pub struct StrategySimulator {
    config: SimulationConfig,
    metrics_engine: MetricsEngine,
}

impl StrategySimulator {
    pub fn new(config: SimulationConfig) -> Self {
        let metrics_engine = MetricsEngine::new(config.initial_capital);
        Self {
            config,
            metrics_engine,
        }
    }

    /// Replay the decoded strategy over the data and return its metric map.
    pub fn run(&self, params: &StrategyParams, data: &MarketData) -> Result<HashMap<String, f64>> {
        let closes = data.closes();

        if closes.len() < self.config.min_bars {
            return Err(TradegridError::Validation(format!(
                "Insufficient data: {} bars, minimum {} required",
                closes.len(),
                self.config.min_bars
            )));
        }
        if closes.len() <= params.slow_period + 1 {
            return Err(TradegridError::Validation(format!(
                "Insufficient data for slow period {}: {} bars",
                params.slow_period,
                closes.len()
            )));
        }
        if closes.iter().any(|c| !c.is_finite()) {
            return Err(TradegridError::Validation(
                "Market data contains non-finite close prices".to_string(),
            ));
        }

        let mut portfolio = Portfolio::new(self.config.initial_capital, self.config.commission);
        let mut fast_ma = RollingMean::new(params.fast_period);
        let mut slow_ma = RollingMean::new(params.slow_period);

        for (bar, &price) in closes.iter().enumerate() {
            let fast = fast_ma.push(price);
            let slow = slow_ma.push(price);

            let signal = match (fast, slow) {
                (Some(fast), Some(slow)) if slow != 0.0 => {
                    let divergence = (fast - slow) / slow;
                    if divergence > params.entry_threshold {
                        1.0
                    } else if divergence < -params.entry_threshold {
                        -1.0
                    } else {
                        0.0
                    }
                }
                _ => 0.0,
            };

            portfolio.process_bar(
                bar,
                signal,
                price,
                params.position_fraction,
                params.stop_loss_pct,
            );
        }

        if portfolio.position.is_some() {
            let last_bar = closes.len() - 1;
            portfolio.close_position(last_bar, closes[last_bar], crate::types::ExitReason::EndOfData);
        }

        Ok(self.metrics_engine.calculate_all(
            portfolio.get_equity_curve(),
            portfolio.get_trades(),
            closes.len(),
        ))
    }
}

/// Incremental simple moving average over a fixed window
struct RollingMean {
    window: usize,
    values: std::collections::VecDeque<f64>,
    sum: f64,
}

impl RollingMean {
    fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            values: std::collections::VecDeque::new(),
            sum: 0.0,
        }
    }

    fn push(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        self.sum += value;
        if self.values.len() > self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old;
            }
        }
        if self.values.len() == self.window {
            Some(self.sum / self.window as f64)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn trending_market(bars: usize) -> MarketData {
        let closes: Vec<f64> = (0..bars).map(|i| 100.0 + i as f64 * 0.5).collect();
        let opens: Vec<f64> = closes.iter().map(|c| c - 0.2).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = opens.iter().map(|o| o - 1.0).collect();
        let volume: Vec<f64> = vec![1000.0; bars];

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
    fn test_decode_maps_any_finite_vector() {
        let params = StrategyParams::decode(&[0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(params.fast_period >= 2);
        assert!(params.slow_period > params.fast_period);
        assert!(params.position_fraction > 0.0 && params.position_fraction <= 0.5);

        // Extreme components stay in range
        let extreme = StrategyParams::decode(&[1e6, -1e6, 50.0, -50.0, 3.0]);
        assert!(extreme.fast_period <= 50);
        assert!(extreme.stop_loss_pct <= 0.2);
    }

    #[test]
    fn test_short_vector_uses_neutral_defaults() {
        let short = StrategyParams::decode(&[1.0]);
        let padded = StrategyParams::decode(&[1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(short, padded);
    }

    #[test]
    fn test_run_produces_metrics_on_trending_data() {
        let simulator = StrategySimulator::new(SimulationConfig::default());
        let data = trending_market(300);
        let params = StrategyParams::decode(&[0.0, -1.0, -2.0, 0.0, 0.0]);

        let metrics = simulator.run(&params, &data).unwrap();
        assert!(metrics.contains_key("max_drawdown_pct"));
        assert!(metrics.contains_key("num_trades"));
        assert!(metrics.contains_key("trade_frequency"));
    }

    #[test]
    fn test_run_rejects_insufficient_data() {
        let simulator = StrategySimulator::new(SimulationConfig::default());
        let data = trending_market(10);
        let params = StrategyParams::decode(&[0.0; 5]);

        assert!(simulator.run(&params, &data).is_err());
    }
}

use crate::engines::metrics::{ProfitabilityMetrics, RiskMetrics};
use crate::types::Trade;
use std::collections::HashMap;

pub struct MetricsEngine {
    initial_balance: f64,
}

impl MetricsEngine {
    pub fn new(initial_balance: f64) -> Self {
        Self { initial_balance }
    }

    pub fn calculate_all(
        &self,
        equity_curve: &[f64],
        trades: &[Trade],
        num_bars: usize,
    ) -> HashMap<String, f64> {
        let mut all_metrics = HashMap::new();

        all_metrics.extend(ProfitabilityMetrics::calculate(trades, self.initial_balance));
        all_metrics.extend(RiskMetrics::calculate(equity_curve));

        all_metrics.insert("num_trades".to_string(), trades.len() as f64);
        all_metrics.insert(
            "final_balance".to_string(),
            equity_curve.last().copied().unwrap_or(self.initial_balance),
        );

        // Behavioral trait: trades per 100 bars
        if num_bars > 0 {
            let frequency = trades.len() as f64 / num_bars as f64 * 100.0;
            all_metrics.insert("trade_frequency".to_string(), frequency);
        }

        all_metrics
    }
}

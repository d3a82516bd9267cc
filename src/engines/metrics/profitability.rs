use crate::types::Trade;
use std::collections::HashMap;

pub struct ProfitabilityMetrics;

impl ProfitabilityMetrics {
    pub fn calculate(trades: &[Trade], initial_balance: f64) -> HashMap<String, f64> {
        let mut metrics = HashMap::new();

        if trades.is_empty() {
            return metrics;
        }

        let total_profit: f64 = trades.iter().map(|t| t.profit).sum();
        let winning: Vec<&Trade> = trades.iter().filter(|t| t.profit > 0.0).collect();
        let losing: Vec<&Trade> = trades.iter().filter(|t| t.profit <= 0.0).collect();

        let return_pct = (total_profit / initial_balance) * 100.0;
        metrics.insert("return_pct".to_string(), return_pct);

        let win_rate = (winning.len() as f64 / trades.len() as f64) * 100.0;
        metrics.insert("win_rate".to_string(), win_rate);

        let gross_profit: f64 = winning.iter().map(|t| t.profit).sum();
        let gross_loss: f64 = losing.iter().map(|t| t.profit.abs()).sum();
        if gross_loss > 0.0 {
            metrics.insert("profit_factor".to_string(), gross_profit / gross_loss);
        }

        metrics
    }
}

pub mod evaluator;
pub mod portfolio;
pub mod simulator;

pub use evaluator::{Evaluator, SimulationEvaluator};
pub use portfolio::Portfolio;
pub use simulator::{StrategyParams, StrategySimulator};

/// Objective assigned to candidates that cannot be scored. Finite so it
/// sorts below every real objective without poisoning arithmetic.
pub const PENALTY_OBJECTIVE: f64 = -1.0e9;

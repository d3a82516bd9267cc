use super::ProgressCallback;

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_iteration_start(&mut self, iteration: usize) {
        println!("Iteration {} starting...", iteration + 1);
    }

    fn on_iteration_complete(&mut self, iteration: usize, best_objective: f64, num_elites: usize) {
        println!(
            "Iteration {} complete. Best objective: {:.4}, elites: {}",
            iteration + 1,
            best_objective,
            num_elites
        );
    }

    fn on_batch_evaluated(&mut self, evaluated: usize, total: usize) {
        if evaluated == total {
            println!("  Evaluated {}/{} candidates", evaluated, total);
        }
    }
}

/// Callback that ignores every event, for headless runs and tests.
pub struct NoopProgressCallback;

impl ProgressCallback for NoopProgressCallback {
    fn on_iteration_start(&mut self, _iteration: usize) {}

    fn on_iteration_complete(&mut self, _iteration: usize, _best: f64, _num_elites: usize) {}

    fn on_batch_evaluated(&mut self, _evaluated: usize, _total: usize) {}
}

use crate::engines::emitters::Emitter;
use crate::types::{Elite, SolutionVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const MIN_STEP_SIZE: f64 = 1e-4;
const STEP_EXPAND: f64 = 1.25;
const STEP_SHRINK: f64 = 0.85;

/// Isotropic-Gaussian evolution-strategy emitter.
///
/// Samples candidates around a mean vector, then moves the mean toward the
/// log-weighted recombination of the best half of each evaluated batch and
/// adapts the step size from whether the batch improved on the best
/// objective this emitter has seen.
pub struct GaussianEmitter {
    mean: Vec<f64>,
    step_size: f64,
    initial_step_size: f64,
    dim: usize,
    rng: StdRng,
    best_seen: Option<f64>,
    stagnant_iters: usize,
}

impl GaussianEmitter {
    pub fn new(dim: usize, initial_step_size: f64, seed: u64) -> Self {
        Self {
            mean: vec![0.0; dim],
            step_size: initial_step_size,
            initial_step_size,
            dim,
            rng: StdRng::seed_from_u64(seed),
            best_seen: None,
            stagnant_iters: 0,
        }
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    fn well_formed(&self, solution: &[f64]) -> bool {
        solution.len() == self.dim && solution.iter().all(|x| x.is_finite())
    }
}

impl Emitter for GaussianEmitter {
    fn ask(&mut self, batch_size: usize) -> Vec<SolutionVector> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        (0..batch_size)
            .map(|_| {
                self.mean
                    .iter()
                    .map(|&m| m + self.step_size * normal.sample(&mut self.rng))
                    .collect()
            })
            .collect()
    }

    fn tell(&mut self, solutions: &[SolutionVector], objectives: &[f64]) {
        if solutions.is_empty() || solutions.len() != objectives.len() {
            return;
        }

        // Rank the whole batch, penalized entries included; they sort to the
        // bottom and drop out of the recombination half on their own.
        let mut ranked: Vec<(usize, f64)> = objectives.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mu = (ranked.len() / 2).max(1);
        let parents: Vec<usize> = ranked[..mu]
            .iter()
            .map(|(i, _)| *i)
            .filter(|&i| self.well_formed(&solutions[i]))
            .collect();

        if !parents.is_empty() {
            // Log-decaying recombination weights over the selected parents
            let weights: Vec<f64> = (0..parents.len())
                .map(|rank| ((mu as f64) + 0.5).ln() - ((rank + 1) as f64).ln())
                .map(|w| w.max(0.0))
                .collect();
            let total: f64 = weights.iter().sum();

            if total > 0.0 {
                let mut new_mean = vec![0.0; self.dim];
                for (rank, &idx) in parents.iter().enumerate() {
                    let w = weights[rank] / total;
                    for (d, &x) in solutions[idx].iter().enumerate() {
                        new_mean[d] += w * x;
                    }
                }
                self.mean = new_mean;
            }
        }

        let batch_best = ranked[0].1;
        let improved = match self.best_seen {
            Some(best) => batch_best > best,
            None => true,
        };

        if improved {
            self.best_seen = Some(batch_best);
            self.step_size = (self.step_size * STEP_EXPAND).min(self.initial_step_size * 10.0);
            self.stagnant_iters = 0;
        } else {
            self.step_size = (self.step_size * STEP_SHRINK).max(MIN_STEP_SIZE);
            self.stagnant_iters += 1;
        }
    }

    fn reseed(&mut self, elite: &Elite) {
        if self.well_formed(&elite.solution) {
            self.mean = elite.solution.clone();
        }
        self.step_size = self.initial_step_size;
        self.best_seen = Some(elite.objective);
        self.stagnant_iters = 0;
    }

    fn stagnation(&self) -> usize {
        self.stagnant_iters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::PENALTY_OBJECTIVE;
    use crate::types::EliteMetadata;
    use chrono::Utc;

    #[test]
    fn test_ask_produces_batch_of_declared_dim() {
        let mut emitter = GaussianEmitter::new(5, 0.3, 42);
        let batch = emitter.ask(8);
        assert_eq!(batch.len(), 8);
        assert!(batch.iter().all(|s| s.len() == 5));
        assert!(batch.iter().flatten().all(|x| x.is_finite()));
    }

    #[test]
    fn test_tell_moves_mean_toward_better_samples() {
        let mut emitter = GaussianEmitter::new(2, 0.5, 42);
        let solutions = vec![
            vec![1.0, 1.0],
            vec![0.9, 1.1],
            vec![-1.0, -1.0],
            vec![-0.9, -1.1],
        ];
        // Samples near (1, 1) score best
        let objectives = vec![2.0, 1.8, -2.0, -1.8];
        emitter.tell(&solutions, &objectives);

        assert!(emitter.mean()[0] > 0.5);
        assert!(emitter.mean()[1] > 0.5);
    }

    #[test]
    fn test_tell_survives_all_penalized_batch() {
        let mut emitter = GaussianEmitter::new(3, 0.3, 7);
        let solutions = vec![vec![f64::NAN; 3], vec![1.0], vec![]];
        let objectives = vec![PENALTY_OBJECTIVE; 3];
        emitter.tell(&solutions, &objectives);

        assert!(emitter.mean().iter().all(|x| x.is_finite()));
        assert!(emitter.step_size().is_finite() && emitter.step_size() > 0.0);
    }

    #[test]
    fn test_stagnation_counts_and_reseed_resets() {
        let mut emitter = GaussianEmitter::new(2, 0.3, 7);
        let solutions = vec![vec![0.1, 0.1], vec![0.2, 0.2]];

        emitter.tell(&solutions, &[5.0, 4.0]);
        assert_eq!(emitter.stagnation(), 0);

        // No improvement over 5.0 twice
        emitter.tell(&solutions, &[1.0, 0.5]);
        emitter.tell(&solutions, &[1.0, 0.5]);
        assert_eq!(emitter.stagnation(), 2);

        let elite = Elite {
            solution: vec![3.0, -3.0],
            objective: 9.0,
            descriptor: vec![1.0, 2.0],
            metadata: EliteMetadata {
                generation: 1,
                timestamp: Utc::now(),
            },
        };
        emitter.reseed(&elite);
        assert_eq!(emitter.stagnation(), 0);
        assert_eq!(emitter.mean(), &[3.0, -3.0]);
    }

    #[test]
    fn test_step_size_shrinks_without_improvement() {
        let mut emitter = GaussianEmitter::new(2, 0.3, 11);
        let solutions = vec![vec![0.0, 0.0]];
        emitter.tell(&solutions, &[1.0]);
        let after_improvement = emitter.step_size();

        emitter.tell(&solutions, &[0.0]);
        assert!(emitter.step_size() < after_improvement);
        assert!(emitter.step_size() >= MIN_STEP_SIZE);
    }
}

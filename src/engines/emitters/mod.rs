pub mod gaussian;

pub use gaussian::GaussianEmitter;

use crate::types::{Elite, SolutionVector};

/// Candidate generator with its own search-distribution state. Emitters
/// never share state; they interact only through the archive the scheduler
/// owns.
pub trait Emitter: Send {
    /// Sample a batch of candidates from the current distribution.
    fn ask(&mut self, batch_size: usize) -> Vec<SolutionVector>;

    /// Update the distribution from an evaluated batch. Penalized entries
    /// are passed through as low-fitness samples, not filtered out.
    fn tell(&mut self, solutions: &[SolutionVector], objectives: &[f64]);

    /// Recenter the distribution on an archive elite.
    fn reseed(&mut self, elite: &Elite);

    /// Consecutive `tell` updates without an objective improvement.
    fn stagnation(&self) -> usize;
}

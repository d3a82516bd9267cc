pub mod grid;

pub use grid::GridArchive;

use crate::types::{BehaviorDescriptor, Elite, SolutionVector};
use rand::RngCore;

/// Archive backend: grid-based by default, swappable for tests.
///
/// `insert` must be called from a single thread; parallel evaluation
/// workers hand their results back to the scheduler, which owns the
/// archive.
pub trait ArchiveStore: Send {
    /// Store the solution if it strictly improves its cell. Returns whether
    /// an insertion or replacement happened.
    fn insert(
        &mut self,
        solution: SolutionVector,
        objective: f64,
        descriptor: BehaviorDescriptor,
        generation: usize,
    ) -> bool;

    /// Up to `n` elites drawn uniformly from distinct occupied cells.
    fn sample_elites(&self, n: usize, rng: &mut dyn RngCore) -> Vec<Elite>;

    /// Occupied cells / total cells, in [0, 1].
    fn coverage(&self) -> f64;

    /// Sum of stored elite objectives.
    fn qd_score(&self) -> f64;

    fn num_elites(&self) -> usize;

    /// All stored elites, for snapshots and reporting.
    fn elites(&self) -> Vec<Elite>;

    /// Replay a snapshot through the improvement rule, preserving elite
    /// metadata. Returns how many entries were stored.
    fn restore(&mut self, elites: Vec<Elite>) -> usize;
}

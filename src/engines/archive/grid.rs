use crate::config::GridConfig;
use crate::engines::archive::ArchiveStore;
use crate::error::Result;
use crate::types::{BehaviorDescriptor, Elite, EliteMetadata, SolutionVector};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::HashMap;

/// Grid-indexed archive: one elite per discretized descriptor cell, keeping
/// the highest-objective solution ever seen for that cell.
pub struct GridArchive {
    config: GridConfig,
    cells: HashMap<usize, Elite>,
}

impl GridArchive {
    pub fn new(config: GridConfig) -> Result<Self> {
        use crate::config::traits::ConfigSection;
        config.validate()?;
        Ok(Self {
            config,
            cells: HashMap::new(),
        })
    }

    pub fn total_cells(&self) -> usize {
        self.config.total_cells()
    }

    /// Flat cell index for a descriptor, clamped into the grid bounds.
    fn cell_index(&self, descriptor: &[f64]) -> usize {
        let mut index = 0;
        for axis in 0..self.config.bins.len() {
            let lo = self.config.lower_bounds[axis];
            let hi = self.config.upper_bounds[axis];
            let bins = self.config.bins[axis];

            let raw = descriptor.get(axis).copied().unwrap_or(lo);
            let value = if raw.is_finite() { raw.clamp(lo, hi) } else { lo };

            let bin = (((value - lo) / (hi - lo)) * bins as f64) as usize;
            let bin = bin.min(bins - 1);

            index = index * bins + bin;
        }
        index
    }

    fn insert_elite(&mut self, elite: Elite) -> bool {
        let index = self.cell_index(&elite.descriptor);

        if let Some(existing) = self.cells.get(&index) {
            if existing.objective >= elite.objective {
                return false;
            }
        }
        self.cells.insert(index, elite);
        true
    }
}

impl ArchiveStore for GridArchive {
    fn insert(
        &mut self,
        solution: SolutionVector,
        objective: f64,
        descriptor: BehaviorDescriptor,
        generation: usize,
    ) -> bool {
        self.insert_elite(Elite {
            solution,
            objective,
            descriptor,
            metadata: EliteMetadata {
                generation,
                timestamp: Utc::now(),
            },
        })
    }

    fn sample_elites(&self, n: usize, rng: &mut dyn RngCore) -> Vec<Elite> {
        let occupied: Vec<&Elite> = self.cells.values().collect();
        occupied
            .choose_multiple(rng, n)
            .map(|e| (*e).clone())
            .collect()
    }

    fn coverage(&self) -> f64 {
        self.cells.len() as f64 / self.total_cells() as f64
    }

    fn qd_score(&self) -> f64 {
        self.cells.values().map(|e| e.objective).sum()
    }

    fn num_elites(&self) -> usize {
        self.cells.len()
    }

    fn elites(&self) -> Vec<Elite> {
        self.cells.values().cloned().collect()
    }

    fn restore(&mut self, elites: Vec<Elite>) -> usize {
        elites
            .into_iter()
            .filter(|e| self.insert_elite(e.clone()))
            .count()
    }
}

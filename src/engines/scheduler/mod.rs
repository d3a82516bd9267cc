pub mod checkpoint;
pub mod progress;

pub use checkpoint::CheckpointWriter;
pub use progress::{ConsoleProgressCallback, NoopProgressCallback};

use crate::config::AppConfig;
use crate::data::MarketData;
use crate::engines::archive::{ArchiveStore, GridArchive};
use crate::engines::emitters::{Emitter, GaussianEmitter};
use crate::engines::evaluation::{Evaluator, SimulationEvaluator};
use crate::error::Result;
use crate::types::{CheckpointInfo, Elite, EliteMetadata, Evaluation, OptimizerStatus};
use chrono::{SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait ProgressCallback: Send {
    fn on_iteration_start(&mut self, iteration: usize);
    fn on_iteration_complete(&mut self, iteration: usize, best_objective: f64, num_elites: usize);
    fn on_batch_evaluated(&mut self, evaluated: usize, total: usize);
}

/// Orchestrates ask -> evaluate -> tell rounds across the emitters and the
/// archive. Evaluation fans out across rayon workers; archive insertion and
/// emitter updates stay on this thread.
pub struct Scheduler {
    emitters: Vec<Box<dyn Emitter>>,
    archive: Box<dyn ArchiveStore>,
    evaluator: Box<dyn Evaluator>,
    checkpoint: Option<CheckpointWriter>,
    latest_snapshot: Option<CheckpointInfo>,
    batch_size: usize,
    reseed_after: usize,
    archive_snapshot_every: usize,
    iterations_completed: usize,
    rng: StdRng,
}

impl Scheduler {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.search.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let emitters: Vec<Box<dyn Emitter>> = (0..config.search.num_emitters)
            .map(|_| {
                Box::new(GaussianEmitter::new(
                    config.search.solution_dim,
                    config.search.initial_step_size,
                    rng.gen::<u64>(),
                )) as Box<dyn Emitter>
            })
            .collect();

        let archive = Box::new(GridArchive::new(config.grid.clone())?);
        let evaluator = Box::new(SimulationEvaluator::new(
            config.simulation.clone(),
            &config.search,
            &config.grid,
        ));

        Ok(Self {
            emitters,
            archive,
            evaluator,
            checkpoint: None,
            latest_snapshot: None,
            batch_size: config.search.batch_size,
            reseed_after: config.search.reseed_after,
            archive_snapshot_every: config.checkpoint.archive_snapshot_every,
            iterations_completed: 0,
            rng,
        })
    }

    /// Assemble from explicit parts. Tests inject fake emitters, archives
    /// or evaluators here without touching the cycle logic.
    pub fn with_components(
        emitters: Vec<Box<dyn Emitter>>,
        archive: Box<dyn ArchiveStore>,
        evaluator: Box<dyn Evaluator>,
        batch_size: usize,
        reseed_after: usize,
    ) -> Self {
        Self {
            emitters,
            archive,
            evaluator,
            checkpoint: None,
            latest_snapshot: None,
            batch_size,
            reseed_after,
            archive_snapshot_every: usize::MAX,
            iterations_completed: 0,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn attach_checkpoint_writer(&mut self, writer: CheckpointWriter) {
        self.checkpoint = Some(writer);
    }

    /// Reload the archive from the latest snapshot, if one exists, and
    /// recenter every emitter on a sampled elite.
    pub fn warm_start(&mut self) -> Result<usize> {
        let Some(writer) = &self.checkpoint else {
            return Ok(0);
        };
        let elites = writer.load_archive()?;
        let restored = self.archive.restore(elites);
        log::info!("Warm start: restored {} elites from snapshot", restored);

        for emitter in &mut self.emitters {
            if let Some(elite) = self.archive.sample_elites(1, &mut self.rng).pop() {
                emitter.reseed(&elite);
            }
        }
        Ok(restored)
    }

    pub fn run_optimization_cycle(
        &mut self,
        data: &MarketData,
        iterations: usize,
    ) -> Result<Vec<Elite>> {
        self.run_with_progress(data, iterations, &mut NoopProgressCallback)
    }

    /// Run `iterations` ask/evaluate/tell rounds and return every elite
    /// newly inserted or promoted along the way. Malformed candidates cost
    /// a population slot and a penalty score but never abort the cycle.
    pub fn run_with_progress<C: ProgressCallback>(
        &mut self,
        data: &MarketData,
        iterations: usize,
        callback: &mut C,
    ) -> Result<Vec<Elite>> {
        let mut promoted = Vec::new();

        for _ in 0..iterations {
            let iteration = self.iterations_completed;
            callback.on_iteration_start(iteration);

            // ASK
            let batch_size = self.batch_size;
            let batches: Vec<Vec<Vec<f64>>> = self
                .emitters
                .iter_mut()
                .map(|emitter| emitter.ask(batch_size))
                .collect();

            // EVALUATE: pure per candidate, so the batch fans out across
            // rayon workers; the evaluator absorbs per-candidate failure.
            let evaluator = self.evaluator.as_ref();
            let evaluations: Vec<Vec<Evaluation>> = batches
                .par_iter()
                .map(|batch| {
                    batch
                        .par_iter()
                        .map(|solution| evaluator.evaluate(solution, data))
                        .collect()
                })
                .collect();

            // TELL: emitter updates and serialized archive insertion
            let total: usize = batches.iter().map(|b| b.len()).sum();
            let mut evaluated = 0;
            let mut iteration_best = f64::NEG_INFINITY;

            for (emitter_idx, (batch, evals)) in batches.iter().zip(&evaluations).enumerate() {
                let objectives: Vec<f64> = evals.iter().map(|e| e.objective).collect();
                self.emitters[emitter_idx].tell(batch, &objectives);

                for (solution, eval) in batch.iter().zip(evals) {
                    if eval.objective > iteration_best {
                        iteration_best = eval.objective;
                    }
                    if !eval.valid {
                        continue;
                    }
                    let inserted = self.archive.insert(
                        solution.clone(),
                        eval.objective,
                        eval.descriptor.clone(),
                        iteration,
                    );
                    if inserted {
                        promoted.push(Elite {
                            solution: solution.clone(),
                            objective: eval.objective,
                            descriptor: eval.descriptor.clone(),
                            metadata: EliteMetadata {
                                generation: iteration,
                                timestamp: Utc::now(),
                            },
                        });
                    }
                }

                evaluated += batch.len();
                callback.on_batch_evaluated(evaluated, total);
            }

            // Recenter emitters that have gone quiet
            for emitter in &mut self.emitters {
                if emitter.stagnation() >= self.reseed_after {
                    if let Some(elite) = self.archive.sample_elites(1, &mut self.rng).pop() {
                        log::debug!(
                            "Reseeding stagnant emitter from elite (objective {:.4})",
                            elite.objective
                        );
                        emitter.reseed(&elite);
                    }
                }
            }

            self.iterations_completed += 1;
            callback.on_iteration_complete(iteration, iteration_best, self.archive.num_elites());

            self.write_checkpoint(self.iterations_completed % self.archive_snapshot_every == 0);
        }

        // Final snapshot so a restart picks up the finished run
        self.write_checkpoint(true);

        Ok(promoted)
    }

    pub fn status(&self) -> OptimizerStatus {
        OptimizerStatus {
            iterations: self.iterations_completed,
            num_elites: self.archive.num_elites(),
            coverage: self.archive.coverage(),
            qd_score: self.archive.qd_score(),
            latest_checkpoint: self.latest_snapshot.clone(),
            last_completed: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }

    pub fn archive(&self) -> &dyn ArchiveStore {
        self.archive.as_ref()
    }

    pub fn iterations_completed(&self) -> usize {
        self.iterations_completed
    }

    /// Best-effort persistence: a failed write is logged and superseded by
    /// the next one.
    fn write_checkpoint(&mut self, snapshot_archive: bool) {
        let Some(writer) = &self.checkpoint else {
            return;
        };

        if snapshot_archive {
            match writer.write_archive(&self.archive.elites()) {
                Ok(path) => {
                    self.latest_snapshot = Some(CheckpointInfo {
                        path: path.display().to_string(),
                        mtime: epoch_seconds(),
                    });
                }
                Err(e) => log::warn!("Archive snapshot failed: {}", e),
            }
        }

        let status = self.status();
        if let Err(e) = writer.write_status(&status) {
            log::warn!("Status checkpoint failed: {}", e);
        }
    }
}

fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

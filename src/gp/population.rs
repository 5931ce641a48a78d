//! Fixed-size populations and the concurrent generation advance.
//!
//! Advancing a generation starts one worker per current tree. Each worker
//! tests its tree against a random training case, mutating and retrying
//! until it matches or runs out of tries, then commits one clone into a
//! shared, capacity-bounded pool. Once every worker has finished, the pool
//! becomes the new generation.

use crate::error::ConfigError;
use crate::gp::evaluation::{ErrorBehavior, Uses};
use crate::gp::mutation::{mutate, random_tree, MutationConfig};
use crate::gp::operation::OperationLibrary;
use crate::gp::training::TrainingSet;
use crate::gp::tree::{multiset_eq, ProgramTree};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A collection of exactly `size` program trees.
#[derive(Debug, Clone)]
pub struct Population {
    size: usize,
    trees: Vec<ProgramTree>,
}

/// Summary of one [`Population::train_generation`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Survivors that matched their sampled training case.
    pub matched: usize,
    /// Survivors forced in after exhausting `max_tries`.
    pub forced: usize,
    /// Mutate-and-run attempts across all workers.
    pub attempts: usize,
}

impl Population {
    /// Create `size` trees, each a bottom node mutated once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSize`] if `size` is zero.
    pub fn new<R: Rng>(
        size: usize,
        library: &OperationLibrary,
        config: &MutationConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        if size < 1 {
            return Err(ConfigError::InvalidSize(size));
        }
        config.validate()?;
        let trees = (0..size).map(|_| random_tree(library, config, rng)).collect();
        Ok(Self { size, trees })
    }

    /// Assemble a population from decoded trees.
    pub(crate) fn from_trees(trees: Vec<ProgramTree>) -> Self {
        Self {
            size: trees.len(),
            trees,
        }
    }

    /// Target number of trees per generation.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current trees, in no meaningful order.
    #[must_use]
    pub fn trees(&self) -> &[ProgramTree] {
        &self.trees
    }

    /// Advance one generation against `set`.
    ///
    /// Every worker commits exactly one tree, so the new generation always
    /// holds `size` trees. Workers race to commit, but the new generation
    /// is stored in seed order. Worker RNGs are seeded from `rng`, so a
    /// seeded `rng` reproduces the same generation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMaxTries`] if `max_tries` is zero, or an
    /// error from [`MutationConfig::validate`]. The population is untouched
    /// on error.
    pub fn train_generation<R: Rng>(
        &mut self,
        set: &TrainingSet,
        library: &OperationLibrary,
        max_tries: usize,
        config: &MutationConfig,
        rng: &mut R,
    ) -> Result<GenerationReport, ConfigError> {
        if max_tries == 0 {
            return Err(ConfigError::ZeroMaxTries);
        }
        config.validate()?;

        // Current trees stay in place until the new generation is complete.
        let seeds = self.trees.clone();
        let worker_seeds: Vec<u64> = seeds.iter().map(|_| rng.r#gen()).collect();
        let pool = SurvivorPool::new(self.size);

        let outcomes: Vec<WorkerOutcome> = seeds
            .into_par_iter()
            .zip(worker_seeds)
            .enumerate()
            .map(|(index, (tree, seed))| {
                let mut worker_rng = SmallRng::seed_from_u64(seed);
                let worker = Worker {
                    index,
                    set,
                    library,
                    config,
                    max_tries,
                    pool: &pool,
                };
                worker.run(tree, &mut worker_rng)
            })
            .collect();

        let mut report = GenerationReport::default();
        for outcome in outcomes {
            match outcome {
                WorkerOutcome::Matched { attempts } => {
                    report.matched += 1;
                    report.attempts += attempts;
                }
                WorkerOutcome::Forced { attempts } => {
                    report.forced += 1;
                    report.attempts += attempts;
                }
                // Unreachable while each of `size` workers commits once.
                WorkerOutcome::Crowded { attempts } => {
                    log::warn!("survivor pool filled before every worker committed");
                    report.attempts += attempts;
                }
            }
        }

        self.trees = pool.into_trees();
        debug_assert_eq!(self.trees.len(), self.size);
        log::debug!(
            "generation advanced: {} matched, {} forced, {} attempts",
            report.matched,
            report.forced,
            report.attempts
        );
        Ok(report)
    }

    /// Run every tree on `input`, lazily.
    ///
    /// Nothing is cached; call again to re-run.
    #[must_use]
    pub fn use_on<'a>(&'a self, input: &'a str, library: &'a OperationLibrary, behavior: ErrorBehavior) -> Uses<'a> {
        Uses::new(&self.trees, input, library, behavior)
    }
}

/// Populations compare equal when their sizes match and their trees match
/// as a multiset under structural equality.
impl PartialEq for Population {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && multiset_eq(&self.trees, &other.trees)
    }
}

impl Eq for Population {}

/// Capacity-bounded store the workers race to fill.
///
/// Survivors are tagged with the committing worker's index so the drained
/// generation has a stable order regardless of who won each race.
#[derive(Debug)]
struct SurvivorPool {
    capacity: usize,
    committed: AtomicUsize,
    trees: Mutex<Vec<(usize, ProgramTree)>>,
}

impl SurvivorPool {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            committed: AtomicUsize::new(0),
            trees: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    fn is_full(&self) -> bool {
        self.committed.load(Ordering::Acquire) >= self.capacity
    }

    /// Commit a clone of `tree` if there is room. Capacity is checked
    /// before cloning and again under the lock.
    fn try_commit(&self, worker: usize, tree: &ProgramTree) -> bool {
        if self.is_full() {
            return false;
        }
        let survivor = tree.clone();
        let mut trees = self.trees.lock().unwrap_or_else(PoisonError::into_inner);
        if trees.len() >= self.capacity {
            return false;
        }
        trees.push((worker, survivor));
        self.committed.store(trees.len(), Ordering::Release);
        true
    }

    fn into_trees(self) -> Vec<ProgramTree> {
        let mut tagged = self.trees.into_inner().unwrap_or_else(PoisonError::into_inner);
        tagged.sort_unstable_by_key(|(worker, _)| *worker);
        tagged.into_iter().map(|(_, tree)| tree).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerOutcome {
    Matched { attempts: usize },
    Forced { attempts: usize },
    Crowded { attempts: usize },
}

/// Shared inputs for one generation's workers.
struct Worker<'a> {
    index: usize,
    set: &'a TrainingSet,
    library: &'a OperationLibrary,
    config: &'a MutationConfig,
    max_tries: usize,
    pool: &'a SurvivorPool,
}

impl Worker<'_> {
    fn run<R: Rng>(&self, mut tree: ProgramTree, rng: &mut R) -> WorkerOutcome {
        if self.passes(&tree, rng) {
            return self.commit(&tree, WorkerOutcome::Matched { attempts: 0 });
        }

        let mut attempts = 0;
        while attempts < self.max_tries {
            if self.pool.is_full() {
                return WorkerOutcome::Crowded { attempts };
            }
            mutate(&mut tree, self.library, self.config, rng);
            attempts += 1;
            if self.passes(&tree, rng) {
                return self.commit(&tree, WorkerOutcome::Matched { attempts });
            }
        }

        log::trace!("forcing unmatched survivor after {attempts} attempts (size {})", tree.size());
        self.commit(&tree, WorkerOutcome::Forced { attempts })
    }

    /// Run against one random case. Operation failures count as a miss.
    fn passes<R: Rng>(&self, tree: &ProgramTree, rng: &mut R) -> bool {
        let case = self.set.sample(rng);
        tree.run(&case.input, self.library)
            .is_ok_and(|output| case.accepts(&output))
    }

    fn commit(&self, tree: &ProgramTree, outcome: WorkerOutcome) -> WorkerOutcome {
        if self.pool.try_commit(self.index, tree) {
            return outcome;
        }
        let attempts = match outcome {
            WorkerOutcome::Matched { attempts }
            | WorkerOutcome::Forced { attempts }
            | WorkerOutcome::Crowded { attempts } => attempts,
        };
        WorkerOutcome::Crowded { attempts }
    }
}

//! Genetic programming engine for string transforms.
//!
//! Candidates are program trees whose nodes apply library operations to
//! their children's outputs. A fixed-size population advances by letting
//! one worker per tree mutate and test it against random training cases
//! until it earns a place in the next generation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      Evolution Loop (sessions)      │
//! ├─────────────────────────────────────┤
//! │ Population: train │ use │ persist   │
//! ├─────────────────────────────────────┤
//! │    Program Tree  │   Mutation       │
//! ├─────────────────────────────────────┤
//! │         Operation Library           │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use strgp::builtin;
//! use strgp::gp::{ErrorBehavior, MutationConfig, Population, TrainingCase, TrainingSet};
//!
//! let library = builtin::scenario_library();
//! let config = MutationConfig::default();
//! let mut rng = SmallRng::seed_from_u64(42);
//! let mut population = Population::new(4, &library, &config, &mut rng)?;
//! let set = TrainingSet::new(vec![TrainingCase::new("ab", ["BA"])])?;
//!
//! population.train_generation(&set, &library, 50, &config, &mut rng)?;
//! assert_eq!(population.trees().len(), 4);
//!
//! for output in population.use_on("ab", &library, ErrorBehavior::Skip) {
//!     let _ = output?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod evaluation;
mod evolution;
mod mutation;
mod operation;
mod persistence;
mod population;
mod training;
mod tree;

pub use evaluation::{ErrorBehavior, Uses};
pub use evolution::{evolve, EvolutionConfig, EvolutionError, EvolutionStats, GenerationStats, Session};
pub use mutation::{mutate, random_tree, MutationConfig};
pub use operation::{OpRef, Operation, OperationFn, OperationLibrary};
pub use persistence::{
    decode_population, encode_population, load_session, load_training_file, read_population, read_session,
    read_training_set, read_tree, save_session, save_training_file, write_population, write_population_version,
    write_session, write_training_set, write_tree, MAX_TREE_DEPTH, POPULATION_VERSION, SESSION_VERSION,
    WRAPPER_VERSION_FLOOR,
};
pub use population::{GenerationReport, Population};
pub use training::{TrainingCase, TrainingSet};
pub use tree::{ProgramTree, TreeDisplay};

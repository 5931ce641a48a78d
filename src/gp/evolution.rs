//! Multi-generation training loop.
//!
//! Wraps [`Population::train_generation`] with a generation counter,
//! per-generation progress callbacks, and a JSON-loadable configuration.

#![allow(clippy::cast_precision_loss)]

use crate::error::ConfigError;
use crate::gp::mutation::MutationConfig;
use crate::gp::operation::OperationLibrary;
use crate::gp::population::{GenerationReport, Population};
use crate::gp::training::TrainingSet;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

/// Configuration for a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Trees per generation for a fresh population.
    pub population_size: usize,
    /// Number of generations to run.
    pub generations: usize,
    /// Failed attempts before a worker forces its tree in.
    pub max_tries: usize,
    /// Mutation probabilities.
    pub mutation: MutationConfig,
    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 10,
            max_tries: 50,
            mutation: MutationConfig::default(),
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// resulting configuration is invalid.
    pub fn from_json_file(path: &Path) -> Result<Self, EvolutionError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a zero population size, zero
    /// `max_tries`, or bad mutation probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 1 {
            return Err(ConfigError::InvalidSize(self.population_size));
        }
        if self.max_tries == 0 {
            return Err(ConfigError::ZeroMaxTries);
        }
        self.mutation.validate()
    }

    /// The RNG for this run: seeded if `seed` is set, otherwise from entropy.
    #[must_use]
    pub fn rng(&self) -> SmallRng {
        self.seed.map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64)
    }
}

/// A population plus the number of generations it has been trained for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Generations trained so far.
    pub generation: u32,
    /// The trained population.
    pub population: Population,
}

impl Session {
    /// Start a session at generation zero.
    #[must_use]
    pub fn new(population: Population) -> Self {
        Self {
            generation: 0,
            population,
        }
    }
}

/// Statistics for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationStats {
    /// Session generation number after this step.
    pub generation: u32,
    /// Worker outcome counts.
    pub report: GenerationReport,
}

/// Statistics for a whole run.
#[derive(Debug, Clone, Default)]
pub struct EvolutionStats {
    /// Per-generation statistics.
    pub generations: Vec<GenerationStats>,
    /// Survivors that matched, summed over all generations.
    pub matched: usize,
    /// Survivors forced in, summed over all generations.
    pub forced: usize,
    /// Wall-clock time in seconds.
    pub elapsed_seconds: f64,
}

impl EvolutionStats {
    /// Fraction of survivors that genuinely matched their sampled case.
    #[must_use]
    pub fn match_rate(&self) -> f64 {
        let total = self.matched + self.forced;
        if total == 0 { 0.0 } else { self.matched as f64 / total as f64 }
    }
}

/// Run `config.generations` generations on `session`.
///
/// `on_generation` is called after each generation, in order.
///
/// # Errors
///
/// Returns a [`ConfigError`] if `config` is invalid; nothing is trained.
pub fn evolve<R, F>(
    session: &mut Session,
    set: &TrainingSet,
    library: &OperationLibrary,
    config: &EvolutionConfig,
    rng: &mut R,
    mut on_generation: F,
) -> Result<EvolutionStats, ConfigError>
where
    R: Rng,
    F: FnMut(&GenerationStats),
{
    config.validate()?;
    let start = Instant::now();
    let mut stats = EvolutionStats::default();

    for _ in 0..config.generations {
        let report = session
            .population
            .train_generation(set, library, config.max_tries, &config.mutation, rng)?;
        session.generation = session.generation.saturating_add(1);

        let gen_stats = GenerationStats {
            generation: session.generation,
            report,
        };
        stats.matched += report.matched;
        stats.forced += report.forced;
        stats.generations.push(gen_stats);
        on_generation(&gen_stats);
    }

    stats.elapsed_seconds = start.elapsed().as_secs_f64();
    log::info!(
        "trained {} generations (now at {}): {} matched, {} forced in {:.2}s",
        config.generations,
        session.generation,
        stats.matched,
        stats.forced,
        stats.elapsed_seconds
    );
    Ok(stats)
}

/// Error loading a configuration file.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// File could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// File was not valid JSON for this configuration.
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration values were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin;
    use crate::gp::training::TrainingCase;
    use tempfile::tempdir;

    #[test]
    fn test_evolution_config_default() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.population_size > 0);
        assert!(config.max_tries > 0);
    }

    #[test]
    fn test_config_json_partial_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "generations": 3, "mutation": { "expand": 0.1 }, "seed": 7 }"#).unwrap();

        let config = EvolutionConfig::from_json_file(&path).unwrap();

        assert_eq!(config.generations, 3);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.population_size, 100);
        assert!((config.mutation.expand - 0.1).abs() < f64::EPSILON);
        assert!((config.mutation.done - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_json_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "max_tries": 0 }"#).unwrap();

        let err = EvolutionConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, EvolutionError::Config(ConfigError::ZeroMaxTries)));
    }

    #[test]
    fn test_evolve_counts_generations() {
        let library = builtin::scenario_library();
        let config = EvolutionConfig {
            population_size: 4,
            generations: 3,
            max_tries: 10,
            seed: Some(1),
            ..EvolutionConfig::default()
        };
        let mut rng = config.rng();
        let population = Population::new(config.population_size, &library, &config.mutation, &mut rng).unwrap();
        let mut session = Session::new(population);
        let set = TrainingSet::new(vec![TrainingCase::new("ab", ["BA"])]).unwrap();
        let mut seen = Vec::new();

        let stats = evolve(&mut session, &set, &library, &config, &mut rng, |g| seen.push(g.generation)).unwrap();

        assert_eq!(session.generation, 3);
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(stats.matched + stats.forced, 12);
        assert_eq!(session.population.trees().len(), 4);
        assert!((0.0..=1.0).contains(&stats.match_rate()));
    }
}

//! End-to-end tests for training, using, and persisting populations.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use rand::SeedableRng;
use rand::rngs::SmallRng;
use strgp::builtin;
use strgp::gp::{
    decode_population, encode_population, evolve, load_session, load_training_file, save_session,
    save_training_file, ErrorBehavior, EvolutionConfig, MutationConfig, Population, ProgramTree, Session,
    TrainingCase, TrainingSet,
};
use strgp::{ConfigError, PersistError};
use tempfile::tempdir;

/// Version 0, size 1, one identity leaf.
const IDENTITY_POPULATION: [u8; 14] = [0, 0, 1, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0];

fn reverse_case() -> TrainingSet {
    TrainingSet::new(vec![TrainingCase::new("ab", ["BA"])]).unwrap()
}

#[test]
fn test_identity_leaf_returns_input() {
    let library = builtin::scenario_library();
    assert_eq!(ProgramTree::bottom().run("x", &library).unwrap(), "x");

    let population = decode_population(&IDENTITY_POPULATION, &library).unwrap();
    let out: Vec<_> = population.use_on("x", &library, ErrorBehavior::FailFast).collect();
    assert_eq!(out, vec![Ok("x".to_owned())]);
}

#[test]
fn test_scenario_generation_keeps_size() {
    let library = builtin::scenario_library();
    let config = MutationConfig::default();
    let mut rng = SmallRng::seed_from_u64(2024);
    let mut population = Population::new(4, &library, &config, &mut rng).unwrap();
    let set = reverse_case();

    let report = population.train_generation(&set, &library, 50, &config, &mut rng).unwrap();

    assert_eq!(population.trees().len(), 4);
    assert_eq!(report.matched + report.forced, 4);
    let matching = population
        .use_on("ab", &library, ErrorBehavior::Skip)
        .filter(|out| out.as_deref() == Ok("BA"))
        .count();
    assert!(matching >= report.matched);
}

#[test]
fn test_scenario_converges_over_generations() {
    let library = builtin::scenario_library();
    let config = EvolutionConfig {
        population_size: 8,
        generations: 20,
        max_tries: 50,
        seed: Some(3),
        ..EvolutionConfig::default()
    };
    let mut rng = config.rng();
    let population = Population::new(config.population_size, &library, &config.mutation, &mut rng).unwrap();
    let mut session = Session::new(population);

    let stats = evolve(&mut session, &reverse_case(), &library, &config, &mut rng, |_| {}).unwrap();

    assert_eq!(session.generation, 20);
    assert_eq!(stats.generations.len(), 20);
    assert!(session.population.trees().iter().all(ProgramTree::sizes_consistent));
}

#[test]
fn test_zero_size_population_rejected() {
    let library = builtin::scenario_library();
    let mut rng = SmallRng::seed_from_u64(0);
    let err = Population::new(0, &library, &MutationConfig::default(), &mut rng).unwrap_err();
    assert_eq!(err, ConfigError::InvalidSize(0));
}

#[test]
fn test_save_load_round_trip() {
    let library = builtin::library();
    let config = MutationConfig::default();
    let mut rng = SmallRng::seed_from_u64(11);
    let population = Population::new(16, &library, &config, &mut rng).unwrap();

    let bytes = encode_population(&population, &library).unwrap();
    let loaded = decode_population(&bytes, &library).unwrap();

    assert_eq!(loaded, population);
    assert_eq!(loaded.size(), 16);
}

#[test]
fn test_bad_version_leaves_population_unchanged() {
    let library = builtin::scenario_library();
    let existing = decode_population(&IDENTITY_POPULATION, &library).unwrap();
    let snapshot = existing.clone();

    let mut bytes = IDENTITY_POPULATION;
    bytes[0] = 1;
    let err = decode_population(&bytes, &library).unwrap_err();

    assert!(matches!(err, PersistError::UnsupportedVersion(1)));
    assert_eq!(existing, snapshot);
}

#[test]
fn test_session_and_trainer_files() {
    let dir = tempdir().unwrap();
    let session_path = dir.path().join("run.strgp");
    let trainer_path = dir.path().join("cases.trn");
    let library = builtin::scenario_library();

    save_training_file(&reverse_case(), &trainer_path).unwrap();
    let set = load_training_file(&trainer_path).unwrap();
    assert_eq!(set, reverse_case());

    let mut rng = SmallRng::seed_from_u64(5);
    let population = Population::new(3, &library, &MutationConfig::default(), &mut rng).unwrap();
    let mut session = Session::new(population);
    session.generation = 42;
    save_session(&session, &library, &session_path).unwrap();

    let loaded = load_session(&library, &session_path).unwrap();
    assert_eq!(loaded, session);
}

#[test]
fn test_unknown_index_fails_on_smaller_library() {
    let full = builtin::library();
    let mut bytes = IDENTITY_POPULATION;
    let last = i32::try_from(full.len() - 1).unwrap();
    bytes[6..10].copy_from_slice(&last.to_le_bytes());

    assert!(decode_population(&bytes, &full).is_ok());
    let err = decode_population(&bytes, &builtin::scenario_library()).unwrap_err();
    assert!(matches!(err, PersistError::OperationIndexOutOfRange { .. }));
}

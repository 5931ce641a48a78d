// Allow unwrap and float comparisons in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! Strgp: evolve small programs that turn one string into another.
//!
//! This crate provides:
//! - Program trees built from a caller-supplied operation library
//! - Stochastic structural mutation
//! - A concurrent, fixed-size generation advance driven by example pairs
//! - A compact binary format for populations and training sets
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │            strgp CLI                │
//! ├─────────────────────────────────────┤
//! │     gp: population / evolution      │
//! ├─────────────────────────────────────┤
//! │   builtin operation library         │
//! └─────────────────────────────────────┘
//! ```

pub mod builtin;
pub mod error;
pub mod gp;

pub use error::{ConfigError, OperationError, PersistError, UseError};

// Re-export the core engine types at crate root for convenience
pub use gp::{ErrorBehavior, MutationConfig, OperationLibrary, Population, ProgramTree, TrainingSet};

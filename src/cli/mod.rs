//! CLI command implementations for strgp.

pub(crate) mod info;
pub(crate) mod ops;
pub(crate) mod train;
pub(crate) mod trainer;
pub(crate) mod use_session;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;

/// Output format for the `use` and `info` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<strgp::ConfigError> for CliError {
    fn from(e: strgp::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<strgp::PersistError> for CliError {
    fn from(e: strgp::PersistError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<strgp::gp::EvolutionError> for CliError {
    fn from(e: strgp::gp::EvolutionError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

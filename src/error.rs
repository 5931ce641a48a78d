//! Error types for the evolution engine.
//!
//! Errors fall into four groups:
//! - [`ConfigError`]: invalid arguments, reported immediately and never retried.
//! - [`OperationError`]: a single operation failed while a tree was running.
//! - [`UseError`]: how evaluation surfaces operation failures to the caller.
//! - [`PersistError`]: a population, session, or training stream could not be read or written.

use thiserror::Error;

/// Invalid configuration or arguments passed to the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Population size must be at least one.
    #[error("population size must be positive, got {0}")]
    InvalidSize(usize),
    /// Operation library had no operations.
    #[error("operation library must not be empty")]
    EmptyLibrary,
    /// Inputs and acceptable outputs had different lengths.
    #[error("inputs and outputs must be the same length ({inputs} inputs, {outputs} output sets)")]
    MismatchedTrainingSet {
        /// Number of inputs supplied.
        inputs: usize,
        /// Number of acceptable-output sets supplied.
        outputs: usize,
    },
    /// Training set had no cases to sample from.
    #[error("training set must contain at least one case")]
    EmptyTrainingSet,
    /// `max_tries` must be at least one.
    #[error("max tries must be at least 1")]
    ZeroMaxTries,
    /// A probability was outside `[0, 1]` or otherwise unusable.
    #[error("invalid probability for {name}: {value}")]
    InvalidProbability {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Failure raised by an operation while running a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// An argument or the input could not be parsed as a number.
    #[error("cannot parse {0:?} as a number")]
    Parse(String),
    /// A character or substring index was out of range.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: i64,
        /// Length of the indexed value.
        len: usize,
    },
    /// Numeric division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The operation needed more arguments than the node has children.
    #[error("expected at least {expected} argument(s), got {got}")]
    MissingArgument {
        /// Minimum number of arguments.
        expected: usize,
        /// Number of arguments supplied.
        got: usize,
    },
    /// A tree referenced an operation the library does not contain.
    #[error("operation {0} is not in the library")]
    UnknownOperation(usize),
    /// Any other failure, described by the operation itself.
    #[error("{0}")]
    Other(String),
}

/// Error surfaced by [`crate::gp::Population::use_on`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UseError {
    /// A tree failed and the behavior asked to stop immediately.
    #[error("an error occurred while processing the string: {0}")]
    Operation(#[source] OperationError),
    /// One or more trees failed; reported after every tree ran.
    #[error("{} tree(s) failed while processing the string", .0.len())]
    Aggregate(Vec<OperationError>),
}

/// Error reading or writing a persisted population, session, or training set.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The stream ended before a complete value was read.
    #[error("unexpected end of stream")]
    UnexpectedEof,
    /// Version marker not understood by this reader.
    #[error("unsupported format version {0:#06x}")]
    UnsupportedVersion(u16),
    /// Version marker refused on save.
    #[error("version {0:#06x} is reserved for wrapper formats")]
    ReservedVersion(u16),
    /// A decoded operation index does not exist in the supplied library.
    #[error("operation index {index} out of range for library of {len}")]
    OperationIndexOutOfRange {
        /// Index read from the stream.
        index: i32,
        /// Size of the supplied library.
        len: usize,
    },
    /// A tree refers to an operation that is not in the supplied library.
    #[error("operation {0} is not in the provided library")]
    OperationNotInLibrary(usize),
    /// A count field was negative.
    #[error("negative {what} count: {value}")]
    NegativeCount {
        /// Which count was negative.
        what: &'static str,
        /// The value read.
        value: i32,
    },
    /// A count does not fit the 32-bit on-disk representation.
    #[error("{what} count {value} does not fit in 32 bits")]
    CountOverflow {
        /// Which count overflowed.
        what: &'static str,
        /// The value that did not fit.
        value: usize,
    },
    /// Tree nesting exceeded the supported depth.
    #[error("tree nesting exceeds the maximum depth of {0}")]
    TreeTooDeep(usize),
    /// A string was not valid UTF-8.
    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// A variable-length integer prefix was malformed.
    #[error("malformed string length prefix")]
    BadLengthPrefix,
    /// The decoded value violated a construction rule.
    #[error("invalid stored data: {0}")]
    Config(#[from] ConfigError),
}

impl PersistError {
    /// Map an I/O error, turning a premature end of stream into [`PersistError::UnexpectedEof`].
    pub(crate) fn from_read(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(e)
        }
    }
}

/// Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

//! Running a population on a single input.

use crate::error::{OperationError, UseError};
use crate::gp::operation::OperationLibrary;
use crate::gp::tree::ProgramTree;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::slice;

/// What [`Uses`] does when a tree fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorBehavior {
    /// Leave failing trees out of the results.
    #[default]
    Skip,
    /// Yield one error at the first failure and stop.
    FailFast,
    /// Yield every success, then one aggregate error if anything failed.
    FailAfterAll,
    /// Yield the failure's message in place of an output.
    #[value(name = "message")]
    MessageAsOutput,
}

/// Lazy results of running each tree on one input.
///
/// Produced by [`crate::gp::Population::use_on`]. Trees run one at a time
/// as the iterator advances.
#[derive(Debug)]
pub struct Uses<'a> {
    trees: slice::Iter<'a, ProgramTree>,
    input: &'a str,
    library: &'a OperationLibrary,
    behavior: ErrorBehavior,
    errors: Vec<OperationError>,
    finished: bool,
}

impl<'a> Uses<'a> {
    pub(crate) fn new(
        trees: &'a [ProgramTree],
        input: &'a str,
        library: &'a OperationLibrary,
        behavior: ErrorBehavior,
    ) -> Self {
        Self {
            trees: trees.iter(),
            input,
            library,
            behavior,
            errors: Vec::new(),
            finished: false,
        }
    }
}

impl Iterator for Uses<'_> {
    type Item = Result<String, UseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        for tree in self.trees.by_ref() {
            match tree.run(self.input, self.library) {
                Ok(output) => return Some(Ok(output)),
                Err(e) => match self.behavior {
                    ErrorBehavior::Skip => {}
                    ErrorBehavior::FailAfterAll => self.errors.push(e),
                    ErrorBehavior::FailFast => {
                        self.finished = true;
                        return Some(Err(UseError::Operation(e)));
                    }
                    ErrorBehavior::MessageAsOutput => return Some(Ok(e.to_string())),
                },
            }
        }
        self.finished = true;
        if self.errors.is_empty() {
            None
        } else {
            Some(Err(UseError::Aggregate(std::mem::take(&mut self.errors))))
        }
    }
}

impl std::iter::FusedIterator for Uses<'_> {}

//! Structural mutation of program trees.
//!
//! One call applies a geometric number of edits. Each edit either descends
//! into a random child (more likely the bigger the subtree), collapses the
//! node back to a bottom node, grows a new bottom child, or swaps the
//! node's operation for a random one from the library.

use crate::error::ConfigError;
use crate::gp::operation::{OpRef, OperationLibrary};
use crate::gp::tree::ProgramTree;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Probabilities driving [`mutate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Chance that an edit is the last one in this call.
    pub done: f64,
    /// Chance of collapsing the chosen node to a bottom node.
    pub restart: f64,
    /// Chance of appending a new bottom child to the chosen node.
    pub expand: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            done: 0.2,
            restart: 0.002,
            expand: 0.05,
        }
    }
}

impl MutationConfig {
    /// Settings with a much rarer subtree reset.
    #[must_use]
    pub fn conservative() -> Self {
        Self {
            restart: 0.000_005,
            ..Self::default()
        }
    }

    /// Check every probability is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProbability`] if a value lies outside
    /// `[0, 1]`, or if `done` is zero (the edit loop would never end).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("done", self.done), ("restart", self.restart), ("expand", self.expand)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if self.done <= 0.0 {
            return Err(ConfigError::InvalidProbability {
                name: "done",
                value: self.done,
            });
        }
        Ok(())
    }
}

/// Mutate a tree in place, picking replacement operations from `library`.
///
/// Applies one edit, then keeps editing until a `done` draw succeeds, so
/// the number of edits is geometric with mean `1 / done`. Returns the
/// number of edits applied.
///
/// The cached size of every node on the edited path is kept equal to one
/// plus the sum of its children's sizes.
pub fn mutate<R: Rng>(
    tree: &mut ProgramTree,
    library: &OperationLibrary,
    config: &MutationConfig,
    rng: &mut R,
) -> usize {
    let mut edits = 0;
    loop {
        edit_once(tree, library, config, rng);
        edits += 1;
        if rng.gen_bool(config.done) {
            return edits;
        }
    }
}

/// Apply exactly one edit somewhere in `tree`.
fn edit_once<R: Rng>(tree: &mut ProgramTree, library: &OperationLibrary, config: &MutationConfig, rng: &mut R) {
    if rng.gen_range(0..tree.size) > 1 && !tree.children.is_empty() {
        let pick = rng.gen_range(0..tree.children.len());
        edit_once(&mut tree.children[pick], library, config, rng);
        tree.recompute_size();
    } else if rng.gen_bool(config.restart) {
        tree.op = OpRef::Identity;
        tree.children.clear();
        tree.size = 1;
    } else if rng.gen_bool(config.expand) {
        tree.children.push(ProgramTree::bottom());
        tree.size += 1;
    } else {
        tree.op = OpRef::Library(rng.gen_range(0..library.len()));
    }
}

/// A fresh tree: a bottom node mutated once.
#[must_use]
pub fn random_tree<R: Rng>(library: &OperationLibrary, config: &MutationConfig, rng: &mut R) -> ProgramTree {
    let mut tree = ProgramTree::bottom();
    mutate(&mut tree, library, config, rng);
    tree
}

//! Program tree representation.
//!
//! A tree node applies one operation to the outputs of its children, in
//! order, plus the original input. Each node caches the size of its subtree
//! so mutation can bias toward larger branches without walking them.

use crate::error::OperationError;
use crate::gp::operation::{OpRef, OperationLibrary};
use std::fmt;

/// A candidate transform from an input string to an output string.
///
/// Every node exclusively owns its children, so `Clone` is a deep copy.
#[derive(Debug, Clone)]
pub struct ProgramTree {
    pub(crate) op: OpRef,
    pub(crate) children: Vec<ProgramTree>,
    pub(crate) size: usize,
}

impl Default for ProgramTree {
    fn default() -> Self {
        Self::bottom()
    }
}

impl ProgramTree {
    /// The minimal tree: identity operation, no children.
    ///
    /// Running it returns the input unchanged.
    #[must_use]
    pub fn bottom() -> Self {
        Self {
            op: OpRef::Identity,
            children: Vec::new(),
            size: 1,
        }
    }

    /// Build a node from an operation and its children.
    #[must_use]
    pub fn new(op: OpRef, children: Vec<ProgramTree>) -> Self {
        let size = 1 + children.iter().map(|c| c.size).sum::<usize>();
        Self { op, children, size }
    }

    /// A childless node running `op`.
    #[must_use]
    pub fn leaf(op: OpRef) -> Self {
        Self::new(op, Vec::new())
    }

    /// The operation this node runs.
    #[must_use]
    pub fn op(&self) -> OpRef {
        self.op
    }

    /// Child subtrees in argument order.
    #[must_use]
    pub fn children(&self) -> &[ProgramTree] {
        &self.children
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Longest path from this node to a leaf, counting nodes.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(ProgramTree::depth).max().unwrap_or(0)
    }

    /// Recount the subtree from scratch, ignoring cached sizes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ProgramTree::node_count).sum::<usize>()
    }

    /// Whether every cached size in the subtree matches a fresh count.
    #[must_use]
    pub fn sizes_consistent(&self) -> bool {
        self.children.iter().all(ProgramTree::sizes_consistent)
            && self.size == 1 + self.children.iter().map(|c| c.size).sum::<usize>()
    }

    /// Recompute this node's size from its children's cached sizes.
    pub(crate) fn recompute_size(&mut self) {
        self.size = 1 + self.children.iter().map(|c| c.size).sum::<usize>();
    }

    /// Run the tree on `input`.
    ///
    /// Children run first, in order, and their outputs become this node's
    /// arguments. The first failure anywhere in the tree is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns the first [`OperationError`] raised by any node.
    pub fn run(&self, input: &str, library: &OperationLibrary) -> Result<String, OperationError> {
        let args = self
            .children
            .iter()
            .map(|child| child.run(input, library))
            .collect::<Result<Vec<_>, _>>()?;
        library.invoke(self.op, &args, input)
    }

    /// Render the tree as an s-expression using operation names.
    #[must_use]
    pub fn display<'a>(&'a self, library: &'a OperationLibrary) -> TreeDisplay<'a> {
        TreeDisplay { tree: self, library }
    }
}

/// Structural equality: same cached size, same operation, and the children
/// match as a multiset. Child order does not matter.
impl PartialEq for ProgramTree {
    fn eq(&self, other: &Self) -> bool {
        if self.size != other.size || self.op != other.op {
            return false;
        }
        multiset_eq(&self.children, &other.children)
    }
}

impl Eq for ProgramTree {}

/// Greedy match-and-remove comparison of two collections.
///
/// Every element of `theirs` must equal some not-yet-matched element of
/// `ours`. Lengths are compared first so leftovers on either side fail.
pub(crate) fn multiset_eq<T: PartialEq>(ours: &[T], theirs: &[T]) -> bool {
    if ours.len() != theirs.len() {
        return false;
    }
    let mut unmatched: Vec<&T> = ours.iter().collect();
    for item in theirs {
        match unmatched.iter().position(|candidate| *candidate == item) {
            Some(i) => {
                unmatched.swap_remove(i);
            }
            None => return false,
        }
    }
    true
}

/// Formatter returned by [`ProgramTree::display`].
#[derive(Debug, Clone, Copy)]
pub struct TreeDisplay<'a> {
    tree: &'a ProgramTree,
    library: &'a OperationLibrary,
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.library.name_of(self.tree.op);
        if self.tree.children.is_empty() {
            return write!(f, "{name}");
        }
        write!(f, "({name}")?;
        for child in &self.tree.children {
            write!(f, " {}", child.display(self.library))?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::operation::Operation;

    fn library() -> OperationLibrary {
        OperationLibrary::new(vec![
            Operation::infallible("concat", |args, input| {
                if args.is_empty() { input.to_owned() } else { args.concat() }
            }),
            Operation::infallible("upper", |_, input| input.to_uppercase()),
            Operation::new("fail", |_, _| Err(OperationError::DivisionByZero)),
        ])
        .unwrap()
    }

    #[test]
    fn test_bottom_runs_identity() {
        let tree = ProgramTree::bottom();
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.run("x", &library()).unwrap(), "x");
    }

    #[test]
    fn test_children_become_arguments_in_order() {
        let tree = ProgramTree::new(
            OpRef::Library(0),
            vec![ProgramTree::leaf(OpRef::Library(1)), ProgramTree::bottom()],
        );
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.run("ab", &library()).unwrap(), "ABab");
    }

    #[test]
    fn test_child_failure_propagates() {
        let tree = ProgramTree::new(
            OpRef::Library(1),
            vec![ProgramTree::bottom(), ProgramTree::leaf(OpRef::Library(2))],
        );
        assert_eq!(tree.run("ab", &library()), Err(OperationError::DivisionByZero));
    }

    #[test]
    fn test_swapped_children_are_equal() {
        let a = ProgramTree::new(
            OpRef::Library(0),
            vec![ProgramTree::leaf(OpRef::Library(1)), ProgramTree::bottom()],
        );
        let b = ProgramTree::new(
            OpRef::Library(0),
            vec![ProgramTree::bottom(), ProgramTree::leaf(OpRef::Library(1))],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_child_counts_are_unequal() {
        let a = ProgramTree::new(OpRef::Library(0), vec![ProgramTree::bottom()]);
        let b = ProgramTree::new(
            OpRef::Library(0),
            vec![ProgramTree::bottom(), ProgramTree::bottom()],
        );
        assert_ne!(a, b);
        assert_ne!(b, a);
    }

    #[test]
    fn test_different_operation_is_unequal() {
        let a = ProgramTree::leaf(OpRef::Library(0));
        let b = ProgramTree::leaf(OpRef::Library(1));
        assert_ne!(a, b);
        assert_ne!(ProgramTree::bottom(), a);
    }

    #[test]
    fn test_duplicate_children_must_match_one_to_one() {
        let up = ProgramTree::leaf(OpRef::Library(1));
        let a = ProgramTree::new(OpRef::Library(0), vec![up.clone(), up.clone()]);
        let b = ProgramTree::new(OpRef::Library(0), vec![up, ProgramTree::bottom()]);
        assert_ne!(a, b);
        assert_ne!(b, a);
    }

    #[test]
    fn test_depth_and_node_count() {
        let tree = ProgramTree::new(
            OpRef::Library(0),
            vec![
                ProgramTree::new(OpRef::Library(1), vec![ProgramTree::bottom()]),
                ProgramTree::bottom(),
            ],
        );
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node_count(), 4);
        assert!(tree.sizes_consistent());
    }

    #[test]
    fn test_display_uses_names() {
        let tree = ProgramTree::new(
            OpRef::Library(0),
            vec![ProgramTree::leaf(OpRef::Library(1)), ProgramTree::bottom()],
        );
        assert_eq!(tree.display(&library()).to_string(), "(concat upper identity)");
    }
}

//! Operations and the library trees draw them from.
//!
//! Trees never hold an operation directly. Each node stores an [`OpRef`],
//! which is either the fixed identity operation used by bottom nodes or an
//! index into an [`OperationLibrary`]. The same library, in the same order,
//! must be supplied to mutation, execution, save, and load.

use crate::error::{ConfigError, OperationError};
use std::fmt;
use std::sync::Arc;

/// Signature shared by every operation: ordered child outputs plus the original input.
pub type OperationFn = dyn Fn(&[String], &str) -> Result<String, OperationError> + Send + Sync;

/// A named, pure operation a tree node may invoke.
///
/// Operations must not keep state between calls. Trees are run concurrently
/// and repeatedly during training, so any hidden state would make fitness
/// depend on scheduling.
#[derive(Clone)]
pub struct Operation {
    name: Arc<str>,
    func: Arc<OperationFn>,
}

impl Operation {
    /// Create an operation from a name and a function.
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[String], &str) -> Result<String, OperationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Create an operation that never fails.
    pub fn infallible<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[String], &str) -> String + Send + Sync + 'static,
    {
        Self::new(name, move |args, input| Ok(func(args, input)))
    }

    /// The operation's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the operation.
    ///
    /// # Errors
    ///
    /// Returns whatever failure the operation declares.
    pub fn call(&self, args: &[String], input: &str) -> Result<String, OperationError> {
        (self.func)(args, input)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Reference from a tree node to the operation it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpRef {
    /// The bottom-node operation: returns the input unchanged.
    Identity,
    /// An operation in the library, by position.
    Library(usize),
}

/// An ordered, non-empty list of operations.
///
/// Cloning is cheap; operations are shared.
#[derive(Debug, Clone)]
pub struct OperationLibrary {
    ops: Vec<Operation>,
}

impl OperationLibrary {
    /// Build a library from an ordered list of operations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyLibrary`] if `ops` is empty.
    pub fn new(ops: Vec<Operation>) -> Result<Self, ConfigError> {
        if ops.is_empty() {
            return Err(ConfigError::EmptyLibrary);
        }
        Ok(Self { ops })
    }

    /// Build a library from a list known to be non-empty.
    pub(crate) fn from_nonempty(ops: Vec<Operation>) -> Self {
        debug_assert!(!ops.is_empty());
        Self { ops }
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operation at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Operation> {
        self.ops.get(index)
    }

    /// Iterate operations in library order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.ops.iter()
    }

    /// Index of the first operation with the given name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.ops.iter().position(|op| op.name() == name)
    }

    /// Run the referenced operation.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::UnknownOperation`] if `op` indexes past the
    /// end of the library, or the operation's own failure.
    pub fn invoke(&self, op: OpRef, args: &[String], input: &str) -> Result<String, OperationError> {
        match op {
            OpRef::Identity => Ok(input.to_owned()),
            OpRef::Library(index) => self
                .ops
                .get(index)
                .ok_or(OperationError::UnknownOperation(index))?
                .call(args, input),
        }
    }

    /// Human-readable name for a reference.
    #[must_use]
    pub fn name_of(&self, op: OpRef) -> &str {
        match op {
            OpRef::Identity => "identity",
            OpRef::Library(index) => self.ops.get(index).map_or("<unknown>", Operation::name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> Operation {
        Operation::infallible("upper", |_, input| input.to_uppercase())
    }

    #[test]
    fn test_empty_library_rejected() {
        assert_eq!(OperationLibrary::new(Vec::new()).unwrap_err(), ConfigError::EmptyLibrary);
    }

    #[test]
    fn test_invoke_identity_ignores_args() {
        let library = OperationLibrary::new(vec![upper()]).unwrap();
        let out = library.invoke(OpRef::Identity, &["zz".to_owned()], "abc").unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_invoke_library_operation() {
        let library = OperationLibrary::new(vec![upper()]).unwrap();
        assert_eq!(library.invoke(OpRef::Library(0), &[], "abc").unwrap(), "ABC");
    }

    #[test]
    fn test_invoke_unknown_index_fails() {
        let library = OperationLibrary::new(vec![upper()]).unwrap();
        assert_eq!(
            library.invoke(OpRef::Library(3), &[], "abc"),
            Err(OperationError::UnknownOperation(3))
        );
    }

    #[test]
    fn test_position_returns_first_match() {
        let library = OperationLibrary::new(vec![upper(), upper()]).unwrap();
        assert_eq!(library.position("upper"), Some(0));
        assert_eq!(library.position("lower"), None);
    }

    #[test]
    fn test_name_of() {
        let library = OperationLibrary::new(vec![upper()]).unwrap();
        assert_eq!(library.name_of(OpRef::Identity), "identity");
        assert_eq!(library.name_of(OpRef::Library(0)), "upper");
        assert_eq!(library.name_of(OpRef::Library(9)), "<unknown>");
    }
}

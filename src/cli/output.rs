//! Output formatting utilities for CLI.

use serde::Serialize;
use strgp::gp::{OperationLibrary, Session};

/// JSON-serializable summary of a saved session.
#[derive(Debug, Serialize)]
pub(super) struct JsonSession {
    /// Generations trained so far.
    pub(super) generation: u32,
    /// Population size.
    pub(super) size: usize,
    /// Per-tree details, in stored order.
    pub(super) trees: Vec<JsonTree>,
}

/// JSON-serializable tree summary.
#[derive(Debug, Serialize)]
pub(super) struct JsonTree {
    /// Node count.
    pub(super) size: usize,
    /// Longest root-to-leaf path.
    pub(super) depth: usize,
    /// S-expression rendering.
    pub(super) expr: String,
}

impl JsonSession {
    /// Build from a session.
    pub(super) fn from_session(session: &Session, library: &OperationLibrary) -> Self {
        Self {
            generation: session.generation,
            size: session.population.size(),
            trees: session
                .population
                .trees()
                .iter()
                .map(|tree| JsonTree {
                    size: tree.size(),
                    depth: tree.depth(),
                    expr: tree.display(library).to_string(),
                })
                .collect(),
        }
    }
}

/// JSON-serializable result of running a session on one input.
#[derive(Debug, Serialize)]
pub(super) struct JsonUse<'a> {
    /// The processed text.
    pub(super) input: &'a str,
    /// Outputs from trees that produced one.
    pub(super) outputs: Vec<String>,
    /// Error messages, if any were reported.
    pub(super) errors: Vec<String>,
}

/// Format a session summary as human-readable text.
pub(super) fn format_session_text(session: &Session, library: &OperationLibrary, show_trees: bool) -> String {
    let population = &session.population;
    let sizes: Vec<usize> = population.trees().iter().map(|t| t.size()).collect();
    let total: usize = sizes.iter().sum();
    let largest = sizes.iter().copied().max().unwrap_or(0);

    let mut output = String::new();
    output.push_str(&format!("Generation: {}\n", session.generation));
    output.push_str(&format!("Population size: {}\n", population.size()));
    output.push_str(&format!("Total nodes: {total} (largest tree: {largest})\n"));
    if show_trees {
        output.push('\n');
        for (i, tree) in population.trees().iter().enumerate() {
            output.push_str(&format!("  [{i:>3}] {}\n", tree.display(library)));
        }
    }
    output
}

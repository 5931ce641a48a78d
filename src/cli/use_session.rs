//! Run a saved session on one piece of text.

use super::output::JsonUse;
use super::{CliError, OutputFormat};
use std::path::Path;
use strgp::builtin;
use strgp::gp::{load_session, ErrorBehavior};
use strgp::UseError;

/// Execute the use command.
///
/// Outputs are printed as they are produced. Under `fail-fast` and
/// `fail-after-all` a reported failure makes the command fail after the
/// outputs seen so far have been printed.
///
/// # Errors
///
/// Returns an error if the session cannot be loaded, or a tree failure is
/// reported under a failing error behavior.
pub(crate) fn execute(
    session: &Path,
    text: &str,
    errors: ErrorBehavior,
    format: OutputFormat,
) -> Result<(), CliError> {
    let library = builtin::library();
    let loaded = load_session(&library, session)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", session.display())))?;

    let mut outputs = Vec::new();
    let mut failure: Option<UseError> = None;
    for result in loaded.population.use_on(text, &library, errors) {
        match result {
            Ok(output) => {
                if format == OutputFormat::Text {
                    println!("R: {output}");
                }
                outputs.push(output);
            }
            Err(e) => failure = Some(e),
        }
    }

    if format == OutputFormat::Json {
        let errors = match &failure {
            Some(UseError::Aggregate(all)) => all.iter().map(ToString::to_string).collect(),
            Some(e) => vec![e.to_string()],
            None => Vec::new(),
        };
        let json = JsonUse {
            input: text,
            outputs,
            errors,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    }

    match failure {
        Some(UseError::Aggregate(all)) if format == OutputFormat::Text => {
            for e in &all {
                eprintln!("  {e}");
            }
            Err(CliError::new(UseError::Aggregate(all).to_string()))
        }
        Some(e) => Err(CliError::new(e.to_string())),
        None => Ok(()),
    }
}

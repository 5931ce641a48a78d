//! Session inspection command.

use super::output::{format_session_text, JsonSession};
use super::{CliError, OutputFormat};
use std::path::Path;
use strgp::builtin;
use strgp::gp::load_session;

/// Execute the info command.
///
/// # Errors
///
/// Returns an error if the session cannot be loaded.
pub(crate) fn execute(session: &Path, trees: bool, format: OutputFormat) -> Result<(), CliError> {
    let library = builtin::library();
    let loaded = load_session(&library, session)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", session.display())))?;

    match format {
        OutputFormat::Text => print!("{}", format_session_text(&loaded, &library, trees)),
        OutputFormat::Json => {
            let json = JsonSession::from_session(&loaded, &library);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

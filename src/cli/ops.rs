//! List the built-in operation library.

use super::CliError;
use strgp::builtin;

/// Execute the ops command.
///
/// # Errors
///
/// Never fails; returns `Result` for uniformity with other commands.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn execute() -> Result<(), CliError> {
    let library = builtin::library();
    println!("{} operations (index: name)", library.len());
    for (i, op) in library.iter().enumerate() {
        println!("  {i:>3}: {}", op.name());
    }
    Ok(())
}

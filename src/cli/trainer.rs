//! Build a training file from `INPUT=OUT1|OUT2` case strings.

use super::CliError;
use std::path::Path;
use strgp::gp::{save_training_file, TrainingCase, TrainingSet};

/// Parse one `INPUT=OUT1|OUT2` case.
///
/// The input runs up to the first `=`; the outputs are split on `|`.
fn parse_case(text: &str) -> Result<TrainingCase, CliError> {
    let (input, outputs) = text
        .split_once('=')
        .ok_or_else(|| CliError::new(format!("Case {text:?} is missing '=' (expected INPUT=OUT1|OUT2)")))?;
    Ok(TrainingCase::new(input, outputs.split('|')))
}

/// Execute the make-trainer command.
///
/// # Errors
///
/// Returns an error if a case is malformed, no cases are given, or the
/// file cannot be written.
pub(crate) fn execute(output: &Path, cases: &[String]) -> Result<(), CliError> {
    let cases = cases.iter().map(|c| parse_case(c)).collect::<Result<Vec<_>, _>>()?;
    let set = TrainingSet::new(cases)?;
    save_training_file(&set, output)?;
    println!("Wrote {} cases to {}", set.len(), output.display());
    Ok(())
}

//! Training cases: inputs paired with the outputs counted as correct.

use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One input and every output accepted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCase {
    /// String fed to the tree.
    pub input: String,
    /// Outputs that count as a match.
    pub acceptable: Vec<String>,
}

impl TrainingCase {
    /// Create a case.
    pub fn new<I, S>(input: impl Into<String>, acceptable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: input.into(),
            acceptable: acceptable.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `output` exactly equals one of the acceptable outputs.
    #[must_use]
    pub fn accepts(&self, output: &str) -> bool {
        self.acceptable.iter().any(|a| a == output)
    }
}

/// An ordered, non-empty sequence of training cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSet {
    cases: Vec<TrainingCase>,
}

impl TrainingSet {
    /// Build a set from cases.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyTrainingSet`] if there are no cases.
    pub fn new(cases: Vec<TrainingCase>) -> Result<Self, ConfigError> {
        if cases.is_empty() {
            return Err(ConfigError::EmptyTrainingSet);
        }
        Ok(Self { cases })
    }

    /// Build a set from parallel arrays of inputs and acceptable outputs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MismatchedTrainingSet`] if the lengths differ,
    /// or [`ConfigError::EmptyTrainingSet`] if both are empty.
    pub fn from_parallel(inputs: Vec<String>, outputs: Vec<Vec<String>>) -> Result<Self, ConfigError> {
        if inputs.len() != outputs.len() {
            return Err(ConfigError::MismatchedTrainingSet {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        let cases = inputs
            .into_iter()
            .zip(outputs)
            .map(|(input, acceptable)| TrainingCase { input, acceptable })
            .collect();
        Self::new(cases)
    }

    /// Cases in order.
    #[must_use]
    pub fn cases(&self) -> &[TrainingCase] {
        &self.cases
    }

    /// Number of cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Always false for a constructed set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// A uniformly random case.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &TrainingCase {
        &self.cases[rng.gen_range(0..self.cases.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = TrainingSet::from_parallel(vec!["a".into(), "b".into()], vec![vec!["A".into()]]).unwrap_err();
        assert_eq!(err, ConfigError::MismatchedTrainingSet { inputs: 2, outputs: 1 });
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(TrainingSet::new(Vec::new()).unwrap_err(), ConfigError::EmptyTrainingSet);
        assert_eq!(
            TrainingSet::from_parallel(Vec::new(), Vec::new()).unwrap_err(),
            ConfigError::EmptyTrainingSet
        );
    }

    #[test]
    fn test_accepts_exact_match_only() {
        let case = TrainingCase::new("ab", ["BA", "ba"]);
        assert!(case.accepts("BA"));
        assert!(case.accepts("ba"));
        assert!(!case.accepts("Ba"));
        assert!(!case.accepts("BA "));
    }

    #[test]
    fn test_sample_stays_in_set() {
        let mut rng = SmallRng::seed_from_u64(1);
        let set = TrainingSet::new(vec![TrainingCase::new("a", ["A"]), TrainingCase::new("b", ["B"])]).unwrap();
        for _ in 0..50 {
            assert!(set.cases().contains(set.sample(&mut rng)));
        }
    }
}

//! Field classifier.
//!
//! Compiles a pattern table once and assigns located candidates to
//! categories by unanchored, case-insensitive regex search.

use regex::{Regex, RegexBuilder};

use crate::error::{AppError, Result};
use crate::models::{CandidateField, Classification, FieldCategory, PatternTable};

/// A compiled pattern table.
pub struct FieldClassifier {
    rules: Vec<(FieldCategory, Vec<Regex>)>,
}

impl FieldClassifier {
    /// Compile every pattern of the table.
    pub fn new(table: &PatternTable) -> Result<Self> {
        let rules = table
            .iter()
            .map(|(category, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|pattern| {
                        RegexBuilder::new(pattern)
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| AppError::pattern(pattern, e))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok((category, compiled))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Categories whose patterns match a signature, in priority order.
    pub fn matches(&self, signature: &str) -> Vec<FieldCategory> {
        self.rules
            .iter()
            .filter(|(_, patterns)| patterns.iter().any(|re| re.is_match(signature)))
            .map(|(category, _)| *category)
            .collect()
    }

    /// Assign each candidate to every category it matches.
    pub fn classify(&self, candidates: &[CandidateField]) -> Classification {
        let mut classification = Classification::default();
        for candidate in candidates {
            for category in self.matches(&candidate.signature) {
                log::debug!(
                    "Control {} matched {} ('{}')",
                    candidate.control,
                    category,
                    candidate.signature.trim()
                );
                classification.assign(category, candidate.clone());
            }
        }
        classification
    }
}

/// Compile `table` and classify `candidates` in one step.
pub fn classify(candidates: &[CandidateField], table: &PatternTable) -> Result<Classification> {
    Ok(FieldClassifier::new(table)?.classify(candidates))
}

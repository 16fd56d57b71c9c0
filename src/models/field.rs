//! Located form fields and their category assignments.

use std::collections::BTreeMap;

use crate::document::{ControlId, ControlKindTag};
use crate::models::FieldCategory;

/// A located control paired with its lower-cased signature text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateField {
    pub control: ControlId,
    pub kind: ControlKindTag,
    pub signature: String,
}

/// Category -> candidates, iterated in category priority order.
///
/// Within a category candidates keep document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    assignments: BTreeMap<FieldCategory, Vec<CandidateField>>,
}

impl Classification {
    /// Assign a candidate to a category.
    pub fn assign(&mut self, category: FieldCategory, candidate: CandidateField) {
        self.assignments.entry(category).or_default().push(candidate);
    }

    /// Candidates assigned to a category.
    pub fn get(&self, category: FieldCategory) -> &[CandidateField] {
        self.assignments
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Categories and candidates, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldCategory, &[CandidateField])> {
        self.assignments
            .iter()
            .map(|(category, candidates)| (*category, candidates.as_slice()))
    }

    /// Every category a control landed in.
    pub fn categories_for(&self, control: ControlId) -> Vec<FieldCategory> {
        self.iter()
            .filter(|(_, candidates)| candidates.iter().any(|c| c.control == control))
            .map(|(category, _)| category)
            .collect()
    }

    /// Number of categories with at least one candidate.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

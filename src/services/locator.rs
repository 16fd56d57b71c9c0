//! Field locator.
//!
//! Snapshots the fillable controls of a document and builds the signature
//! text the classifier matches against.

use crate::document::{FormControl, FormDocument};
use crate::models::CandidateField;

/// Locate every fillable control in the document, in document order.
///
/// Pure read: later DOM changes are not observed.
pub fn locate<D: FormDocument + ?Sized>(document: &D) -> Vec<CandidateField> {
    let candidates: Vec<CandidateField> = document
        .controls()
        .into_iter()
        .map(|control| CandidateField {
            control: control.id,
            kind: control.kind.tag(),
            signature: signature(control),
        })
        .collect();

    log::debug!("Located {} candidate fields", candidates.len());
    candidates
}

/// Lower-cased `name id formcontrolname placeholder aria-label label`.
pub fn signature(control: &FormControl) -> String {
    let attrs = &control.attributes;
    [
        attrs.name.as_deref(),
        attrs.id.as_deref(),
        attrs.form_control_name.as_deref(),
        attrs.placeholder.as_deref(),
        attrs.aria_label.as_deref(),
        Some(control.label.as_str()),
    ]
    .map(Option::unwrap_or_default)
    .join(" ")
    .to_lowercase()
}

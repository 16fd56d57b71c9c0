//! Service layer for the fill engine.
//!
//! This module contains the three fill stages:
//! - Field location (`locate`)
//! - Field classification (`FieldClassifier`)
//! - Fill execution (`FillExecutor`)

mod classifier;
mod executor;
mod locator;

pub use classifier::{FieldClassifier, classify};
pub use executor::{CancelFlag, FillExecutor, SkipReason, check_eligibility, match_option};
pub use locator::{locate, signature};

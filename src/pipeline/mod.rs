//! Pipeline entry points for fill operations.
//!
//! - `run_autofill`: Locate, classify and fill one document
//! - `AutofillSession`: Manual and page-load triggers
//! - `dispatch_report`: Record history and notify after a pass

pub mod dispatch;
pub mod run;

pub use dispatch::dispatch_report;
pub use run::{AutofillSession, DEFAULT_SETTLE_DELAY, RunGate, RunPermit, run_autofill};

//! Fill pass results and history records.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::FieldCategory;

/// Overall outcome of a fill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStatus {
    Success,
    Partial,
    Error,
}

impl FillStatus {
    /// Derive the status from the pass counters.
    pub fn derive(filled_count: usize, failed_count: usize) -> Self {
        if filled_count == 0 {
            FillStatus::Error
        } else if failed_count > 0 {
            FillStatus::Partial
        } else {
            FillStatus::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FillStatus::Success => "success",
            FillStatus::Partial => "partial",
            FillStatus::Error => "error",
        }
    }
}

impl fmt::Display for FillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result handed back to whoever triggered the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReport {
    pub status: FillStatus,
    pub filled_count: usize,
    /// Categories with at least one failed write, each listed once
    pub failed_fields: Vec<FieldCategory>,
    pub message: String,
}

impl FillReport {
    /// Build the report from the pass counters.
    pub fn new(filled_count: usize, failed_fields: Vec<FieldCategory>, cancelled: bool) -> Self {
        let status = FillStatus::derive(filled_count, failed_fields.len());
        let mut message = match status {
            FillStatus::Error => "No fields could be filled".to_string(),
            FillStatus::Partial => format!(
                "{} fields filled, {} failed: {}",
                filled_count,
                failed_fields.len(),
                failed_fields
                    .iter()
                    .map(|c| c.key())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            FillStatus::Success => format!("{} fields filled successfully", filled_count),
        };
        if cancelled {
            message.push_str(" (cancelled)");
        }

        Self {
            status,
            filled_count,
            failed_fields,
            message,
        }
    }
}

/// One entry of the fill history, newest entries first in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub domain: String,
    pub filled_count: usize,
    pub status: FillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HistoryItem {
    /// Record a finished pass on the given domain, stamped now.
    pub fn from_report(report: &FillReport, domain: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            domain: domain.into(),
            filled_count: report.filled_count,
            status: report.status,
            message: Some(report.message.clone()),
        }
    }
}

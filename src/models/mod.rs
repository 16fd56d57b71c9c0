// src/models/mod.rs

//! Domain models for the autofill engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod category;
mod config;
mod field;
mod patterns;
mod profile;
mod report;

// Re-export all public types
pub use category::FieldCategory;
pub use config::{
    Config, EngineConfig, FetchConfig, LoggingConfig, MAX_FILL_DELAY_MS, Settings,
};
pub use field::{CandidateField, Classification};
pub use patterns::{ADVANCED_PROFILE, MappingProfiles, PatternTable, STANDARD_PROFILE};
pub use profile::UserProfile;
pub use report::{FillReport, FillStatus, HistoryItem};

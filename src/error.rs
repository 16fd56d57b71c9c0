// src/error.rs

//! Unified error handling for the autofill engine.

use std::fmt;

use thiserror::Error;

use crate::document::ControlId;

/// Result type alias for autofill operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[cfg(feature = "fetch")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Field pattern failed to compile
    #[error("Invalid field pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The master switch in settings is off
    #[error("Autofill is disabled")]
    Disabled,

    /// No profile has been saved yet
    #[error("No user data found")]
    MissingProfile,

    /// The control was removed from the document
    #[error("Control {0} is no longer attached to the document")]
    Detached(ControlId),

    /// Another fill pass is still running on this document
    #[error("An autofill run is already in progress")]
    RunInProgress,
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a pattern compilation error.
    pub fn pattern(pattern: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the caller can recover by fixing settings or the profile.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Disabled | Self::MissingProfile)
    }
}

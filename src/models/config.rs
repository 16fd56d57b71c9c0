//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{MappingProfiles, PatternTable};

/// Upper bound for the per-field pacing delay in milliseconds.
pub const MAX_FILL_DELAY_MS: u64 = 1000;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fill behavior settings
    #[serde(default)]
    pub settings: Settings,

    /// Trigger and history settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// HTTP settings for fetching pages by URL
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Custom mapping profiles: profile name -> category -> comma-separated patterns
    #[serde(default)]
    pub mappings: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, using defaults only when the file is absent.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_if_exists(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Build the mapping profiles from the built-ins plus custom tables.
    pub fn mapping_profiles(&self) -> Result<MappingProfiles> {
        let mut profiles = MappingProfiles::default();
        for (name, text) in &self.mappings {
            profiles.insert_custom(name, PatternTable::from_text(text)?);
        }
        Ok(profiles)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.settings.mapping_profile.trim().is_empty() {
            return Err(AppError::validation("settings.mappingProfile is empty"));
        }
        if self.settings.fill_delay > MAX_FILL_DELAY_MS {
            log::warn!(
                "settings.fillDelay {} exceeds {}ms and will be clamped",
                self.settings.fill_delay,
                MAX_FILL_DELAY_MS
            );
        }
        if self.engine.history_limit == 0 {
            return Err(AppError::validation("engine.history_limit must be > 0"));
        }
        if self.engine.history_file.trim().is_empty() {
            return Err(AppError::validation("engine.history_file is empty"));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }

        let profiles = self.mapping_profiles()?;
        if !profiles.contains(&self.settings.mapping_profile) {
            return Err(AppError::validation(format!(
                "Unknown mapping profile: {}",
                self.settings.mapping_profile
            )));
        }
        profiles.validate()?;
        Ok(())
    }
}

/// Fill behavior settings, read once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Master switch
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Fill automatically once the page has loaded
    #[serde(default)]
    pub auto_fill_on_load: bool,

    /// Ask the notifier to announce finished runs
    #[serde(default = "defaults::show_fill_notification")]
    pub show_fill_notification: bool,

    /// Leave controls that already hold a value untouched
    #[serde(default = "defaults::fill_only_empty")]
    pub fill_only_empty: bool,

    /// Pause before each write in milliseconds
    #[serde(default = "defaults::fill_delay")]
    pub fill_delay: u64,

    /// Name of the pattern table used for classification
    #[serde(default = "defaults::mapping_profile")]
    pub mapping_profile: String,

    /// Record each run in the history store
    #[serde(default = "defaults::track_history")]
    pub track_history: bool,
}

impl Settings {
    /// Pacing delay, clamped to `MAX_FILL_DELAY_MS`.
    pub fn fill_delay(&self) -> Duration {
        Duration::from_millis(self.fill_delay.min(MAX_FILL_DELAY_MS))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            auto_fill_on_load: false,
            show_fill_notification: defaults::show_fill_notification(),
            fill_only_empty: defaults::fill_only_empty(),
            fill_delay: defaults::fill_delay(),
            mapping_profile: defaults::mapping_profile(),
            track_history: defaults::track_history(),
        }
    }
}

/// Trigger and history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Wait after page load before the first scan, so scripted forms can render
    #[serde(default = "defaults::settle_delay")]
    pub settle_delay_ms: u64,

    /// Number of history entries kept, newest first
    #[serde(default = "defaults::history_limit")]
    pub history_limit: usize,

    /// History file name inside the storage directory
    #[serde(default = "defaults::history_file")]
    pub history_file: String,
}

impl EngineConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: defaults::settle_delay(),
            history_limit: defaults::history_limit(),
            history_file: defaults::history_file(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use crate::models::STANDARD_PROFILE;

    // Settings defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn show_fill_notification() -> bool {
        true
    }
    pub fn fill_only_empty() -> bool {
        true
    }
    pub fn fill_delay() -> u64 {
        200
    }
    pub fn mapping_profile() -> String {
        STANDARD_PROFILE.into()
    }
    pub fn track_history() -> bool {
        true
    }

    // Engine defaults
    pub fn settle_delay() -> u64 {
        1000
    }
    pub fn history_limit() -> usize {
        50
    }
    pub fn history_file() -> String {
        "history.json".into()
    }

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; autofill/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_settings_match_stored_defaults() {
        let settings = Settings::default();
        assert!(settings.enabled);
        assert!(!settings.auto_fill_on_load);
        assert!(settings.show_fill_notification);
        assert!(settings.fill_only_empty);
        assert_eq!(settings.fill_delay, 200);
        assert_eq!(settings.mapping_profile, "standard");
        assert!(settings.track_history);
    }

    #[test]
    fn partial_settings_take_defaults() {
        let config: Config = toml::from_str(
            r#"
            [settings]
            fillOnlyEmpty = false
            fillDelay = 0
            "#,
        )
        .unwrap();
        assert!(!config.settings.fill_only_empty);
        assert_eq!(config.settings.fill_delay, 0);
        assert!(config.settings.enabled);
        assert_eq!(config.engine.history_limit, 50);
    }

    #[test]
    fn fill_delay_is_clamped() {
        let settings = Settings {
            fill_delay: 5000,
            ..Settings::default()
        };
        assert_eq!(settings.fill_delay(), Duration::from_millis(MAX_FILL_DELAY_MS));
    }

    #[test]
    fn validate_accepts_oversized_delay() {
        let mut config = Config::default();
        config.settings.fill_delay = 1500;
        assert!(config.validate().is_ok());
        assert_eq!(
            config.settings.fill_delay(),
            Duration::from_millis(MAX_FILL_DELAY_MS)
        );
    }

    #[test]
    fn validate_rejects_unknown_mapping_profile() {
        let mut config = Config::default();
        config.settings.mapping_profile = "mystery".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_custom_mapping_profile() {
        let config: Config = toml::from_str(
            r#"
            [settings]
            mappingProfile = "work"

            [mappings.work]
            email = "work.*mail, corp-email"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_custom_pattern() {
        let config: Config = toml::from_str(
            r#"
            [mappings.broken]
            email = "(unclosed"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}

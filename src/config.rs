// src/config.rs

//! Configuration loading utilities.
//!
//! This module provides convenience functions for loading the config and
//! the user profile from a storage directory.

use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{Config, UserProfile};

/// Config file name inside the storage directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Profile file names, in lookup order.
pub const PROFILE_FILES: [&str; 2] = ["profile.toml", "profile.json"];

/// Load configuration from `{storage_dir}/config.toml`.
///
/// A missing file yields defaults. A file that fails to parse is an error,
/// never a silent fallback.
pub fn load_config(storage_dir: &Path) -> Result<Config> {
    let path = config_path(storage_dir);
    Config::load_if_exists(&path)
        .map_err(|e| AppError::config(format!("Failed to load {}: {e}", path.display())))
}

/// Path of the config file in a storage directory.
pub fn config_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join(CONFIG_FILE)
}

/// Load the saved profile, if one exists.
///
/// A missing profile is `None`; a profile that exists but fails to parse is
/// an error.
pub fn load_profile(storage_dir: &Path) -> Result<Option<UserProfile>> {
    match profile_path(storage_dir) {
        Some(path) => {
            log::debug!("Loading profile from {}", path.display());
            Ok(Some(UserProfile::load(&path)?))
        }
        None => Ok(None),
    }
}

/// First existing profile file in the storage directory.
pub fn profile_path(storage_dir: &Path) -> Option<PathBuf> {
    PROFILE_FILES
        .iter()
        .map(|name| storage_dir.join(name))
        .find(|path| path.is_file())
}

/// Path of the history file configured for this storage directory.
pub fn history_path(config: &Config, storage_dir: &Path) -> PathBuf {
    storage_dir.join(&config.engine.history_file)
}

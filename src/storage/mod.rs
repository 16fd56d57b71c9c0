//! Storage abstractions for fill history.
//!
//! History is a single JSON array, newest entry first, capped at a fixed
//! number of entries:
//!
//! ```text
//! {storage_dir}/
//! ├── config.toml           # Settings and custom mapping profiles
//! ├── profile.toml          # The user's profile
//! └── history.json          # Fill history (newest first)
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::HistoryItem;

// Re-export for convenience
pub use local::LocalHistoryStore;

/// Trait for history storage backends.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Prepend an item, dropping the oldest entries past the cap.
    async fn append(&self, item: HistoryItem) -> Result<()>;

    /// Load all items, newest first.
    async fn load(&self) -> Result<Vec<HistoryItem>>;

    /// Remove every item.
    async fn clear(&self) -> Result<()>;
}

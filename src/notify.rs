// src/notify.rs

//! User-visible notifications for finished fill passes.

use async_trait::async_trait;

use crate::error::Result;

/// Title used for fill completion notices.
pub const FILL_COMPLETE_TITLE: &str = "AutoFill Complete";

/// Delivers a short message to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str) -> Result<()>;
}

/// Notifier that writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<()> {
        log::info!("[{}] {}", title, message);
        Ok(())
    }
}

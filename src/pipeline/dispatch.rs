// src/pipeline/dispatch.rs

//! Post-run side effects: history and completion notice.

use crate::models::{FillReport, HistoryItem, Settings};
use crate::notify::{FILL_COMPLETE_TITLE, Notifier};
use crate::storage::HistoryStore;

/// Record and announce a finished fill pass.
///
/// Failures are logged and never affect the report.
pub async fn dispatch_report(
    report: &FillReport,
    settings: &Settings,
    domain: &str,
    history: &dyn HistoryStore,
    notifier: &dyn Notifier,
) {
    if settings.track_history {
        let item = HistoryItem::from_report(report, domain);
        if let Err(e) = history.append(item).await {
            log::warn!("Failed to record fill history: {}", e);
        }
    }

    if settings.show_fill_notification {
        if let Err(e) = notifier.notify(FILL_COMPLETE_TITLE, &report.message).await {
            log::warn!("Failed to show fill notification: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::FillStatus;

    #[derive(Default)]
    struct MemoryHistory {
        items: Mutex<Vec<HistoryItem>>,
        fail: bool,
    }

    #[async_trait]
    impl HistoryStore for MemoryHistory {
        async fn append(&self, item: HistoryItem) -> Result<()> {
            if self.fail {
                return Err(AppError::validation("history unavailable"));
            }
            self.items.lock().unwrap().insert(0, item);
            Ok(())
        }

        async fn load(&self) -> Result<Vec<HistoryItem>> {
            Ok(self.items.lock().unwrap().clone())
        }

        async fn clear(&self) -> Result<()> {
            self.items.lock().unwrap().clear();
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, title: &str, message: &str) -> Result<()> {
            if self.fail {
                return Err(AppError::validation("notifications blocked"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
            Ok(())
        }
    }

    fn report() -> FillReport {
        FillReport::new(2, Vec::new(), false)
    }

    #[tokio::test]
    async fn test_records_history_and_notifies() {
        let history = MemoryHistory::default();
        let notifier = RecordingNotifier::default();

        dispatch_report(&report(), &Settings::default(), "example.com", &history, &notifier)
            .await;

        let items = history.load().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].domain, "example.com");
        assert_eq!(items[0].filled_count, 2);
        assert_eq!(items[0].status, FillStatus::Success);

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, FILL_COMPLETE_TITLE);
        assert_eq!(sent[0].1, "2 fields filled successfully");
    }

    #[tokio::test]
    async fn test_respects_settings() {
        let history = MemoryHistory::default();
        let notifier = RecordingNotifier::default();
        let settings = Settings {
            track_history: false,
            show_fill_notification: false,
            ..Settings::default()
        };

        dispatch_report(&report(), &settings, "example.com", &history, &notifier).await;

        assert!(history.load().await.unwrap().is_empty());
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_still_notifies() {
        let history = MemoryHistory {
            fail: true,
            ..MemoryHistory::default()
        };
        let notifier = RecordingNotifier::default();

        dispatch_report(&report(), &Settings::default(), "example.com", &history, &notifier)
            .await;

        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        let history = MemoryHistory::default();
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };

        dispatch_report(&report(), &Settings::default(), "", &history, &notifier).await;

        assert_eq!(history.load().await.unwrap().len(), 1);
    }
}

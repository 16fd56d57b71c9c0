// src/pipeline/run.rs

//! Fill pass entry points.
//!
//! - `run_autofill`: one Locate -> Classify -> Execute pass
//! - `AutofillSession`: manual and on-load triggers for one document,
//!   serialized so two triggers never fill the same page at once

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::document::FormDocument;
use crate::error::{AppError, Result};
use crate::models::{Config, FillReport, MappingProfiles, Settings, UserProfile};
use crate::services::{CancelFlag, FillExecutor, FieldClassifier, locate};

/// Run one fill pass over the document.
///
/// Fails before touching the document when autofill is disabled or no
/// profile has been saved.
pub async fn run_autofill<D: FormDocument + ?Sized>(
    document: &mut D,
    profile: Option<&UserProfile>,
    settings: &Settings,
    mappings: &MappingProfiles,
) -> Result<FillReport> {
    fill_pass(document, profile, settings, mappings, &CancelFlag::default()).await
}

async fn fill_pass<D: FormDocument + ?Sized>(
    document: &mut D,
    profile: Option<&UserProfile>,
    settings: &Settings,
    mappings: &MappingProfiles,
    cancel: &CancelFlag,
) -> Result<FillReport> {
    if !settings.enabled {
        return Err(AppError::Disabled);
    }
    let profile = profile.ok_or(AppError::MissingProfile)?;

    let table = mappings.resolve(&settings.mapping_profile);
    let classifier = FieldClassifier::new(&table)?;

    let candidates = locate(&*document);
    let classification = classifier.classify(&candidates);
    log::debug!(
        "Classified {} candidates into {} categories",
        candidates.len(),
        classification.len()
    );

    let report = FillExecutor::new(settings)
        .with_cancel(cancel.clone())
        .execute(document, &classification, profile)
        .await;

    log::info!("Autofill {}: {}", report.status, report.message);
    Ok(report)
}

/// Allows one fill pass at a time.
#[derive(Debug, Clone, Default)]
pub struct RunGate(Arc<AtomicBool>);

/// Held for the duration of a pass; releases the gate on drop.
#[derive(Debug)]
pub struct RunPermit(Arc<AtomicBool>);

impl RunGate {
    /// Claim the gate, or fail if a pass is already running.
    pub fn try_acquire(&self) -> Result<RunPermit> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AppError::RunInProgress)?;
        Ok(RunPermit(Arc::clone(&self.0)))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Default wait between page load and the first scan.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Trigger surface for one document.
#[derive(Debug, Clone)]
pub struct AutofillSession {
    mappings: MappingProfiles,
    settle_delay: Duration,
    gate: RunGate,
    cancel: CancelFlag,
}

impl AutofillSession {
    pub fn new(mappings: MappingProfiles) -> Self {
        Self {
            mappings,
            settle_delay: DEFAULT_SETTLE_DELAY,
            gate: RunGate::default(),
            cancel: CancelFlag::default(),
        }
    }

    /// Build a session from the mapping profiles and engine settings in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.mapping_profiles()?).with_settle_delay(config.engine.settle_delay()))
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Flag that stops the running pass at its next pause.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn gate(&self) -> &RunGate {
        &self.gate
    }

    /// Explicit "fill this page" command.
    pub async fn fill_now<D: FormDocument + ?Sized>(
        &self,
        document: &mut D,
        profile: Option<&UserProfile>,
        settings: &Settings,
    ) -> Result<FillReport> {
        let _permit = self.gate.try_acquire()?;
        self.cancel.reset();
        fill_pass(document, profile, settings, &self.mappings, &self.cancel).await
    }

    /// Page-load trigger: waits for the page to settle, then fills.
    ///
    /// Returns `None` without touching the document unless both `enabled`
    /// and `autoFillOnLoad` are set.
    pub async fn fill_on_load<D: FormDocument + ?Sized>(
        &self,
        document: &mut D,
        profile: Option<&UserProfile>,
        settings: &Settings,
    ) -> Result<Option<FillReport>> {
        if !(settings.enabled && settings.auto_fill_on_load) {
            log::debug!("Auto-fill on load is off");
            return Ok(None);
        }

        let _permit = self.gate.try_acquire()?;
        self.cancel.reset();
        tokio::time::sleep(self.settle_delay).await;
        if self.cancel.is_cancelled() {
            log::info!("Auto-fill on load cancelled before scanning");
            return Ok(None);
        }
        fill_pass(document, profile, settings, &self.mappings, &self.cancel)
            .await
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlDocument;
    use crate::models::{FillStatus, PatternTable, FieldCategory};

    const PAGE: &str = r#"
        <form>
          <label for="fn">First name</label><input id="fn">
          <input name="email">
          <input name="phone" value="555">
        </form>
    "#;

    fn profile() -> UserProfile {
        UserProfile {
            first_name: Some("Ana".into()),
            email: Some("a@x.com".into()),
            phone: Some("999".into()),
            ..UserProfile::default()
        }
    }

    fn settings() -> Settings {
        Settings {
            fill_delay: 0,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_run_autofill_fills_empty_fields() {
        let mut doc = HtmlDocument::parse(PAGE).unwrap();
        let report = run_autofill(
            &mut doc,
            Some(&profile()),
            &settings(),
            &MappingProfiles::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.status, FillStatus::Success);
        assert_eq!(report.filled_count, 2);
        assert_eq!(doc.find_by_name("phone").unwrap().value, "555");
    }

    #[tokio::test]
    async fn test_disabled_refuses_before_mutation() {
        let mut doc = HtmlDocument::parse(PAGE).unwrap();
        let s = Settings {
            enabled: false,
            ..settings()
        };

        let err = run_autofill(&mut doc, Some(&profile()), &s, &MappingProfiles::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Disabled));
        assert!(err.is_precondition());
        assert!(doc.events().is_empty());
    }

    #[tokio::test]
    async fn test_missing_profile_refuses() {
        let mut doc = HtmlDocument::parse(PAGE).unwrap();
        let err = run_autofill(&mut doc, None, &settings(), &MappingProfiles::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingProfile));
        assert!(doc.events().is_empty());
    }

    #[tokio::test]
    async fn test_page_without_forms_is_an_error_report() {
        let mut doc = HtmlDocument::parse("<p>Nothing to see</p>").unwrap();
        let report = run_autofill(
            &mut doc,
            Some(&profile()),
            &settings(),
            &MappingProfiles::default(),
        )
        .await
        .unwrap();
        assert_eq!(report.status, FillStatus::Error);
        assert_eq!(report.filled_count, 0);
    }

    #[tokio::test]
    async fn test_custom_mapping_profile_is_used() {
        let mut doc = HtmlDocument::parse(r#"<input name="courriel">"#).unwrap();
        let mut mappings = MappingProfiles::default();
        let mut table = PatternTable::default();
        table.insert(FieldCategory::Email, vec!["courriel".into()]);
        mappings.insert_custom("french", table);
        let s = Settings {
            mapping_profile: "french".into(),
            ..settings()
        };

        let report = run_autofill(&mut doc, Some(&profile()), &s, &mappings)
            .await
            .unwrap();
        assert_eq!(report.filled_count, 1);
        assert_eq!(doc.find_by_name("courriel").unwrap().value, "a@x.com");
    }

    #[test]
    fn test_gate_releases_on_drop() {
        let gate = RunGate::default();
        let permit = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(matches!(gate.try_acquire(), Err(AppError::RunInProgress)));

        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_ok());
    }

    #[tokio::test]
    async fn test_fill_now_rejected_while_busy() {
        let session = AutofillSession::new(MappingProfiles::default());
        let mut doc = HtmlDocument::parse(PAGE).unwrap();

        let _held = session.gate().try_acquire().unwrap();
        let err = session
            .fill_now(&mut doc, Some(&profile()), &settings())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RunInProgress));
        assert!(doc.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_triggers_are_serialized() {
        let session = AutofillSession::new(MappingProfiles::default());
        let mut on_load_doc = HtmlDocument::parse(PAGE).unwrap();
        let mut manual_doc = HtmlDocument::parse(PAGE).unwrap();
        let s = Settings {
            auto_fill_on_load: true,
            ..settings()
        };
        let p = profile();

        let (on_load, manual) = tokio::join!(
            session.fill_on_load(&mut on_load_doc, Some(&p), &s),
            session.fill_now(&mut manual_doc, Some(&p), &s),
        );

        assert_eq!(on_load.unwrap().unwrap().filled_count, 2);
        assert!(matches!(manual, Err(AppError::RunInProgress)));
        assert!(!session.gate().is_busy());
    }

    #[tokio::test]
    async fn test_fill_on_load_requires_flag() {
        let session = AutofillSession::new(MappingProfiles::default());
        let mut doc = HtmlDocument::parse(PAGE).unwrap();

        let result = session
            .fill_on_load(&mut doc, Some(&profile()), &settings())
            .await
            .unwrap();
        assert!(result.is_none());

        let disabled = Settings {
            enabled: false,
            auto_fill_on_load: true,
            ..settings()
        };
        let result = session
            .fill_on_load(&mut doc, Some(&profile()), &disabled)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(doc.events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fill_on_load_waits_for_settle_delay() {
        let session = AutofillSession::new(MappingProfiles::default())
            .with_settle_delay(Duration::from_millis(500));
        let mut doc = HtmlDocument::parse(PAGE).unwrap();
        let s = Settings {
            auto_fill_on_load: true,
            ..settings()
        };

        let start = tokio::time::Instant::now();
        let report = session
            .fill_on_load(&mut doc, Some(&profile()), &s)
            .await
            .unwrap()
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(report.filled_count, 2);
    }
}

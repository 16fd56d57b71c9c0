//! Fill executor.
//!
//! Walks a classification in category priority order, gates each control,
//! paces writes and dispatches the `input`/`change` pair a user edit would
//! produce. This is the only stage that mutates the document.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::document::{ControlId, ControlKind, DomEvent, EventKind, FormControl, FormDocument};
use crate::error::{AppError, Result};
use crate::models::{Classification, FieldCategory, FillReport, Settings, UserProfile};

/// Why an otherwise matching control was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyFilled,
    Hidden,
    AutocompleteOff,
    Password,
}

/// Eligibility gate applied before every write.
///
/// Password inputs are never filled, whatever the category or settings.
pub fn check_eligibility(control: &FormControl, settings: &Settings) -> Option<SkipReason> {
    if settings.fill_only_empty && control.holds_value() {
        return Some(SkipReason::AlreadyFilled);
    }
    if control.is_hidden() {
        return Some(SkipReason::Hidden);
    }
    if control.autocomplete_off() {
        return Some(SkipReason::AutocompleteOff);
    }
    if control.is_password() {
        return Some(SkipReason::Password);
    }
    None
}

/// Index of the option whose value equals `value`, or whose text equals it
/// ignoring case.
pub fn match_option(control: &FormControl, value: &str) -> Option<usize> {
    let ControlKind::Select { options, .. } = &control.kind else {
        return None;
    };
    let wanted = value.to_lowercase();
    options
        .iter()
        .position(|option| option.value == value || option.text.to_lowercase() == wanted)
}

/// Shared flag that stops a pass at its next suspension point.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag before starting a new pass.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Outcome of writing one control.
enum WriteOutcome {
    Filled,
    NoMatchingOption,
}

/// Applies profile values to classified controls.
pub struct FillExecutor<'a> {
    settings: &'a Settings,
    cancel: CancelFlag,
}

impl<'a> FillExecutor<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            cancel: CancelFlag::default(),
        }
    }

    /// Honor a cancellation flag at each pacing pause.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run one fill pass over the classified controls.
    pub async fn execute<D: FormDocument + ?Sized>(
        &self,
        document: &mut D,
        classification: &Classification,
        profile: &UserProfile,
    ) -> FillReport {
        let delay = self.settings.fill_delay();
        let reserved = Self::reserved_controls(classification, profile);
        let mut claimed: HashSet<ControlId> = HashSet::new();
        let mut filled_count = 0;
        let mut failed_fields: Vec<FieldCategory> = Vec::new();
        let mut cancelled = false;

        'categories: for (category, candidates) in classification.iter() {
            if category.is_payment() && !profile.enable_payment {
                log::debug!("Skipping {}: payment filling is disabled", category);
                continue;
            }
            let Some(value) = profile.value_for(category) else {
                continue;
            };

            for candidate in candidates {
                let id = candidate.control;
                if claimed.contains(&id) || reserved.contains(&id) {
                    continue;
                }

                let Some(control) = document.control(id) else {
                    log::warn!("Failed to fill {}: control {} was detached", category, id);
                    Self::record_failure(&mut failed_fields, category);
                    continue;
                };
                if let Some(reason) = check_eligibility(control, self.settings) {
                    log::debug!("Skipping {} control {}: {:?}", category, id, reason);
                    continue;
                }

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if self.cancel.is_cancelled() {
                    log::info!("Fill pass cancelled after {} fields", filled_count);
                    cancelled = true;
                    break 'categories;
                }

                match Self::write_control(document, id, value) {
                    Ok(WriteOutcome::Filled) => {
                        log::debug!("Filled {} control {}", category, id);
                        claimed.insert(id);
                        filled_count += 1;
                        if let Err(e) = Self::announce(document, id) {
                            log::warn!("Filled {} but could not notify the page: {}", category, e);
                            Self::record_failure(&mut failed_fields, category);
                        }
                    }
                    Ok(WriteOutcome::NoMatchingOption) => {
                        log::debug!("No option of control {} matches {}", id, category);
                    }
                    Err(e) => {
                        log::warn!("Failed to fill {}: {}", category, e);
                        Self::record_failure(&mut failed_fields, category);
                    }
                }
            }
        }

        FillReport::new(filled_count, failed_fields, cancelled)
    }

    /// Controls matched by a payment category while payment filling is off.
    fn reserved_controls(
        classification: &Classification,
        profile: &UserProfile,
    ) -> HashSet<ControlId> {
        if profile.enable_payment {
            return HashSet::new();
        }
        classification
            .iter()
            .filter(|(category, _)| category.is_payment())
            .flat_map(|(_, candidates)| candidates.iter().map(|c| c.control))
            .collect()
    }

    /// Write one control's value or selection.
    fn write_control<D: FormDocument + ?Sized>(
        document: &mut D,
        id: ControlId,
        value: &str,
    ) -> Result<WriteOutcome> {
        let control = document.control(id).ok_or(AppError::Detached(id))?;
        let option = match control.kind {
            ControlKind::Select { .. } => match match_option(control, value) {
                Some(index) => Some(index),
                None => return Ok(WriteOutcome::NoMatchingOption),
            },
            ControlKind::TextLike { .. } | ControlKind::TextArea => None,
        };

        match option {
            Some(index) => document.select_option(id, index)?,
            None => document.write_value(id, value)?,
        }
        Ok(WriteOutcome::Filled)
    }

    /// Dispatch the `input`/`change` pair a user edit produces.
    fn announce<D: FormDocument + ?Sized>(document: &mut D, id: ControlId) -> Result<()> {
        document.dispatch_event(id, DomEvent::bubbling(EventKind::Input))?;
        document.dispatch_event(id, DomEvent::bubbling(EventKind::Change))?;
        Ok(())
    }

    fn record_failure(failed_fields: &mut Vec<FieldCategory>, category: FieldCategory) {
        if !failed_fields.contains(&category) {
            failed_fields.push(category);
        }
    }
}

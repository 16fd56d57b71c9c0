//! HTML-backed form document.
//!
//! Parses a page once with `scraper`, resolving labels and select options up
//! front, and keeps the mutable control state in an arena so writes and
//! dispatched events can be inspected afterwards.

use std::collections::{HashMap, HashSet};

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::document::{
    ControlAttributes, ControlId, ControlKind, DomEvent, EventKind, FormControl, FormDocument,
    SelectOption,
};
use crate::error::{AppError, Result};
use crate::utils::normalize_whitespace;

/// Input types that never hold free text.
const NON_TEXT_INPUT_TYPES: &[&str] = &[
    "checkbox", "radio", "submit", "button", "reset", "image", "file",
];

/// An event dispatched on a control, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchedEvent {
    pub target: ControlId,
    pub event: DomEvent,
}

/// Form controls parsed from an HTML page.
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    controls: Vec<FormControl>,
    detached: HashSet<ControlId>,
    events: Vec<DispatchedEvent>,
    url: Option<String>,
}

impl HtmlDocument {
    /// Parse a page and snapshot its fillable controls.
    pub fn parse(source: &str) -> Result<Self> {
        let html = Html::parse_document(source);
        let control_sel = Self::parse_selector("input, select, textarea")?;
        let label_sel = Self::parse_selector("label[for]")?;
        let option_sel = Self::parse_selector("option")?;

        // First label wins, like querySelector.
        let mut labels_for: HashMap<String, String> = HashMap::new();
        for label in html.select(&label_sel) {
            if let Some(target) = label.value().attr("for") {
                labels_for
                    .entry(target.to_string())
                    .or_insert_with(|| element_text(label));
            }
        }

        let mut controls = Vec::new();
        for element in html.select(&control_sel) {
            let Some(kind) = Self::control_kind(element, &option_sel) else {
                continue;
            };

            let value = match &kind {
                ControlKind::TextLike { .. } => {
                    element.value().attr("value").unwrap_or_default().to_string()
                }
                ControlKind::TextArea => element.text().collect(),
                ControlKind::Select { options, selected } => options
                    .get(selected.unwrap_or(0))
                    .map(|option| option.value.clone())
                    .unwrap_or_default(),
            };

            controls.push(FormControl {
                id: ControlId(controls.len()),
                kind,
                attributes: Self::attributes(element),
                label: label_text(element, &labels_for),
                value,
            });
        }

        log::debug!("Parsed {} fillable controls", controls.len());

        Ok(Self {
            controls,
            ..Self::default()
        })
    }

    /// Attach the page URL the document was loaded from.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Remove a control, as a page script replacing a form would.
    ///
    /// Returns false if it was already gone or never existed.
    pub fn detach(&mut self, id: ControlId) -> bool {
        id.0 < self.controls.len() && self.detached.insert(id)
    }

    /// Every dispatched event, in order.
    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    /// Event kinds dispatched on one control, in order.
    pub fn events_for(&self, id: ControlId) -> Vec<EventKind> {
        self.events
            .iter()
            .filter(|e| e.target == id)
            .map(|e| e.event.kind)
            .collect()
    }

    /// First attached control whose `id` attribute matches.
    pub fn find_by_html_id(&self, html_id: &str) -> Option<&FormControl> {
        self.controls()
            .into_iter()
            .find(|c| c.attributes.id.as_deref() == Some(html_id))
    }

    /// First attached control whose `name` attribute matches.
    pub fn find_by_name(&self, name: &str) -> Option<&FormControl> {
        self.controls()
            .into_iter()
            .find(|c| c.attributes.name.as_deref() == Some(name))
    }

    fn control_kind(element: ElementRef, option_sel: &Selector) -> Option<ControlKind> {
        match element.value().name() {
            "input" => {
                let input_type = element
                    .value()
                    .attr("type")
                    .map(|t| t.trim().to_ascii_lowercase())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "text".to_string());
                if NON_TEXT_INPUT_TYPES.contains(&input_type.as_str()) {
                    return None;
                }
                Some(ControlKind::TextLike { input_type })
            }
            "textarea" => Some(ControlKind::TextArea),
            "select" => {
                let mut options = Vec::new();
                let mut selected = None;
                for (index, option) in element.select(option_sel).enumerate() {
                    let text = element_text(option);
                    let value = option
                        .value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| text.clone());
                    // The last `selected` attribute wins for a single select.
                    if option.value().attr("selected").is_some() {
                        selected = Some(index);
                    }
                    options.push(SelectOption { value, text });
                }
                Some(ControlKind::Select { options, selected })
            }
            _ => None,
        }
    }

    fn attributes(element: ElementRef) -> ControlAttributes {
        let attr = |name: &str| element.value().attr(name).map(str::to_string);
        ControlAttributes {
            name: attr("name"),
            id: attr("id"),
            form_control_name: attr("formcontrolname"),
            placeholder: attr("placeholder"),
            aria_label: attr("aria-label"),
            autocomplete: attr("autocomplete"),
        }
    }

    fn attached_mut(&mut self, id: ControlId) -> Result<&mut FormControl> {
        if self.detached.contains(&id) {
            return Err(AppError::Detached(id));
        }
        self.controls.get_mut(id.0).ok_or(AppError::Detached(id))
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

impl FormDocument for HtmlDocument {
    fn controls(&self) -> Vec<&FormControl> {
        self.controls
            .iter()
            .filter(|c| !self.detached.contains(&c.id))
            .collect()
    }

    fn control(&self, id: ControlId) -> Option<&FormControl> {
        if self.detached.contains(&id) {
            return None;
        }
        self.controls.get(id.0)
    }

    fn write_value(&mut self, id: ControlId, value: &str) -> Result<()> {
        let control = self.attached_mut(id)?;
        if let ControlKind::Select { .. } = control.kind {
            return Err(AppError::validation(format!(
                "Control {id} is a select; choose an option instead"
            )));
        }
        control.value = value.to_string();
        Ok(())
    }

    fn select_option(&mut self, id: ControlId, index: usize) -> Result<()> {
        let control = self.attached_mut(id)?;
        let ControlKind::Select { options, selected } = &mut control.kind else {
            return Err(AppError::validation(format!("Control {id} is not a select")));
        };
        let option = options.get(index).ok_or_else(|| {
            AppError::validation(format!("Control {id} has no option at index {index}"))
        })?;
        control.value = option.value.clone();
        *selected = Some(index);
        Ok(())
    }

    fn dispatch_event(&mut self, id: ControlId, event: DomEvent) -> Result<()> {
        self.attached_mut(id)?;
        self.events.push(DispatchedEvent { target: id, event });
        Ok(())
    }

    fn location(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Whitespace-normalized text content of an element.
fn element_text(element: ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Label text: an explicit `label[for=id]`, else the nearest ancestor label.
fn label_text(element: ElementRef, labels_for: &HashMap<String, String>) -> String {
    if let Some(text) = element
        .value()
        .attr("id")
        .filter(|id| !id.is_empty())
        .and_then(|id| labels_for.get(id))
    {
        return text.clone();
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "label")
        .map(element_text)
        .unwrap_or_default()
}

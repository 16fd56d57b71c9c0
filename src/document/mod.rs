//! Document model the fill engine operates on.
//!
//! The engine never reaches for a global page: callers hand it a
//! [`FormDocument`]. [`HtmlDocument`] is the HTML-backed implementation;
//! tests and embedders can supply their own.

mod html;

use std::fmt;

use serde::Serialize;

use crate::error::Result;

pub use html::HtmlDocument;

/// Stable handle of a control within one document, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ControlId(pub usize);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One `<option>` of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    /// Displayed text, whitespace-normalized
    pub text: String,
}

/// The three fillable control kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    /// `<input>` that accepts free text (text, email, tel, hidden, password, ...)
    TextLike { input_type: String },
    Select {
        options: Vec<SelectOption>,
        /// Index of an explicitly chosen option
        selected: Option<usize>,
    },
    TextArea,
}

impl ControlKind {
    pub fn tag(&self) -> ControlKindTag {
        match self {
            ControlKind::TextLike { .. } => ControlKindTag::TextLike,
            ControlKind::Select { .. } => ControlKindTag::Select,
            ControlKind::TextArea => ControlKindTag::TextArea,
        }
    }
}

/// Data-free discriminant of [`ControlKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlKindTag {
    TextLike,
    Select,
    TextArea,
}

/// Attributes the locator and eligibility gate read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlAttributes {
    pub name: Option<String>,
    pub id: Option<String>,
    /// Angular-style `formcontrolname`
    pub form_control_name: Option<String>,
    pub placeholder: Option<String>,
    pub aria_label: Option<String>,
    pub autocomplete: Option<String>,
}

/// A fillable control and its live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub id: ControlId,
    pub kind: ControlKind,
    pub attributes: ControlAttributes,
    /// Text of the associated label, empty when there is none
    pub label: String,
    /// Current value; for selects, the value of the effective option
    pub value: String,
}

impl FormControl {
    fn input_type(&self) -> Option<&str> {
        match &self.kind {
            ControlKind::TextLike { input_type } => Some(input_type.as_str()),
            _ => None,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.input_type() == Some("hidden")
    }

    pub fn is_password(&self) -> bool {
        self.input_type() == Some("password")
    }

    pub fn autocomplete_off(&self) -> bool {
        self.attributes
            .autocomplete
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("off"))
    }

    /// Whether the control already carries something a user entered.
    ///
    /// A select only counts once an option has been chosen explicitly,
    /// since it always displays its first option.
    pub fn holds_value(&self) -> bool {
        match &self.kind {
            ControlKind::Select { selected, .. } => {
                selected.is_some() && !self.value.trim().is_empty()
            }
            _ => !self.value.trim().is_empty(),
        }
    }
}

/// Event types dispatched after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
}

/// A synthetic DOM event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomEvent {
    pub kind: EventKind,
    pub bubbles: bool,
}

impl DomEvent {
    pub fn bubbling(kind: EventKind) -> Self {
        Self {
            kind,
            bubbles: true,
        }
    }
}

/// A document whose form controls can be read and written.
pub trait FormDocument {
    /// Attached controls, in document order.
    fn controls(&self) -> Vec<&FormControl>;

    /// A control by handle, `None` once it has been detached.
    fn control(&self, id: ControlId) -> Option<&FormControl>;

    /// Set the value of a text-like control or text area.
    fn write_value(&mut self, id: ControlId, value: &str) -> Result<()>;

    /// Select the option at `index` of a select control.
    fn select_option(&mut self, id: ControlId, index: usize) -> Result<()>;

    /// Dispatch an event on a control.
    fn dispatch_event(&mut self, id: ControlId, event: DomEvent) -> Result<()>;

    /// URL of the page, when known.
    fn location(&self) -> Option<&str> {
        None
    }
}

//! Capability facets a host object may expose.
//!
//! Handlers never downcast. They ask a [`HostObject`](super::HostObject) for
//! each facet in a fixed order and act on the first one present.

use time::{Date, PrimitiveDateTime, Time};

/// Something that performs its action when triggered (menu or toolbar actions).
pub trait Triggerable {
    /// Fires the action.
    fn trigger(&self);
}

/// A push, tool, check or radio button.
pub trait Clickable {
    /// Performs a full press-and-release click.
    fn click(&self);
}

/// A drop-down selector.
pub trait Selector {
    /// Whether the selector accepts free text.
    fn is_editable(&self) -> bool;

    /// Opens the list of choices.
    fn show_popup(&self);

    /// Replaces the free text of an editable selector.
    fn set_edit_text(&self, text: &str);
}

/// A strip of tabs.
pub trait TabStrip {
    /// Index of the selected tab, if any tab is selected.
    fn current_index(&self) -> Option<usize>;

    /// Selects the tab at `index` and emits the strip's click notification.
    fn activate(&self, index: usize);
}

/// Single or multi-line text entry.
pub trait TextInput {
    /// Whether edits are refused.
    fn is_read_only(&self) -> bool;

    /// Replaces the content.
    fn set_text(&self, text: &str);
}

/// Representation accepted by a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    /// Whole numbers only.
    Integer,
    /// Floating-point values.
    Decimal,
}

/// A parsed numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Decimal(f64),
}

/// A spin box or similar numeric entry.
pub trait NumericField {
    /// Representation the field accepts.
    fn kind(&self) -> NumericKind;

    /// Stores `value`.
    fn set_value(&self, value: NumericValue);
}

/// Calendar component edited by a temporal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    /// Date and time of day.
    DateTime,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
}

/// A parsed temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalValue {
    /// Date and time of day without an offset.
    DateTime(PrimitiveDateTime),
    /// Calendar date.
    Date(Date),
    /// Time of day.
    Time(Time),
}

/// A date, time or date-time editor.
pub trait TemporalField {
    /// Component the field edits.
    fn kind(&self) -> TemporalKind;

    /// The field's display format in `time` format-description syntax, for
    /// example `[day].[month].[year]`.
    fn display_format(&self) -> Option<String>;

    /// Stores `value`.
    fn set_value(&self, value: TemporalValue);
}

/// A request to call one of an object's named operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Operation name, such as `click` or `setText`.
    pub method: &'static str,
    /// Text argument, for setters.
    pub text: Option<String>,
}

impl Invocation {
    /// An operation without arguments.
    #[must_use]
    pub const fn call(method: &'static str) -> Self {
        Self { method, text: None }
    }

    /// An operation taking one text argument.
    #[must_use]
    pub fn with_text(method: &'static str, text: impl Into<String>) -> Self {
        Self {
            method,
            text: Some(text.into()),
        }
    }
}

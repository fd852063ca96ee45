//! Cell rendering.
//!
//! A column may carry a [`CellRenderer`] that turns the raw value of its key
//! into display content. The same renderer feeds on-screen display and CSV
//! export, so exported text matches what the table shows.
//!
//! Renderers declare two outputs:
//! - [`CellRenderer::display`] is what the table shows: either a plain value
//!   or a structured artifact such as a [`Badge`].
//! - [`CellRenderer::plain_text`] is optional flat text for exports.
//!
//! Exports use `plain_text` when given, then a plain display value. A
//! structured display without plain text exports the raw value instead.

mod builtin;

pub use builtin::*;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;
use crate::model::Value;
use crate::model::text_of;

/// Tone of a badge, mapped to colors by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Neutral,
    Info,
    Success,
    Warning,
    Error,
}

/// A labelled status chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

impl Badge {
    pub fn new(label: impl Into<String>, tone: Tone) -> Self {
        Self {
            label: label.into(),
            tone,
        }
    }
}

/// Display content of a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// A plain value; `None` when the field is absent.
    Plain(Option<Value>),
    /// A structured presentational artifact with no flat-text meaning.
    Badge(Badge),
}

impl CellContent {
    /// Plain content holding a copy of the raw value.
    pub fn from_raw(raw: Option<&Value>) -> Self {
        CellContent::Plain(raw.cloned())
    }

    /// Plain text content.
    pub fn text(text: impl Into<String>) -> Self {
        CellContent::Plain(Some(Value::String(text.into())))
    }

    /// Text shown on screen for this content.
    pub fn display_text(&self) -> String {
        match self {
            CellContent::Plain(value) => text_of(value.as_ref()),
            CellContent::Badge(badge) => badge.label.clone(),
        }
    }
}

/// Per-column transform from a raw value to display content.
///
/// Implementations must be pure: the same raw value and record always give
/// the same output, with no side effects, since display and export both call
/// them.
pub trait CellRenderer: Send + Sync {
    /// Display content for the cell.
    fn display(&self, raw: Option<&Value>, record: &Record) -> CellContent;

    /// Flat export text for the cell, if this renderer defines one.
    fn plain_text(&self, raw: Option<&Value>, record: &Record) -> Option<String> {
        let _ = (raw, record);
        None
    }

    /// Short name used in debug output.
    fn name(&self) -> &'static str {
        "custom"
    }
}

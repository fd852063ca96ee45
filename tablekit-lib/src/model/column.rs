//! Column definitions for table display and export.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use super::Record;
use super::Value;
use super::text_of;
use crate::render::CellContent;
use crate::render::CellRenderer;

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Column configuration.
///
/// Columns define the structure of the table: which field they read, the
/// header label, alignment, whether the column is sortable and how its cells
/// are presented.
///
/// The `key` is both the field the column reads and the identity used for
/// sort state. A key that names no field on the records (a presentation-only
/// alias such as `nameSurname`) is fine as long as a renderer produces the
/// cell from the whole record.
///
/// # Examples
///
/// ```
/// use tablekit_lib::model::{Alignment, Column};
/// use tablekit_lib::render::Template;
///
/// let columns = vec![
///     Column::new("id", "ID").sortable(),
///     Column::new("nameSurname", "Name Surname")
///         .align(Alignment::Right)
///         .render(Template::new("{name} {surname}")),
/// ];
/// ```
#[derive(Clone)]
pub struct Column {
    /// Field key (or alias) this column reads
    pub key: String,
    /// Column header text
    pub label: String,
    /// Horizontal alignment
    pub align: Alignment,
    /// Whether this column is sortable
    pub sortable: bool,
    /// Optional cell renderer
    pub renderer: Option<Arc<dyn CellRenderer>>,
}

impl Column {
    /// Create a new left-aligned, unsorted column without a renderer.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            align: Alignment::Left,
            sortable: false,
            renderer: None,
        }
    }

    /// Set the column alignment.
    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Attach a cell renderer.
    pub fn render(mut self, renderer: impl CellRenderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Attach a shared cell renderer.
    pub fn render_shared(mut self, renderer: Arc<dyn CellRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Raw value of this column's key on the record.
    pub fn raw<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.resolve(&self.key)
    }

    /// Display content of this column for the record.
    ///
    /// Without a renderer the display value is the raw value.
    pub fn present(&self, record: &Record) -> CellContent {
        let raw = self.raw(record);
        match &self.renderer {
            Some(renderer) => renderer.display(raw, record),
            None => CellContent::from_raw(raw),
        }
    }

    /// Flat text of this column for the record, as written to exports.
    ///
    /// Uses the renderer's plain text when it provides one, then a plain
    /// display value. Structured display content falls back to the raw value.
    pub fn export_text(&self, record: &Record) -> String {
        let raw = self.raw(record);
        let Some(renderer) = &self.renderer else {
            return text_of(raw);
        };
        if let Some(text) = renderer.plain_text(raw, record) {
            return text;
        }
        match renderer.display(raw, record) {
            CellContent::Plain(value) => text_of(value.as_ref()),
            CellContent::Badge(_) => text_of(raw),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("align", &self.align)
            .field("sortable", &self.sortable)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name()))
            .finish()
    }
}

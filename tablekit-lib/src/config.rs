//! Table definitions
//!
//! A [`TableDefinition`] is everything a [`TableSession`](crate::session::TableSession)
//! needs besides the records: columns, filters, initial state, pagination
//! and export settings. It can be built in code or loaded from JSON through
//! [`TableSpec`]:
//!
//! ```json
//! {
//!   "title": "Payments",
//!   "columns": [
//!     { "key": "id", "label": "ID", "sortable": true },
//!     { "key": "amount", "label": "Amount", "align": "right", "sortable": true,
//!       "render": { "type": "currency", "symbol": "$" } }
//!   ],
//!   "filters": [
//!     { "key": "amount", "label": "Min. Amount", "type": "number", "comparisonType": "greater" }
//!   ],
//!   "initialSort": { "field": "amount", "direction": "desc" },
//!   "pageSize": 25
//! }
//! ```

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::export::DEFAULT_FILENAME;
use crate::export::DEFAULT_MIME;
use crate::export::ExportOptions;
use crate::model::Alignment;
use crate::model::Column;
use crate::query::DEFAULT_PAGE_SIZE;
use crate::query::DEFAULT_PAGE_SIZE_OPTIONS;
use crate::query::FilterDef;
use crate::query::FilterValues;
use crate::query::Pagination;
use crate::query::SortState;
use crate::render::BadgeMap;
use crate::render::CellRenderer;
use crate::render::Currency;
use crate::render::DateFormat;
use crate::render::Template;
use crate::render::Tone;
use crate::render::Uppercase;

// =============================================================================
// TableDefinition
// =============================================================================

/// Validated configuration of one table.
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub title: Option<String>,
    pub columns: Vec<Column>,
    pub filters: Vec<FilterDef>,
    /// Sort applied before the user clicks any header.
    pub initial_sort: Option<SortState>,
    /// Filter values applied when the table opens.
    pub initial_filters: FilterValues,
    /// Starting page size and the sizes offered.
    pub pagination: Pagination,
    pub export: ExportOptions,
    /// Whether the export action is offered at all.
    ///
    /// Default: `true`
    pub exportable: bool,
}

impl TableDefinition {
    /// Creates a definition with default pagination and export settings.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            title: None,
            columns,
            filters: Vec::new(),
            initial_sort: None,
            initial_filters: FilterValues::new(),
            pagination: Pagination::default(),
            export: ExportOptions::default(),
            exportable: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_filters(mut self, filters: Vec<FilterDef>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_initial_sort(mut self, sort: SortState) -> Self {
        self.initial_sort = Some(sort);
        self
    }

    pub fn with_initial_filters(mut self, values: FilterValues) -> Self {
        self.initial_filters = values;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_export(mut self, export: ExportOptions) -> Self {
        self.export = export;
        self
    }

    pub fn with_exportable(mut self, exportable: bool) -> Self {
        self.exportable = exportable;
        self
    }

    /// Looks up a column by key.
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Looks up a filter by key.
    pub fn filter(&self, key: &str) -> Option<&FilterDef> {
        self.filters.iter().find(|f| f.key == key)
    }
}

// =============================================================================
// TableSpec (JSON form)
// =============================================================================

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_page_size_options() -> Vec<usize> {
    DEFAULT_PAGE_SIZE_OPTIONS.to_vec()
}

fn default_export_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

fn default_true() -> bool {
    true
}

/// Serializable form of a [`TableDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    #[serde(default)]
    pub title: Option<String>,
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub filters: Vec<FilterDef>,
    #[serde(default)]
    pub initial_sort: Option<SortState>,
    #[serde(default)]
    pub initial_filters: FilterValues,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<usize>,
    #[serde(default = "default_export_filename")]
    pub export_filename: String,
    /// Overrides `text/csv;charset=utf-8;`.
    #[serde(default)]
    pub export_mime_type: Option<String>,
    #[serde(default = "default_true")]
    pub exportable: bool,
}

impl TableSpec {
    /// Reads a spec from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        text.parse()
    }

    /// Checks the spec for inconsistencies serde cannot catch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size_options.is_empty() {
            return Err(ConfigError::EmptyPageSizes);
        }
        if self.page_size_options.contains(&0) || !self.page_size_options.contains(&self.page_size) {
            return Err(ConfigError::invalid_page_size(self.page_size, &self.page_size_options));
        }

        let mut seen = BTreeSet::new();
        for filter in &self.filters {
            if !seen.insert(filter.key.as_str()) {
                return Err(ConfigError::duplicate_filter(&filter.key));
            }
        }

        match &self.initial_sort {
            Some(sort) if !self.columns.iter().any(|c| c.key == sort.field) => {
                Err(ConfigError::unknown_column(&sort.field))
            }
            _ => Ok(()),
        }
    }

    /// Validates the spec and builds the definition.
    pub fn into_definition(self) -> Result<TableDefinition, ConfigError> {
        self.validate()?;

        let pagination = Pagination::new(self.page_size, self.page_size_options.clone())
            .map_err(|_| ConfigError::invalid_page_size(self.page_size, &self.page_size_options))?;
        let export = ExportOptions::default()
            .filename(self.export_filename)
            .mime(self.export_mime_type.unwrap_or_else(|| DEFAULT_MIME.to_string()));

        Ok(TableDefinition {
            title: self.title,
            columns: self.columns.into_iter().map(ColumnSpec::into_column).collect(),
            filters: self.filters,
            initial_sort: self.initial_sort,
            initial_filters: self.initial_filters,
            pagination,
            export,
            exportable: self.exportable,
        })
    }
}

impl FromStr for TableSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Serializable form of a [`Column`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub align: Alignment,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderSpec>,
}

impl ColumnSpec {
    pub fn into_column(self) -> Column {
        let column = Column {
            key: self.key,
            label: self.label,
            align: self.align,
            sortable: self.sortable,
            renderer: None,
        };
        match self.render {
            Some(spec) => column.render_shared(spec.build()),
            None => column,
        }
    }
}

fn default_decimals() -> u32 {
    2
}

fn default_thousands() -> String {
    ",".to_string()
}

fn default_decimal_point() -> String {
    ".".to_string()
}

/// Choice of a built-in renderer in a JSON table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RenderSpec {
    /// `{field}` placeholders filled from the record.
    Template { template: String },
    /// Money amounts.
    Currency {
        symbol: String,
        #[serde(default = "default_decimals")]
        decimals: u32,
        #[serde(default = "default_thousands")]
        thousands_separator: String,
        #[serde(default = "default_decimal_point")]
        decimal_separator: String,
        #[serde(default)]
        symbol_after: bool,
    },
    /// Timestamps with a `chrono` format string (`%d/%m/%Y %H:%M` if omitted).
    Date {
        #[serde(default)]
        format: Option<String>,
    },
    Uppercase,
    /// Status badges.
    Badge {
        #[serde(default)]
        labels: BTreeMap<String, String>,
        #[serde(default)]
        tones: BTreeMap<String, Tone>,
    },
}

impl RenderSpec {
    /// Builds the renderer this spec describes.
    pub fn build(self) -> Arc<dyn CellRenderer> {
        match self {
            RenderSpec::Template { template } => Arc::new(Template::new(template)),
            RenderSpec::Currency {
                symbol,
                decimals,
                thousands_separator,
                decimal_separator,
                symbol_after,
            } => Arc::new(Currency {
                symbol,
                decimals,
                thousands_separator,
                decimal_separator,
                symbol_after,
            }),
            RenderSpec::Date { format: Some(format) } => Arc::new(DateFormat::new(format)),
            RenderSpec::Date { format: None } => Arc::new(DateFormat::default()),
            RenderSpec::Uppercase => Arc::new(Uppercase),
            RenderSpec::Badge { labels, tones } => Arc::new(BadgeMap::from_maps(labels, tones)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::query::Direction;

    const PAYMENTS: &str = r#"{
        "title": "Payments",
        "columns": [
            {"key": "id", "label": "ID", "sortable": true},
            {"key": "nameSurname", "label": "Name Surname",
             "render": {"type": "template", "template": "{name} {surname}"}},
            {"key": "amount", "label": "Amount", "align": "right", "sortable": true,
             "render": {"type": "currency", "symbol": "₺", "thousandsSeparator": ".", "decimalSeparator": ","}},
            {"key": "status", "label": "Status",
             "render": {"type": "badge", "labels": {"success": "Successful"}, "tones": {"success": "success"}}}
        ],
        "filters": [
            {"key": "search", "label": "Search", "type": "text", "searchKeys": ["id", "name", "surname"]},
            {"key": "amount", "label": "Min. Amount", "type": "number", "comparisonType": "greater"}
        ],
        "initialSort": {"field": "amount", "direction": "desc"},
        "pageSize": 25,
        "exportFilename": "payments.csv"
    }"#;

    #[test]
    fn test_parse_and_build() {
        let definition = PAYMENTS.parse::<TableSpec>().unwrap().into_definition().unwrap();

        assert_eq!(definition.title.as_deref(), Some("Payments"));
        assert_eq!(definition.columns.len(), 4);
        assert_eq!(definition.filters.len(), 2);
        assert_eq!(definition.initial_sort, Some(SortState::new("amount", Direction::Desc)));
        assert_eq!(definition.pagination.page_size(), 25);
        assert_eq!(definition.pagination.options(), &[5, 10, 25, 50]);
        assert_eq!(definition.export.filename, "payments.csv");
        assert_eq!(definition.export.mime, DEFAULT_MIME);
        assert!(definition.exportable);
    }

    #[test]
    fn test_configured_renderers() {
        let definition = PAYMENTS.parse::<TableSpec>().unwrap().into_definition().unwrap();
        let record = Record::new()
            .set("name", "Cagatay")
            .set("surname", "Doe")
            .set("amount", 1234.5)
            .set("status", "success");

        let texts: Vec<String> = definition
            .columns
            .iter()
            .map(|c| c.present(&record).display_text())
            .collect();
        assert_eq!(texts, vec!["undefined", "Cagatay Doe", "₺1.234,50", "Successful"]);
    }

    #[test]
    fn test_defaults() {
        let spec: TableSpec = r#"{"columns": []}"#.parse().unwrap();
        assert_eq!(spec.page_size, 10);
        assert_eq!(spec.page_size_options, vec![5, 10, 25, 50]);
        assert_eq!(spec.export_filename, "exported-data.csv");
        assert!(spec.exportable);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let spec: TableSpec = r#"{"columns": [], "pageSize": 7}"#.parse().unwrap();
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidPageSize { size: 7, .. })));

        let spec: TableSpec = r#"{"columns": [], "pageSizeOptions": []}"#.parse().unwrap();
        assert!(matches!(spec.validate(), Err(ConfigError::EmptyPageSizes)));

        let spec: TableSpec = r#"{"columns": [], "filters": [
            {"key": "q", "label": "A", "type": "text"},
            {"key": "q", "label": "B", "type": "dateRange"}
        ]}"#
        .parse()
        .unwrap();
        assert!(matches!(spec.validate(), Err(ConfigError::DuplicateFilterKey(k)) if k == "q"));

        let spec: TableSpec = r#"{"columns": [], "initialSort": {"field": "amount"}}"#.parse().unwrap();
        assert!(matches!(spec.validate(), Err(ConfigError::UnknownColumn(k)) if k == "amount"));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        std::fs::write(&path, PAYMENTS).unwrap();

        assert_eq!(TableSpec::from_path(&path).unwrap().columns.len(), 4);
        assert!(matches!(
            TableSpec::from_path(dir.path().join("nope.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_null_initial_filters_are_inactive() {
        let spec: TableSpec = r#"{
            "columns": [{"key": "status", "label": "Status"}],
            "filters": [{"key": "status", "label": "Status"}],
            "initialFilters": {"status": null}
        }"#
        .parse()
        .unwrap();
        let definition = spec.into_definition().unwrap();

        assert!(definition.initial_filters.is_empty());
        assert_eq!(definition.filters[0], FilterDef::text("status", "Status"));
    }
}

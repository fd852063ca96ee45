//! Interactive table state.

use std::ops::Range;
use std::sync::Arc;

use crate::config::TableDefinition;
use crate::error::ExportError;
use crate::error::PageError;
use crate::error::SourceError;
use crate::export::ExportFile;
use crate::export::FileSink;
use crate::export::export_view;
use crate::model::Record;
use crate::query::FilterValue;
use crate::query::FilterValues;
use crate::query::PageInfo;
use crate::query::Pagination;
use crate::query::SortState;
use crate::source::RecordSource;
use crate::view::View;
use crate::view::ViewCache;

/// The rows on the current page.
#[derive(Debug, Clone)]
pub struct PageRows {
    view: Arc<View>,
    window: Range<usize>,
}

impl PageRows {
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        if index < self.len() {
            self.view.get(self.window.start + index)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.window.clone().filter_map(|i| self.view.get(i))
    }
}

/// State of one interactive table.
///
/// The session owns the records and everything the user can change: filter
/// values, sort, page and page size. The view is derived from that state on
/// demand and memoized, so reading it repeatedly without changes is cheap.
///
/// # Example
///
/// ```
/// use tablekit_lib::config::TableDefinition;
/// use tablekit_lib::model::{Column, Record};
/// use tablekit_lib::query::{Comparison, FilterDef, FilterValue};
/// use tablekit_lib::session::TableSession;
///
/// let definition = TableDefinition::new(vec![
///     Column::new("id", "ID").sortable(),
///     Column::new("amount", "Amount").sortable(),
/// ])
/// .with_filters(vec![FilterDef::number("amount", "Min. Amount", Comparison::Greater)]);
///
/// let records = (1..=30i64)
///     .map(|i| Record::new().set("id", i).set("amount", i * 10))
///     .collect();
/// let mut session = TableSession::with_records(definition, records);
///
/// session.set_filter("amount", Some(FilterValue::Number(100.0)));
/// session.toggle_sort("amount");
/// session.toggle_sort("amount");
///
/// assert_eq!(session.view().len(), 20);
/// assert_eq!(session.page_info().to_string(), "1-10 of 20");
/// ```
#[derive(Debug)]
pub struct TableSession {
    definition: TableDefinition,
    records: Arc<Vec<Record>>,
    filters: FilterValues,
    sort: Option<SortState>,
    pagination: Pagination,
    loading: bool,
    cache: ViewCache,
}

// Holds the loading flag up until dropped.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn new(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl TableSession {
    /// Creates a session with no records, starting from the definition's
    /// initial filters, sort and pagination.
    pub fn new(definition: TableDefinition) -> Self {
        Self::with_records(definition, Vec::new())
    }

    /// Creates a session over `records`.
    pub fn with_records(definition: TableDefinition, records: Vec<Record>) -> Self {
        Self {
            filters: definition.initial_filters.clone(),
            sort: definition.initial_sort.clone(),
            pagination: definition.pagination.clone(),
            definition,
            records: Arc::new(records),
            loading: false,
            cache: ViewCache::new(),
        }
    }

    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    /// The full record collection, unfiltered.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Replaces the record collection.
    ///
    /// Filters and sort are kept. The page is pulled back if the new view is
    /// shorter.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = Arc::new(records);
        let total = self.view().len();
        self.pagination.clamp(total);
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Fetches records from `source` and swaps them in.
    ///
    /// The session reports loading while the fetch runs, and stops reporting
    /// it if the returned future is dropped early. On failure the previous
    /// records stay in place and the error is returned.
    pub async fn load(&mut self, source: &dyn RecordSource) -> Result<usize, SourceError> {
        let loading = LoadingGuard::new(&mut self.loading);
        let result = source.fetch().await;
        drop(loading);

        match result {
            Ok(records) => {
                let count = records.len();
                log::info!("Loaded {} records from {}", count, source.describe());
                self.replace_records(records);
                Ok(count)
            }
            Err(e) => {
                log::warn!("Failed to load records from {}: {}", source.describe(), e);
                Err(e)
            }
        }
    }

    /// Finds a record by its identifier, compared by text form.
    pub fn row_by_id(&self, id: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|record| record.id().is_some_and(|value| value.to_text() == id))
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn filters(&self) -> &FilterValues {
        &self.filters
    }

    /// Sets or clears one filter value and returns to the first page.
    pub fn set_filter(&mut self, key: impl Into<String>, value: Option<FilterValue>) {
        let key = key.into();
        match value {
            Some(value) => self.filters.set(key, value),
            None => {
                self.filters.remove(&key);
            }
        }
        self.pagination.reset();
    }

    /// Clears one filter value and returns to the first page.
    pub fn clear_filter(&mut self, key: &str) {
        self.set_filter(key, None);
    }

    /// Clears every filter value and returns to the first page.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.pagination.reset();
    }

    /// Filter values that currently constrain the view.
    pub fn active_filters(&self) -> Vec<(&str, &FilterValue)> {
        self.filters.active().collect()
    }

    /// Returns `true` if any filter constrains the view.
    pub fn has_filters(&self) -> bool {
        self.filters.active().next().is_some()
    }

    // =========================================================================
    // Sort
    // =========================================================================

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// Handles a click on a column header.
    ///
    /// Returns `false` and changes nothing if the column does not exist or is
    /// not sortable.
    pub fn toggle_sort(&mut self, field: &str) -> bool {
        match self.definition.column(field) {
            Some(column) if column.sortable => {
                self.sort = Some(SortState::toggle(self.sort.as_ref(), field));
                true
            }
            _ => {
                log::debug!("Ignoring sort request for '{}'", field);
                false
            }
        }
    }

    /// Sets the sort directly; `None` restores input order.
    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Moves to a zero-based page. Pages past the end show no rows.
    pub fn set_page(&mut self, page: usize) {
        self.pagination.set_page(page);
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), PageError> {
        self.pagination.set_page_size(page_size)
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.view().len();
        self.pagination.next(total)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pagination.prev()
    }

    pub fn last_page(&mut self) {
        let total = self.view().len();
        self.pagination.last(total);
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// The filtered and sorted view of all records.
    pub fn view(&mut self) -> Arc<View> {
        self.cache.get_or_build(
            &self.records,
            &self.definition.filters,
            &self.filters,
            self.sort.as_ref(),
        )
    }

    /// Rows of the current page. Empty while loading.
    pub fn visible_rows(&mut self) -> PageRows {
        let view = self.view();
        let window = if self.loading {
            0..0
        } else {
            self.pagination.window(view.len())
        };
        PageRows { view, window }
    }

    /// Number of placeholder rows to show while loading.
    pub fn skeleton_rows(&self) -> usize {
        if self.loading {
            self.pagination.page_size()
        } else {
            0
        }
    }

    /// Position of the current page in the view.
    pub fn page_info(&mut self) -> PageInfo {
        let total = self.view().len();
        self.pagination.info(total)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Returns `true` if the export action should be enabled.
    pub fn can_export(&mut self) -> bool {
        self.export_guard().is_none()
    }

    fn export_guard(&mut self) -> Option<ExportError> {
        if !self.definition.exportable {
            Some(ExportError::Disabled)
        } else if self.loading {
            Some(ExportError::Loading)
        } else if self.view().is_empty() {
            Some(ExportError::EmptyView)
        } else {
            None
        }
    }

    /// Exports the whole view, not just the current page, to `sink`.
    ///
    /// Refused without calling the sink while loading, when the view is
    /// empty, or when the table is not exportable.
    pub async fn export(&mut self, sink: &dyn FileSink) -> Result<ExportFile, ExportError> {
        if let Some(refusal) = self.export_guard() {
            log::debug!("Export refused: {}", refusal);
            return Err(refusal);
        }
        let view = self.view();
        export_view(&view, &self.definition.columns, &self.definition.export, sink).await
    }
}

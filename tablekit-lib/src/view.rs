//! The filtered and sorted view of a record collection.

use std::sync::Arc;

use crate::model::Record;
use crate::query::FilterDef;
use crate::query::FilterValues;
use crate::query::SortState;
use crate::query::matches_all;
use crate::query::paginate;

/// A read-only, ordered selection of records.
///
/// The view shares the record collection it was built from and stores only
/// the indices of the rows it keeps, in display order.
#[derive(Debug, Clone)]
pub struct View {
    records: Arc<Vec<Record>>,
    rows: Vec<usize>,
}

impl View {
    /// A view of every record in input order.
    pub fn all(records: Arc<Vec<Record>>) -> Self {
        let rows = (0..records.len()).collect();
        Self { records, rows }
    }

    /// Number of rows in the view.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index` in view order.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.rows.get(index).map(|&i| &self.records[i])
    }

    /// Rows in view order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Record> + '_ {
        self.rows.iter().map(|&i| &self.records[i])
    }

    /// Positions of the rows in the source collection, in view order.
    pub fn indices(&self) -> &[usize] {
        &self.rows
    }

    /// Rows of one page.
    pub fn page(&self, page: usize, page_size: usize) -> Vec<&Record> {
        paginate(&self.rows, page, page_size)
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    /// The collection this view selects from.
    pub fn source(&self) -> &Arc<Vec<Record>> {
        &self.records
    }
}

/// Builds the view for the given filter values and sort.
///
/// Filters run first, then a stable sort, so records that compare equal keep
/// their input order. Without a sort the filtered rows stay in input order.
pub fn build_view(
    records: Arc<Vec<Record>>,
    filters: &[FilterDef],
    values: &FilterValues,
    sort: Option<&SortState>,
) -> View {
    let mut rows: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_all(record, values, filters))
        .map(|(i, _)| i)
        .collect();

    if let Some(sort) = sort {
        rows.sort_by(|&a, &b| sort.compare(&records[a], &records[b]));
    }

    View { records, rows }
}

struct CachedView {
    records: Arc<Vec<Record>>,
    values: FilterValues,
    sort: Option<SortState>,
    view: Arc<View>,
}

impl CachedView {
    fn matches(&self, records: &Arc<Vec<Record>>, values: &FilterValues, sort: Option<&SortState>) -> bool {
        Arc::ptr_eq(&self.records, records) && self.values == *values && self.sort.as_ref() == sort
    }
}

/// Remembers the last view and rebuilds only when its inputs change.
///
/// Inputs are the record collection (by identity), the filter values and the
/// sort state. Filter definitions are expected to stay fixed for the life of
/// the cache; call [`ViewCache::invalidate`] if they change.
#[derive(Default)]
pub struct ViewCache {
    last: Option<CachedView>,
    builds: usize,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the view for these inputs, reusing the last one if they match.
    pub fn get_or_build(
        &mut self,
        records: &Arc<Vec<Record>>,
        filters: &[FilterDef],
        values: &FilterValues,
        sort: Option<&SortState>,
    ) -> Arc<View> {
        if let Some(cached) = self.last.as_ref().filter(|c| c.matches(records, values, sort)) {
            log::debug!("View cache hit ({} rows)", cached.view.len());
            return Arc::clone(&cached.view);
        }

        let view = Arc::new(build_view(Arc::clone(records), filters, values, sort));
        self.builds += 1;
        log::debug!(
            "Rebuilt view: {} of {} records, sort {:?}",
            view.len(),
            records.len(),
            sort
        );

        self.last = Some(CachedView {
            records: Arc::clone(records),
            values: values.clone(),
            sort: sort.cloned(),
            view: Arc::clone(&view),
        });
        view
    }

    /// Drops the remembered view.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Number of times a view has been built.
    pub fn builds(&self) -> usize {
        self.builds
    }
}

impl std::fmt::Debug for ViewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewCache")
            .field("cached", &self.last.is_some())
            .field("builds", &self.builds)
            .finish()
    }
}

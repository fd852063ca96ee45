//! Filtering, sorting and pagination.
//!
//! # Types
//!
//! - [`FilterDef`] - A filterable dimension of the table (text, number, select, date range)
//! - [`FilterValues`] - The current value of each filter
//! - [`SortState`] - The sort column and direction
//! - [`Pagination`] - The current page and page size
//!
//! Records pass through [`matches_all`] first, are then ordered with
//! [`compare_records`], and only the result is paged with [`paginate`].

mod filter;
mod order;
mod page;

pub use filter::Comparison;
pub use filter::DateRange;
pub use filter::FilterDef;
pub use filter::FilterKind;
pub use filter::FilterValue;
pub use filter::FilterValues;
pub use filter::SelectOption;
pub use filter::matches_all;
pub use order::Direction;
pub use order::SortState;
pub use order::collate;
pub use order::compare_records;
pub use order::compare_values;
pub use page::DEFAULT_PAGE_SIZE;
pub use page::DEFAULT_PAGE_SIZE_OPTIONS;
pub use page::PageInfo;
pub use page::Pagination;
pub use page::page_window;
pub use page::paginate;

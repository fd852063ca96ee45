//! In-memory table engine
//!
//! Filters, sorts, paginates and exports a collection of heterogeneous
//! records for an interactive table. Filtering always runs before sorting,
//! and sorting before pagination; exports always cover the whole filtered
//! and sorted view.
//!
//! Most callers only need a [`TableSession`](session::TableSession) built
//! from a [`TableDefinition`](config::TableDefinition).

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod query;
pub mod render;
pub mod session;
pub mod source;
pub mod view;

pub use config::TableDefinition;
pub use session::TableSession;

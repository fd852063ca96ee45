//! Error types
//!
//! Filtering, sorting, pagination and CSV serialization are total and never
//! fail. Errors only come from the collaborators around them: record
//! retrieval, file delivery, table configuration and page size changes.

mod config;
mod delivery;
mod export;
mod page;
mod source;

pub use config::*;
pub use delivery::*;
pub use export::*;
pub use page::*;
pub use source::*;

//! Table configuration errors

use std::path::PathBuf;

/// Errors that can occur while loading or validating a table definition.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the definition file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The definition is not valid JSON for a table.
    #[error("Invalid table definition: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two filters share the same key.
    #[error("Duplicate filter key '{0}'")]
    DuplicateFilterKey(String),

    /// A reference to a column that is not defined.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// The page size is zero or not among the options.
    #[error("Invalid page size {size}: options are {options:?}")]
    InvalidPageSize { size: usize, options: Vec<usize> },

    /// No page size options were given.
    #[error("Page size options must not be empty")]
    EmptyPageSizes,
}

impl ConfigError {
    /// Creates a new I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a new duplicate filter key error.
    pub fn duplicate_filter(key: impl Into<String>) -> Self {
        Self::DuplicateFilterKey(key.into())
    }

    /// Creates a new unknown column error.
    pub fn unknown_column(key: impl Into<String>) -> Self {
        Self::UnknownColumn(key.into())
    }

    /// Creates a new invalid page size error.
    pub fn invalid_page_size(size: usize, options: &[usize]) -> Self {
        Self::InvalidPageSize {
            size,
            options: options.to_vec(),
        }
    }
}

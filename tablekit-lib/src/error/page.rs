//! Pagination errors

/// Errors returned when changing pagination settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The page size is not one of the offered options.
    #[error("Page size {size} is not one of {options:?}")]
    UnsupportedPageSize { size: usize, options: Vec<usize> },
}

impl PageError {
    /// Creates a new unsupported page size error.
    pub fn unsupported(size: usize, options: &[usize]) -> Self {
        Self::UnsupportedPageSize {
            size,
            options: options.to_vec(),
        }
    }
}

//! Export pipeline errors

use super::DeliveryError;

/// Errors returned by the export pipeline.
///
/// The first three variants mean export is disabled and the sink was never
/// called.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// There are no rows in the current view.
    #[error("Nothing to export: the view is empty")]
    EmptyView,

    /// Records are still loading.
    #[error("Cannot export while records are loading")]
    Loading,

    /// The table does not allow exporting.
    #[error("Export is disabled for this table")]
    Disabled,

    /// Writing the CSV content failed.
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The sink failed to deliver the file.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl ExportError {
    /// Returns `true` if export was refused before reaching the sink.
    pub fn is_guard(&self) -> bool {
        matches!(self, Self::EmptyView | Self::Loading | Self::Disabled)
    }
}

//! Export of the current view as a downloadable file.
//!
//! The pipeline serializes the entire filtered and sorted view (never just
//! the visible page) with [`csv::to_csv`] and hands the result to a
//! [`FileSink`], the delivery boundary. Sinks decide what "delivery" means:
//! [`DiskSink`] writes into a directory, [`MemorySink`] keeps files in memory.

pub mod csv;

use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::DeliveryError;
use crate::error::ExportError;
use crate::model::Column;
use crate::view::View;

/// Content type attached to CSV exports unless the caller overrides it.
pub const DEFAULT_MIME: &str = "text/csv;charset=utf-8;";

/// File name used when a table does not choose one.
pub const DEFAULT_FILENAME: &str = "exported-data.csv";

/// A serialized export ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub content: String,
    pub filename: String,
    pub mime: String,
}

/// File name and content type of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub filename: String,
    pub mime: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            mime: DEFAULT_MIME.to_string(),
        }
    }
}

impl ExportOptions {
    /// Sets the file name (builder pattern).
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Sets the content type (builder pattern).
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }
}

/// Destination for exported files.
#[async_trait]
pub trait FileSink: Send + Sync {
    /// Delivers the file.
    async fn deliver(&self, file: &ExportFile) -> Result<(), DeliveryError>;
}

/// Writes exports into a directory, one file per export.
///
/// Files are named by [`ExportFile::filename`]; an existing file with the
/// same name is replaced.
#[derive(Debug, Clone)]
pub struct DiskSink {
    dir: PathBuf,
}

impl DiskSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an export with this file name is written to.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        // Only the final component is used so a name cannot escape `dir`
        let name = Path::new(filename)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILENAME));
        self.dir.join(name)
    }
}

#[async_trait]
impl FileSink for DiskSink {
    async fn deliver(&self, file: &ExportFile) -> Result<(), DeliveryError> {
        let path = self.path_for(&file.filename);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DeliveryError::io(&self.dir, e))?;
        tokio::fs::write(&path, file.content.as_bytes())
            .await
            .map_err(|e| DeliveryError::io(&path, e))?;
        log::info!("Wrote {} ({} bytes)", path.display(), file.content.len());
        Ok(())
    }
}

/// Keeps delivered exports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<ExportFile>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every file delivered so far, oldest first.
    pub async fn files(&self) -> Vec<ExportFile> {
        self.files.lock().await.clone()
    }

    /// The most recently delivered file.
    pub async fn last(&self) -> Option<ExportFile> {
        self.files.lock().await.last().cloned()
    }
}

#[async_trait]
impl FileSink for MemorySink {
    async fn deliver(&self, file: &ExportFile) -> Result<(), DeliveryError> {
        self.files.lock().await.push(file.clone());
        Ok(())
    }
}

/// Serializes a view without delivering it.
pub fn render_export(
    view: &View,
    columns: &[Column],
    options: &ExportOptions,
) -> Result<ExportFile, ExportError> {
    Ok(ExportFile {
        content: csv::to_csv(columns, view.iter())?,
        filename: options.filename.clone(),
        mime: options.mime.clone(),
    })
}

/// Serializes every row of `view` and delivers the file to `sink`.
///
/// An empty view is refused with [`ExportError::EmptyView`] before the sink
/// is called.
pub async fn export_view(
    view: &View,
    columns: &[Column],
    options: &ExportOptions,
    sink: &dyn FileSink,
) -> Result<ExportFile, ExportError> {
    if view.is_empty() {
        return Err(ExportError::EmptyView);
    }

    let file = render_export(view, columns, options)?;
    sink.deliver(&file).await?;
    log::info!("Exported {} rows as {}", view.len(), file.filename);
    Ok(file)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::Record;

    fn view() -> View {
        View::all(Arc::new(vec![
            Record::new().set("id", 1i64).set("name", "Cagatay"),
            Record::new().set("id", 2i64).set("name", "Eray"),
        ]))
    }

    fn columns() -> Vec<Column> {
        vec![Column::new("id", "ID"), Column::new("name", "Name")]
    }

    #[tokio::test]
    async fn test_export_to_memory() {
        let sink = MemorySink::new();
        let file = export_view(&view(), &columns(), &ExportOptions::default(), &sink)
            .await
            .unwrap();

        assert_eq!(file.content, "ID,Name\n\"1\",\"Cagatay\"\n\"2\",\"Eray\"");
        assert_eq!(file.filename, "exported-data.csv");
        assert_eq!(file.mime, "text/csv;charset=utf-8;");
        assert_eq!(sink.last().await, Some(file));
    }

    #[tokio::test]
    async fn test_empty_view_is_refused() {
        let sink = MemorySink::new();
        let empty = View::all(Arc::new(Vec::new()));
        let result = export_view(&empty, &columns(), &ExportOptions::default(), &sink).await;

        assert!(matches!(result, Err(ExportError::EmptyView)));
        assert!(sink.files().await.is_empty());
    }

    #[tokio::test]
    async fn test_disk_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DiskSink::new(dir.path().join("exports"));
        let options = ExportOptions::default()
            .filename("payments.csv")
            .mime("text/plain");

        let file = export_view(&view(), &columns(), &options, &sink).await.unwrap();
        let written = std::fs::read_to_string(dir.path().join("exports/payments.csv")).unwrap();

        assert_eq!(written, file.content);
        assert_eq!(file.mime, "text/plain");
    }

    #[test]
    fn test_disk_sink_keeps_files_inside_dir() {
        let sink = DiskSink::new("/tmp/out");
        assert_eq!(sink.path_for("../../etc/passwd"), PathBuf::from("/tmp/out/passwd"));
        assert_eq!(sink.path_for(".."), PathBuf::from("/tmp/out/exported-data.csv"));
    }

    struct FailingSink;

    #[async_trait]
    impl FileSink for FailingSink {
        async fn deliver(&self, _file: &ExportFile) -> Result<(), DeliveryError> {
            Err(DeliveryError::rejected("quota exceeded"))
        }
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let result = export_view(&view(), &columns(), &ExportOptions::default(), &FailingSink).await;
        let err = result.unwrap_err();

        assert!(!err.is_guard());
        assert_eq!(err.to_string(), "Delivery rejected: quota exceeded");
    }
}

//! PDF writing and saving operations.
//!
//! Documents are written to a sibling `.tmp` file and renamed into place,
//! so a failed save never leaves a truncated output behind.
//!
//! # Examples
//!
//! ```no_run
//! use pagemerge::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&doc, Path::new("merged.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PageMergeError, Result};
use crate::io::format_file_size;

/// Buffer size for writing (in bytes).
const BUFFER_SIZE: usize = 8192;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes finished documents to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl PdfWriter {
    /// Create a new PDF writer.
    pub fn new() -> Self {
        Self
    }

    /// Save a PDF document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, written or renamed
    /// into place.
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<()> {
        self.save_with_stats(doc, path).await.map(|_| ())
    }

    /// Save a PDF and return statistics about the operation.
    pub async fn save_with_stats(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        // Clone the document for processing in blocking task
        let mut doc_clone = doc.clone();

        task::spawn_blocking(move || {
            let start = Instant::now();
            let write_path = path_buf.with_extension("tmp");

            let file = std::fs::File::create(&write_path).map_err(|e| {
                PageMergeError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(BUFFER_SIZE, file);

            doc_clone
                .save_to(&mut writer)
                .map_err(|e| PageMergeError::FailedToWrite {
                    path: write_path.clone(),
                    source: std::io::Error::other(e),
                })?;

            writer.flush().map_err(|e| PageMergeError::FailedToWrite {
                path: write_path.clone(),
                source: e,
            })?;

            std::fs::rename(&write_path, &path_buf).map_err(|e| PageMergeError::FailedToWrite {
                path: path_buf.clone(),
                source: e,
            })?;

            let file_size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);

            Ok::<_, PageMergeError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PageMergeError::other(format!("Write task failed: {e}")))?
    }

    /// Check that the output directory exists and is writable.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
                PageMergeError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                ))
            })?;

            if !metadata.is_dir() {
                return Err(PageMergeError::invalid_config(format!(
                    "Output location is not a directory: {}",
                    parent.display()
                )));
            }

            if metadata.permissions().readonly() {
                return Err(PageMergeError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

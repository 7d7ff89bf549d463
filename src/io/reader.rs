//! PDF reading and loading operations.
//!
//! Source documents are kept twice: as the raw bytes (handed to the
//! rasterizer) and as a parsed [`lopdf::Document`] (used by the merge).
//!
//! # Examples
//!
//! ```no_run
//! use pagemerge::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let results = reader.load_sequential(&paths).await;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PageMergeError, Result};
use crate::io::format_file_size;

/// A loaded source document.
#[derive(Debug, Clone)]
pub struct LoadedPdf {
    /// Display name (file name for documents read from disk).
    pub name: String,

    /// Path to the source file, if it came from disk.
    pub path: Option<PathBuf>,

    /// Raw file contents.
    pub bytes: Arc<[u8]>,

    /// The parsed document.
    pub document: Document,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to parse the document.
    pub load_time: Duration,
}

impl LoadedPdf {
    /// Size of the source in bytes.
    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedPdf>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone)]
pub struct LoadStatistics {
    /// Number of PDFs successfully loaded.
    pub success_count: usize,

    /// Number of PDFs that failed to load.
    pub failure_count: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Total size of successfully loaded files.
    pub total_size: u64,

    /// Total number of pages loaded.
    pub total_pages: usize,
}

impl LoadStatistics {
    /// Create statistics from load results.
    pub fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut success_count = 0;
        let mut failure_count = 0;
        let mut total_size = 0;
        let mut total_pages = 0;

        for result in results {
            match result {
                Ok(loaded) => {
                    success_count += 1;
                    total_size += loaded.file_size();
                    total_pages += loaded.page_count;
                }
                Err(_) => {
                    failure_count += 1;
                }
            }
        }

        Self {
            success_count,
            failure_count,
            total_time,
            total_size,
            total_pages,
        }
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Loads source documents and checks that they can be merged.
#[derive(Debug, Clone, Copy)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is not a file
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - PDF has no pages
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PageMergeError::file_not_found(path.to_path_buf())
            } else {
                PageMergeError::Io { source: e }
            }
        })?;
        if !metadata.is_file() {
            return Err(PageMergeError::not_a_file(path.to_path_buf()));
        }

        let bytes: Arc<[u8]> = tokio::fs::read(path).await?.into();
        let name = display_name(path);

        // Parsing is CPU bound; keep it off the async workers.
        let reader = *self;
        let mut loaded = task::spawn_blocking(move || reader.parse(name, bytes))
            .await
            .map_err(|e| PageMergeError::other(format!("Load task failed: {e}")))??;

        loaded.path = Some(path.to_path_buf());
        Ok(loaded)
    }

    /// Load a document from bytes already in memory.
    pub fn load_bytes(&self, name: impl Into<String>, bytes: Vec<u8>) -> Result<LoadedPdf> {
        self.parse(name.into(), bytes.into())
    }

    /// Load multiple PDF documents sequentially, in the order provided.
    ///
    /// Returns one result per input file.
    pub async fn load_sequential(&self, paths: &[PathBuf]) -> Vec<LoadResult> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            let result = self.load(path).await;
            results.push(result);
        }

        results
    }

    /// Load all PDFs and report aggregate statistics.
    ///
    /// Documents are loaded one after another; their position in `paths`
    /// becomes their document index, so order matters.
    pub async fn load_all(&self, paths: &[PathBuf]) -> (Vec<LoadResult>, LoadStatistics) {
        let start = Instant::now();
        let results = self.load_sequential(paths).await;
        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }

    fn parse(&self, name: String, bytes: Arc<[u8]>) -> Result<LoadedPdf> {
        let start = Instant::now();

        let document = Document::load_mem(&bytes).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("encrypt") || err_msg.contains("password") {
                PageMergeError::encrypted_pdf(name.clone())
            } else {
                PageMergeError::failed_to_load_pdf(name.clone(), err_msg)
            }
        })?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PageMergeError::corrupted_pdf(name, "PDF has no pages"));
        }

        log::debug!("parsed {name}: {page_count} page(s), {} bytes", bytes.len());

        Ok(LoadedPdf {
            name,
            path: None,
            bytes,
            document,
            page_count,
            load_time: start.elapsed(),
        })
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

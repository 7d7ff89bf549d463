//! Error types for pagemerge.
//!
//! This module defines all error types that can occur while loading source
//! documents, editing the page layout and assembling the merged PDF.
//! Errors are designed to be informative and actionable, providing clear
//! context about what went wrong and how to fix it.
//!
//! # Error Categories
//!
//! - **I/O Errors**: File not found, permission denied, etc.
//! - **PDF Errors**: Invalid PDF structure, corrupted or encrypted files
//! - **Layout Errors**: Duplicate pages, unknown ids, bad layout files
//! - **Merge Errors**: Problems while assembling the output document

use std::io;
use std::path::PathBuf;

/// Result type alias for pagemerge operations.
pub type Result<T> = std::result::Result<T, PageMergeError>;

/// Main error type for pagemerge operations.
#[derive(Debug, thiserror::Error)]
pub enum PageMergeError {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Failed to load a source document.
    #[error("Failed to load PDF: {name}\n  Reason: {reason}")]
    FailedToLoadPdf {
        /// Display name of the document.
        name: String,
        /// Reason for the failure.
        reason: String,
    },

    /// Source document has an invalid structure.
    #[error("Corrupted or invalid PDF: {name}\n  Details: {details}")]
    CorruptedPdf {
        /// Display name of the document.
        name: String,
        /// Details about the corruption.
        details: String,
    },

    /// Source document is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {name}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools"
    )]
    EncryptedPdf {
        /// Display name of the document.
        name: String,
    },

    /// A single page could not be rasterized.
    #[error("Failed to rasterize page {page_index} of document {document}: {reason}")]
    RasterizeFailed {
        /// Source document index.
        document: usize,
        /// 0-based page index within the document.
        page_index: u32,
        /// Reason reported by the rasterizer.
        reason: String,
    },

    /// A page batch contained an id that is already registered.
    #[error("Duplicate page id: {id}")]
    DuplicatePage {
        /// The offending page id.
        id: String,
    },

    /// Group names must contain at least one visible character.
    #[error("Invalid group name: {name:?}")]
    InvalidGroupName {
        /// The rejected name.
        name: String,
    },

    /// A page id does not name a registered page.
    #[error("Unknown page: {id}")]
    UnknownPage {
        /// The unknown id.
        id: String,
    },

    /// A group id does not name an existing group.
    #[error("Unknown group: {id}")]
    UnknownGroup {
        /// The unknown id.
        id: String,
    },

    /// Layout file could not be parsed or applied.
    #[error("Invalid layout: {details}")]
    InvalidLayout {
        /// What is wrong with the layout.
        details: String,
    },

    /// Every page has been deleted; there is nothing to assemble.
    #[error("No pages left to merge")]
    NoPagesToMerge,

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output name",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PageMergeError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl From<serde_json::Error> for PageMergeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidLayout {
            details: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for PageMergeError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PageMergeError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            name: name.into(),
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(name: impl Into<String>) -> Self {
        Self::EncryptedPdf { name: name.into() }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidLayout error.
    pub fn invalid_layout(details: impl Into<String>) -> Self {
        Self::InvalidLayout {
            details: details.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::RasterizeFailed { .. } => 3,
            Self::DuplicatePage { .. } => 1,
            Self::InvalidGroupName { .. } => 1,
            Self::UnknownPage { .. } => 1,
            Self::UnknownGroup { .. } => 1,
            Self::InvalidLayout { .. } => 1,
            Self::NoPagesToMerge => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}

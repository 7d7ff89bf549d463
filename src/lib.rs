//! pagemerge - reorder, group and merge PDF pages.
//!
//! This library holds the editing model behind a page-merging front end:
//!
//! - Loading source PDFs and rasterizing page thumbnails in batches
//! - A flat page registry plus named, ordered groups
//! - Drag-and-drop gestures that move pages and groups
//! - Assembling one PDF with a linked table-of-contents page
//! - An embedded layout so merged output can be regrouped later
//!
//! # Examples
//!
//! ```no_run
//! use pagemerge::config::MergeOptions;
//! use pagemerge::io::{PdfReader, PdfWriter};
//! use pagemerge::workspace::Workspace;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let mut workspace = Workspace::new();
//! for path in ["intro.pdf", "body.pdf"] {
//!     let index = workspace.add_document(reader.load(&PathBuf::from(path)).await?);
//!     workspace.register_pages(index)?;
//! }
//!
//! let intro = workspace.create_group("Intro")?;
//! workspace.apply_raw_gesture("f0-p0", intro.as_str());
//!
//! if let Some(merged) = workspace.merge(&MergeOptions::default()).await? {
//!     PdfWriter::new()
//!         .save(&merged.document, &PathBuf::from("merged.pdf"))
//!         .await?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod merge;
pub mod model;
pub mod output;
pub mod raster;
pub mod reorder;
pub mod utils;
pub mod workspace;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{PageMergeError, Result};
pub use workspace::Workspace;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! PDF merge assembly.
//!
//! This module turns a [`MergePlan`] (sections of pages in output order) into
//! a single document:
//! - Page copying with inherited attributes resolved
//! - Optional `Group: {name}` labels on grouped pages
//! - A table-of-contents page with internal links
//! - Bookmarks and document metadata
//! - An embedded layout attachment used to restore groups later
//!
//! # Examples
//!
//! ```no_run
//! use pagemerge::config::MergeOptions;
//! use pagemerge::io::LoadedPdf;
//! use pagemerge::merge::{Assembler, MergePlan};
//!
//! # async fn example(sources: Vec<LoadedPdf>, plan: MergePlan) -> Result<(), Box<dyn std::error::Error>> {
//! let options = MergeOptions::default();
//! let merged = Assembler::new(&sources, &options).assemble(&plan).await?;
//! for entry in &merged.toc {
//!     println!("{}", entry.label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod bookmarks;
pub mod labels;
pub mod layout;
pub mod metadata;
pub mod pages;
pub mod toc;

pub use assembler::{Assembler, MergePlan, MergeStatistics, MergedDocument, PlannedSection};
pub use bookmarks::BookmarkManager;
pub use layout::{EmbeddedLayout, read_embedded};
pub use metadata::MetadataManager;
pub use toc::TocEntry;

use lopdf::{Object, StringFormat};

/// Encode a PDF text string.
///
/// ASCII text is written as-is; anything else as UTF-16BE with a byte order
/// mark.
pub(crate) fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Decode a PDF text string written by [`text_string`] or a PDFDoc string.
pub(crate) fn decode_text_string(bytes: &[u8]) -> Option<String> {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        _ => Some(bytes.iter().map(|&b| b as char).collect()),
    }
}

//! Page identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a source document in load order.
pub type DocumentIndex = usize;

/// Stable page identifier, `f{document}-p{page}`.
///
/// Derived from the source position alone, so the same page of the same
/// document always receives the same id and an id is never handed out twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Build the id for page `page` (0-based) of document `document`.
    pub fn new(document: DocumentIndex, page: u32) -> Self {
        Self(format!("f{document}-p{page}"))
    }

    /// Split an id back into `(document, page)`.
    ///
    /// Returns `None` for strings that were not produced by [`PageId::new`].
    pub fn parse(raw: &str) -> Option<(DocumentIndex, u32)> {
        let rest = raw.strip_prefix('f')?;
        let (document, page) = rest.split_once("-p")?;
        Some((document.parse().ok()?, page.parse().ok()?))
    }

    /// Wrap a raw string that is known to be well formed.
    pub fn from_raw(raw: &str) -> Option<Self> {
        Self::parse(raw).map(|(document, page)| Self::new(document, page))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single page of a source document.
///
/// Pages never change after creation; only their position in the registry
/// or their group membership does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    id: PageId,
    document: DocumentIndex,
    page_index: u32,
}

impl Page {
    /// Create the page at `page_index` (0-based) of `document`.
    pub fn new(document: DocumentIndex, page_index: u32) -> Self {
        Self {
            id: PageId::new(document, page_index),
            document,
            page_index,
        }
    }

    /// Stable id of this page.
    pub fn id(&self) -> &PageId {
        &self.id
    }

    /// Index of the source document.
    pub fn document(&self) -> DocumentIndex {
        self.document
    }

    /// 0-based index of the page within its source document.
    pub fn page_index(&self) -> u32 {
        self.page_index
    }
}

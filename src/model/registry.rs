//! Ordered registry of every page known to a workspace.
//!
//! Insertion order is the display order, and the merge order for pages
//! that do not belong to any group.

use std::collections::HashSet;

use crate::error::{PageMergeError, Result};
use crate::model::page::{Page, PageId};

/// Flat, ordered list of pages with unique ids.
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: Vec<Page>,
}

impl PageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of pages to the end of the order.
    ///
    /// The batch is rejected as a whole if any id is already registered or
    /// appears twice within the batch; the registry is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PageMergeError::DuplicatePage`] naming the first offending id.
    pub fn append(&mut self, pages: Vec<Page>) -> Result<()> {
        let mut incoming = HashSet::with_capacity(pages.len());
        for page in &pages {
            if self.contains(page.id()) || !incoming.insert(page.id()) {
                return Err(PageMergeError::DuplicatePage {
                    id: page.id().to_string(),
                });
            }
        }

        self.pages.extend(pages);
        Ok(())
    }

    /// Remove a page by id, returning it if it was present.
    pub fn remove(&mut self, id: &PageId) -> Option<Page> {
        let index = self.index_of(id)?;
        Some(self.pages.remove(index))
    }

    /// Move `id` so that it sits immediately before `before`.
    ///
    /// Returns false (and changes nothing) if either id is unknown or both
    /// name the same page.
    pub fn reorder(&mut self, id: &PageId, before: &PageId) -> bool {
        if id == before {
            return false;
        }
        let (Some(from), Some(_)) = (self.index_of(id), self.index_of(before)) else {
            return false;
        };

        let page = self.pages.remove(from);
        // Look the target up again: removal shifts everything after `from`.
        let to = self.index_of(before).unwrap_or(self.pages.len());
        self.pages.insert(to, page);
        true
    }

    /// Move a page to the end of the order.
    pub fn move_to_end(&mut self, id: &PageId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                let page = self.pages.remove(index);
                self.pages.push(page);
                true
            }
            None => false,
        }
    }

    /// Position of a page in the order.
    pub fn index_of(&self, id: &PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id() == id)
    }

    /// Look up a page by id.
    pub fn get(&self, id: &PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id() == id)
    }

    /// Check whether a page is registered.
    pub fn contains(&self, id: &PageId) -> bool {
        self.index_of(id).is_some()
    }

    /// Iterate pages in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Ids in registry order.
    pub fn ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|page| page.id().clone()).collect()
    }

    /// Number of registered pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Check if the registry holds no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

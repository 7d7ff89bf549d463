//! Bookmark (outline) management for merged PDFs.
//!
//! One outline item is created per table-of-contents section, pointing at the
//! section's first page.

use crate::error::{PageMergeError, Result};
use crate::merge::text_string;
use crate::merge::toc::TocEntry;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Manager for PDF bookmarks (outlines).
pub struct BookmarkManager;

impl BookmarkManager {
    /// Create a new bookmark manager.
    pub fn new() -> Self {
        Self
    }

    /// Add one bookmark per section.
    ///
    /// `sections` pairs each entry with the object id of its first page.
    /// Returns the number of bookmarks created.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no catalog.
    pub fn add_section_bookmarks(
        &self,
        doc: &mut Document,
        sections: &[(TocEntry, ObjectId)],
    ) -> Result<usize> {
        if sections.is_empty() {
            return Ok(0);
        }

        let items: Vec<(String, ObjectId)> = sections
            .iter()
            .map(|(entry, page_id)| (entry.name.clone(), *page_id))
            .collect();

        self.create_outline_structure(doc, &items)?;

        Ok(items.len())
    }

    /// Create the PDF outline structure.
    fn create_outline_structure(&self, doc: &mut Document, items: &[(String, ObjectId)]) -> Result<()> {
        // Create outline dictionary (root)
        let outline_id = doc.new_object_id();

        let item_ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

        for (i, ((title, page_id), item_id)) in items.iter().zip(&item_ids).enumerate() {
            // Destination array [page /XYZ null null null]
            let dest = vec![
                Object::Reference(*page_id),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ];

            let mut item_dict = Dictionary::new();
            item_dict.set("Title", text_string(title));
            item_dict.set("Parent", Object::Reference(outline_id));
            item_dict.set("Dest", Object::Array(dest));

            // Link items together (Prev/Next)
            if i > 0 {
                item_dict.set("Prev", Object::Reference(item_ids[i - 1]));
            }
            if let Some(next) = item_ids.get(i + 1) {
                item_dict.set("Next", Object::Reference(*next));
            }

            doc.objects.insert(*item_id, Object::Dictionary(item_dict));
        }

        let mut outline_dict = Dictionary::new();
        outline_dict.set("Type", Object::Name(b"Outlines".to_vec()));
        outline_dict.set("Count", Object::Integer(item_ids.len() as i64));

        if let (Some(first), Some(last)) = (item_ids.first(), item_ids.last()) {
            outline_dict.set("First", Object::Reference(*first));
            outline_dict.set("Last", Object::Reference(*last));
        }

        doc.objects
            .insert(outline_id, Object::Dictionary(outline_dict));

        let catalog = doc
            .catalog_mut()
            .map_err(|e| PageMergeError::merge_failed(format!("Failed to get catalog: {e}")))?;
        catalog.set("Outlines", Object::Reference(outline_id));
        catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

        Ok(())
    }

    /// Check if a document has bookmarks.
    pub fn has_bookmarks(&self, doc: &Document) -> bool {
        if let Ok(catalog) = doc.catalog() {
            catalog.has(b"Outlines")
        } else {
            false
        }
    }
}

impl Default for BookmarkManager {
    fn default() -> Self {
        Self::new()
    }
}

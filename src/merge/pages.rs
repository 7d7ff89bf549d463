//! Copying single pages between documents.
//!
//! A page dictionary can inherit `Resources`, `MediaBox`, `CropBox` and
//! `Rotate` from any ancestor in its page tree. The copy is inserted under a
//! different parent, so those attributes are materialized on the copied page.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

use crate::io::LoadedPdf;
use crate::model::DocumentIndex;
use crate::utils::copy_references;

/// Page attributes that may be inherited from the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when no MediaBox can be found.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum page tree depth followed when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

/// Follow a reference to the object it names.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up `key` on a page or the nearest ancestor that defines it.
pub fn inherited_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// The page's MediaBox, falling back to US Letter.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let Some(Object::Array(values)) =
        inherited_attribute(doc, page_id, b"MediaBox").and_then(|obj| resolve(doc, obj))
    else {
        return DEFAULT_MEDIA_BOX;
    };

    let numbers: Vec<f32> = values
        .iter()
        .filter_map(|v| resolve(doc, v).and_then(number))
        .collect();

    match numbers.as_slice() {
        [x0, y0, x1, y1] => [*x0, *y0, *x1, *y1],
        _ => DEFAULT_MEDIA_BOX,
    }
}

/// A source document renumbered into the output's id space.
struct PreparedSource {
    document: Document,
    pages: Vec<ObjectId>,
}

/// Copies pages from loaded sources into one output document.
///
/// Each source is cloned and renumbered the first time one of its pages is
/// needed, so object ids never collide and shared resources are copied once.
#[derive(Default)]
pub struct PageCopier {
    prepared: HashMap<DocumentIndex, PreparedSource>,
}

impl PageCopier {
    /// Create an empty copier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy one page under `parent` and return its id in `output`.
    ///
    /// Returns `None` when the document or page does not exist.
    pub fn copy_page(
        &mut self,
        output: &mut Document,
        parent: ObjectId,
        sources: &[LoadedPdf],
        document: DocumentIndex,
        page_index: u32,
    ) -> Option<ObjectId> {
        if !self.prepared.contains_key(&document) {
            let loaded = sources.get(document)?;
            let mut clone = loaded.document.clone();
            clone.renumber_objects_with(output.max_id + 1);
            output.max_id = output.max_id.max(clone.max_id);

            let pages = clone.get_pages().into_values().collect();
            self.prepared.insert(
                document,
                PreparedSource {
                    document: clone,
                    pages,
                },
            );
        }

        let source = self.prepared.get(&document)?;
        let page_id = *source.pages.get(page_index as usize)?;
        let mut page = source.document.get_dictionary(page_id).ok()?.clone();

        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited_attribute(&source.document, page_id, key)
            {
                page.set(key, value.clone());
            }
        }
        page.set("Parent", Object::Reference(parent));

        let page = Object::Dictionary(page);
        copy_references(output, &source.document, &page);
        output.objects.insert(page_id, page);

        Some(page_id)
    }
}

/// Build a root Pages dictionary holding `kids` in order.
pub fn pages_dictionary(kids: &[ObjectId]) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Pages".to_vec()));
    dict.set(
        "Kids",
        kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
    );
    dict.set("Count", kids.len() as i64);
    dict
}

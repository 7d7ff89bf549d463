//! Group layout embedded in merged PDFs.
//!
//! The merged document carries a small JSON attachment describing every
//! table-of-contents section. Adding that PDF to a workspace again lets the
//! groups be rebuilt exactly, without reading the visible page labels back.

use lopdf::{Dictionary, Document, Object, Stream, StringFormat, dictionary};
use serde::{Deserialize, Serialize};

use crate::error::{PageMergeError, Result};
use crate::merge::pages::resolve;
use crate::merge::toc::TocEntry;

/// File name of the attachment.
pub const ATTACHMENT_NAME: &str = "pagemerge-layout.json";

/// Format version written into the attachment.
pub const LAYOUT_VERSION: u32 = 1;

const MAX_NAME_TREE_DEPTH: usize = 16;

/// Sections of a merged document, with 1-based output page numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedLayout {
    /// Attachment format version.
    pub version: u32,
    /// One entry per table-of-contents line, in output order.
    pub sections: Vec<TocEntry>,
    /// Whether page 1 of the document is a generated table of contents.
    #[serde(default)]
    pub table_of_contents: bool,
}

impl EmbeddedLayout {
    /// Describe a freshly merged document.
    pub fn new(sections: Vec<TocEntry>, table_of_contents: bool) -> Self {
        Self {
            version: LAYOUT_VERSION,
            sections,
            table_of_contents,
        }
    }

    /// Sections that came from named groups.
    pub fn groups(&self) -> impl Iterator<Item = &TocEntry> {
        self.sections.iter().filter(|s| s.grouped)
    }
}

/// Attach `layout` to the document's embedded files.
pub fn embed(doc: &mut Document, layout: &EmbeddedLayout) -> Result<()> {
    let json = serde_json::to_vec(layout)?;
    let size = json.len() as i64;

    let file_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "EmbeddedFile",
            "Params" => dictionary! { "Size" => size },
        },
        json,
    ));

    let name = || Object::String(ATTACHMENT_NAME.as_bytes().to_vec(), StringFormat::Literal);
    let filespec_id = doc.add_object(dictionary! {
        "Type" => "Filespec",
        "F" => name(),
        "UF" => name(),
        "Desc" => Object::string_literal("pagemerge group layout"),
        "EF" => dictionary! { "F" => file_id },
    });

    let catalog = doc.catalog_mut()?;
    let mut names = match catalog.get(b"Names") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    names.set(
        "EmbeddedFiles",
        dictionary! {
            "Names" => vec![name(), Object::Reference(filespec_id)],
        },
    );
    catalog.set("Names", names);

    Ok(())
}

/// Read the layout attachment of a previously merged document.
///
/// Returns `Ok(None)` for documents without one.
///
/// # Errors
///
/// Fails when the attachment exists but cannot be parsed or was written by
/// an incompatible version.
pub fn read_embedded(doc: &Document) -> Result<Option<EmbeddedLayout>> {
    let Some(filespec) = find_attachment(doc) else {
        return Ok(None);
    };

    let stream = filespec
        .get(b"EF")
        .ok()
        .and_then(|ef| resolve(doc, ef))
        .and_then(|ef| ef.as_dict().ok())
        .and_then(|ef| ef.get(b"F").ok())
        .and_then(|f| resolve(doc, f))
        .and_then(|f| f.as_stream().ok())
        .ok_or_else(|| PageMergeError::invalid_layout("layout attachment has no file stream"))?;

    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let layout: EmbeddedLayout = serde_json::from_slice(&bytes)?;

    if layout.version != LAYOUT_VERSION {
        return Err(PageMergeError::invalid_layout(format!(
            "unsupported layout version {}",
            layout.version
        )));
    }

    Ok(Some(layout))
}

fn find_attachment(doc: &Document) -> Option<&Dictionary> {
    let catalog = doc.catalog().ok()?;
    let names = resolve(doc, catalog.get(b"Names").ok()?)?.as_dict().ok()?;
    let tree = resolve(doc, names.get(b"EmbeddedFiles").ok()?)?.as_dict().ok()?;
    let filespec = search_name_tree(doc, tree, ATTACHMENT_NAME.as_bytes(), 0)?;
    resolve(doc, filespec)?.as_dict().ok()
}

fn search_name_tree<'a>(
    doc: &'a Document,
    node: &'a Dictionary,
    key: &[u8],
    depth: usize,
) -> Option<&'a Object> {
    if depth > MAX_NAME_TREE_DEPTH {
        return None;
    }

    if let Some(Object::Array(pairs)) = node.get(b"Names").ok().and_then(|n| resolve(doc, n)) {
        for pair in pairs.chunks(2) {
            if let [Object::String(name, _), value] = pair
                && name.as_slice() == key
            {
                return Some(value);
            }
        }
    }

    if let Some(Object::Array(kids)) = node.get(b"Kids").ok().and_then(|k| resolve(doc, k)) {
        for kid in kids {
            let found = resolve(doc, kid)
                .and_then(|k| k.as_dict().ok())
                .and_then(|k| search_name_tree(doc, k, key, depth + 1));
            if found.is_some() {
                return found;
            }
        }
    }

    None
}

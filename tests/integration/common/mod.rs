//! Shared fixtures for the integration tests.
//!
//! Fixture PDFs are generated with lopdf instead of being checked in. Unlike
//! the unit-test fixtures, every page here carries its own MediaBox and
//! Resources, and odd pages are A4 while even pages are US Letter.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};

use pagemerge::io::{LoadedPdf, PdfReader};
use pagemerge::workspace::Workspace;

pub const A4: [f32; 4] = [0.0, 0.0, 595.0, 842.0];
pub const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// MediaBox of the 1-based page `n` of a fixture.
pub fn fixture_media_box(n: usize) -> [f32; 4] {
    if n % 2 == 1 { A4 } else { LETTER }
}

/// Build a PDF whose page `n` (1-based) shows the text `"{label} {n}"`.
pub fn build_pdf(label: &str, page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(page_count);
    for n in 1..=page_count {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Times-Roman",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 18.into()]),
                Operation::new("Td", vec![72.into(), 500.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("{label} {n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let media_box: Vec<Object> = fixture_media_box(n).iter().map(|&v| v.into()).collect();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }
        .into(),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Parse a fixture into a loaded document.
pub fn loaded(label: &str, page_count: usize) -> LoadedPdf {
    PdfReader::new()
        .load_bytes(format!("{label}.pdf"), build_pdf(label, page_count))
        .unwrap()
}

/// Write a fixture to `dir/name`.
pub fn write_fixture(dir: &Path, name: &str, label: &str, page_count: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(label, page_count)).unwrap();
    path
}

/// Workspace holding the given `(label, page count)` documents, every page
/// registered.
pub fn workspace_with(documents: &[(&str, usize)]) -> Workspace {
    let mut workspace = Workspace::new();
    for &(label, pages) in documents {
        let index = workspace.add_document(loaded(label, pages));
        workspace.register_pages(index).unwrap();
    }
    workspace
}

/// Text shown on each page, in page order.
pub fn page_texts(doc: &Document) -> Vec<Vec<String>> {
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            Content::decode(&content)
                .unwrap()
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(bytes, _)) => {
                        Some(bytes.iter().map(|&b| b as char).collect())
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}

/// Registry order as raw ids.
pub fn registry_order(workspace: &Workspace) -> Vec<String> {
    workspace
        .registry()
        .iter()
        .map(|page| page.id().to_string())
        .collect()
}

/// Page ids of the named group.
pub fn group_pages(workspace: &Workspace, name: &str) -> Vec<String> {
    workspace
        .partition()
        .iter()
        .find(|group| group.name() == name)
        .map(|group| group.pages().iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// Group names in partition order.
pub fn group_names(workspace: &Workspace) -> Vec<String> {
    workspace
        .partition()
        .iter()
        .map(|group| group.name().to_string())
        .collect()
}

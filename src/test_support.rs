//! In-memory PDF fixtures for unit tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::io::{LoadedPdf, PdfReader};

/// Build a document with `page_count` pages, each showing `"{label} {n}"`.
///
/// MediaBox and Resources sit on the Pages node so that copying a page has to
/// resolve inherited attributes.
pub fn create_test_document(label: &str, page_count: usize) -> Document {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::with_capacity(page_count);
    for n in 1..=page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("{label} {n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        }
        .into(),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Serialize a fixture document.
pub fn create_test_pdf_bytes(label: &str, page_count: usize) -> Vec<u8> {
    let mut doc = create_test_document(label, page_count);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save fixture");
    bytes
}

/// Load a fixture document the way the application does.
pub fn create_loaded_pdf(label: &str, page_count: usize) -> LoadedPdf {
    PdfReader::new()
        .load_bytes(format!("{label}.pdf"), create_test_pdf_bytes(label, page_count))
        .expect("load fixture")
}

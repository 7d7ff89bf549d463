//! Visible `Group: {name}` stamps on copied pages.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::error::Result;
use crate::merge::pages::{inherited_attribute, media_box, resolve};
use crate::merge::toc::{FONT_RESOURCE, encode_text};

const LABEL_SIZE: f32 = 10.0;
const LABEL_INSET_X: f32 = 18.0;
const LABEL_INSET_Y: f32 = 28.0;

/// Text stamped onto a grouped page.
pub fn label_text(group: &str) -> String {
    format!("Group: {group}")
}

/// Stamp `Group: {group}` in the top-left corner of a page.
///
/// The page's own content is wrapped in `q`/`Q` so its graphics state cannot
/// move or hide the label. Resources are cloned before the font is added;
/// other pages sharing the same resource dictionary are left alone.
pub fn stamp_group_label(doc: &mut Document, page_id: ObjectId, group: &str, font: ObjectId) -> Result<()> {
    let [x0, _, _, y1] = media_box(doc, page_id);
    let page = doc.get_dictionary(page_id)?;

    let mut contents = Vec::new();
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => contents.extend(items.iter().cloned()),
            _ => contents.push(Object::Reference(*id)),
        },
        Ok(Object::Array(items)) => contents.extend(items.iter().cloned()),
        _ => {}
    }

    let mut resources = match inherited_attribute(doc, page_id, b"Resources").and_then(|r| resolve(doc, r)) {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    let mut fonts = match resources.get(b"Font").ok().and_then(|f| resolve(doc, f)) {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    fonts.set(FONT_RESOURCE, Object::Reference(font));
    resources.set("Font", fonts);

    let label = Content {
        operations: vec![
            Operation::new("Q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_RESOURCE.into(), LABEL_SIZE.into()]),
            Operation::new("Td", vec![(x0 + LABEL_INSET_X).into(), (y1 - LABEL_INSET_Y).into()]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_text(&label_text(group)), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
    };

    let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let label_id = doc.add_object(Stream::new(dictionary! {}, label.encode()?));

    contents.insert(0, Object::Reference(save_id));
    contents.push(Object::Reference(label_id));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Contents", contents);
    page.set("Resources", resources);

    Ok(())
}

//! Table-of-contents page generation.
//!
//! The page lists one line per section, `"{name}: {start} - {end}"`, and puts
//! a Link annotation over each line that jumps to the section's first page.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Resource name under which the label font is registered.
pub const FONT_RESOURCE: &str = "PMHelv";

/// Heading printed at the top of the page.
pub const TITLE: &str = "Table of Contents";

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const TITLE_Y: f32 = 720.0;
const TITLE_SIZE: f32 = 18.0;
const FIRST_LINE_Y: f32 = 684.0;
const LINE_SPACING: f32 = 24.0;
const MIN_LINE_SPACING: f32 = 12.0;
const MAX_COLUMNS: usize = 3;
const COLUMN_GAP: f32 = 12.0;
const MAX_FONT_SIZE: f32 = 12.0;

/// One contiguous run of output pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Group name, or `Ungrouped`.
    pub name: String,
    /// First output page, 1-based.
    pub start: usize,
    /// Last output page, 1-based and inclusive.
    pub end: usize,
    /// Whether the run came from a named group.
    #[serde(default)]
    pub grouped: bool,
}

impl TocEntry {
    /// The line printed for this entry.
    ///
    /// ```
    /// use pagemerge::merge::TocEntry;
    ///
    /// let entry = TocEntry { name: "Intro".into(), start: 2, end: 3, grouped: true };
    /// assert_eq!(entry.label(), "Intro: 2 - 3");
    /// ```
    pub fn label(&self) -> String {
        format!("{}: {} - {}", self.name, self.start, self.end)
    }

    /// Number of pages covered.
    pub fn page_count(&self) -> usize {
        self.end + 1 - self.start
    }
}

/// Register a standard Helvetica font and return its id.
pub fn add_helvetica(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Encode text for a WinAnsi-encoded simple font.
///
/// Characters outside Latin-1 become `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

fn show_text(ops: &mut Vec<Operation>, text: &str, size: f32, x: f32, y: f32) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![FONT_RESOURCE.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_text(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Placement of the entry lines on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Grid {
    columns: usize,
    rows: usize,
    spacing: f32,
}

impl Grid {
    /// Lines fill one column down to [`MIN_LINE_SPACING`], then spill into
    /// up to [`MAX_COLUMNS`] columns; past that the spacing keeps shrinking.
    fn for_entries(count: usize) -> Self {
        let height = FIRST_LINE_Y - MARGIN;
        let rows_per_column = (height / MIN_LINE_SPACING) as usize;
        let columns = count.div_ceil(rows_per_column).clamp(1, MAX_COLUMNS);
        let rows = count.div_ceil(columns).max(1);

        Self {
            columns,
            rows,
            spacing: (height / rows as f32).min(LINE_SPACING),
        }
    }

    fn font_size(&self) -> f32 {
        (self.spacing * 0.6).min(MAX_FONT_SIZE)
    }

    fn column_width(&self) -> f32 {
        (PAGE_WIDTH - 2.0 * MARGIN) / self.columns as f32
    }

    /// Text origin and link rectangle of entry `index`, filling columns
    /// top to bottom. Rectangles of different entries never overlap.
    fn place(&self, index: usize) -> ((f32, f32), [f32; 4]) {
        let (column, row) = (index / self.rows, index % self.rows);
        let x = MARGIN + column as f32 * self.column_width();
        let y = FIRST_LINE_Y - row as f32 * self.spacing;

        let right = if column + 1 == self.columns {
            PAGE_WIDTH - MARGIN
        } else {
            x + self.column_width() - COLUMN_GAP
        };
        let rect = [x, y - self.spacing * 0.25, right, y + self.spacing * 0.7];
        ((x, y), rect)
    }
}

/// Build the table-of-contents page under `parent`.
///
/// `entries` pairs each entry with the object id of its first page. Long
/// lists are laid out in columns with tighter spacing so every entry fits
/// on the single page.
pub fn build_toc_page(
    doc: &mut Document,
    parent: ObjectId,
    font: ObjectId,
    entries: &[(TocEntry, ObjectId)],
) -> Result<ObjectId> {
    let grid = Grid::for_entries(entries.len());
    let font_size = grid.font_size();

    let mut ops = Vec::with_capacity(5 * (entries.len() + 1));
    show_text(&mut ops, TITLE, TITLE_SIZE, MARGIN, TITLE_Y);

    let mut annotations = Vec::with_capacity(entries.len());
    for (i, (entry, target)) in entries.iter().enumerate() {
        let ((x, y), rect) = grid.place(i);
        show_text(&mut ops, &entry.label(), font_size, x, y);

        let link = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect.iter().map(|&v| v.into()).collect::<Vec<Object>>(),
            "Border" => vec![0.into(), 0.into(), 0.into()],
            "Dest" => vec![Object::Reference(*target), "Fit".into()],
        });
        annotations.push(Object::Reference(link));
    }

    let content = Content { operations: ops };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => font },
        },
        "Contents" => content_id,
        "Annots" => annotations,
    }))
}

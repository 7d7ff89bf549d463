use lopdf::Document;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, PoisonError};

use super::{MAX_THUMBNAIL_WIDTH, Rasterizer, Thumbnail};
use crate::error::{PageMergeError, Result};
use crate::merge::pages::media_box;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
const BORDER: [u8; 4] = [176, 176, 176, 255];
const BORDER_WIDTH: u32 = 2;
const MIN_WIDTH: u32 = BORDER_WIDTH * 2 + 1;

/// Bytes hashed from each end of a document to tell buffers apart.
const FINGERPRINT_LEN: usize = 1024;

/// Identity of the document whose page boxes are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceKey {
    address: usize,
    len: usize,
    fingerprint: u64,
}

impl SourceKey {
    fn of(document: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        document[..document.len().min(FINGERPRINT_LEN)].hash(&mut hasher);
        document[document.len().saturating_sub(FINGERPRINT_LEN)..].hash(&mut hasher);

        Self {
            address: document.as_ptr() as usize,
            len: document.len(),
            fingerprint: hasher.finish(),
        }
    }
}

#[derive(Debug)]
struct PageBoxes {
    key: SourceKey,
    boxes: Vec<[f32; 4]>,
}

/// Draws an empty page frame with the page's aspect ratio.
///
/// Needs nothing beyond lopdf, so it works everywhere; use it when no real
/// renderer is available or the pixels don't matter. The page boxes of the
/// most recent document are kept, so a document is parsed once however many
/// of its pages are drawn.
#[derive(Debug)]
pub struct PlaceholderRasterizer {
    target_width: u32,
    last: Mutex<Option<PageBoxes>>,
}

impl PlaceholderRasterizer {
    /// Create a rasterizer producing thumbnails `target_width` pixels wide,
    /// clamped to [`MAX_THUMBNAIL_WIDTH`].
    pub fn new(target_width: u32) -> Self {
        Self {
            target_width: target_width.clamp(MIN_WIDTH, MAX_THUMBNAIL_WIDTH),
            last: Mutex::new(None),
        }
    }

    /// Width of the thumbnails produced.
    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    fn page_box(&self, document: &[u8], page_index: usize) -> Result<[f32; 4]> {
        let key = SourceKey::of(document);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);

        if last.as_ref().is_none_or(|cached| cached.key != key) {
            let doc = Document::load_mem(document)
                .map_err(|e| PageMergeError::failed_to_load_pdf("<memory>", e.to_string()))?;
            let boxes = doc
                .get_pages()
                .values()
                .map(|&page_id| media_box(&doc, page_id))
                .collect();
            *last = Some(PageBoxes { key, boxes });
        }

        last.as_ref()
            .and_then(|cached| cached.boxes.get(page_index).copied())
            .ok_or_else(|| PageMergeError::other(format!("document has no page {}", page_index + 1)))
    }
}

impl Clone for PlaceholderRasterizer {
    fn clone(&self) -> Self {
        Self::new(self.target_width)
    }
}

impl Default for PlaceholderRasterizer {
    fn default() -> Self {
        Self::new(200)
    }
}

impl Rasterizer for PlaceholderRasterizer {
    fn rasterize(&self, document: &[u8], page_index: usize) -> Result<Thumbnail> {
        let [x0, y0, x1, y1] = self.page_box(document, page_index)?;
        let (page_width, page_height) = ((x1 - x0).abs(), (y1 - y0).abs());
        let ratio = if page_width > 0.0 {
            page_height / page_width
        } else {
            1.0
        };

        let width = self.target_width;
        // Height is capped at four times the width.
        let height = ((width as f32 * ratio).round() as u32).clamp(MIN_WIDTH, width * 4);

        let capacity = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BACKGROUND.len()))
            .ok_or_else(|| PageMergeError::other(format!("thumbnail {width}x{height} is too large")))?;

        let mut rgba = Vec::with_capacity(capacity);
        for y in 0..height {
            for x in 0..width {
                let on_border = x < BORDER_WIDTH
                    || y < BORDER_WIDTH
                    || x >= width - BORDER_WIDTH
                    || y >= height - BORDER_WIDTH;
                rgba.extend_from_slice(if on_border { &BORDER } else { &BACKGROUND });
            }
        }

        Ok(Thumbnail {
            width,
            height,
            rgba,
        })
    }
}

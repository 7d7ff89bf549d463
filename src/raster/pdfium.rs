use pdfium_render::prelude::*;

use super::{MAX_THUMBNAIL_WIDTH, Rasterizer, Thumbnail};
use crate::error::{PageMergeError, Result};

/// Renders real page content through a system pdfium library.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
    target_width: i32,
    maximum_height: i32,
}

impl PdfiumRasterizer {
    /// Bind to the system pdfium library.
    ///
    /// # Errors
    ///
    /// Fails when no pdfium shared library can be found.
    pub fn new() -> Result<Self> {
        let pdfium = Pdfium::bind_to_system_library()
            .map(Pdfium::new)
            .map_err(|e| PageMergeError::other(format!("Failed to bind pdfium: {e}")))?;

        Ok(Self {
            pdfium,
            target_width: 200,
            maximum_height: 400,
        })
    }

    /// Change the thumbnail bounds, clamped to [`MAX_THUMBNAIL_WIDTH`] wide
    /// and four times that tall.
    pub fn with_size(mut self, target_width: u32, maximum_height: u32) -> Self {
        let width = target_width.clamp(1, MAX_THUMBNAIL_WIDTH);
        let height = maximum_height.clamp(1, MAX_THUMBNAIL_WIDTH * 4);
        // Both bounds fit in i32 after clamping.
        self.target_width = width as i32;
        self.maximum_height = height as i32;
        self
    }

    fn render(&self, document: &[u8], page_index: u16) -> std::result::Result<Thumbnail, PdfiumError> {
        let document = self.pdfium.load_pdf_from_byte_slice(document, None)?;
        let page = document.pages().get(page_index)?;

        let config = PdfRenderConfig::new()
            .set_target_width(self.target_width)
            .set_maximum_height(self.maximum_height);

        let bitmap = page.render_with_config(&config)?;

        Ok(Thumbnail {
            width: bitmap.width() as u32,
            height: bitmap.height() as u32,
            rgba: bitmap.as_rgba_bytes().to_vec(),
        })
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, document: &[u8], page_index: usize) -> Result<Thumbnail> {
        self.render(document, pdfium_page_index(page_index)?)
            .map_err(|e| PageMergeError::other(format!("pdfium: {e}")))
    }
}

/// Pdfium addresses pages with a `u16`.
fn pdfium_page_index(page_index: usize) -> Result<u16> {
    u16::try_from(page_index).map_err(|_| {
        PageMergeError::other(format!("pdfium cannot address page {}", page_index + 1))
    })
}

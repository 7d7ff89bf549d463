//! Page rasterization.
//!
//! Thumbnails are produced lazily: [`rasterize_pages`] returns a stream that
//! walks documents and pages in index order and yields [`RasterBatch`]es of at
//! most [`BATCH_SIZE`] results. The consumer ingests one batch before the next
//! one is rendered, so a slow renderer never blocks the caller for a whole
//! document.
//!
//! # Examples
//!
//! ```no_run
//! use futures::StreamExt;
//! use pagemerge::raster::{PlaceholderRasterizer, RasterJob, rasterize_pages};
//!
//! # async fn example(job: RasterJob) {
//! let rasterizer = PlaceholderRasterizer::default();
//! let mut batches = Box::pin(rasterize_pages(&rasterizer, vec![job]));
//! while let Some(batch) = batches.next().await {
//!     println!("{} page(s) rendered", batch.results.len());
//! }
//! # }
//! ```

mod placeholder;

#[cfg(feature = "pdfium")]
mod pdfium;

pub use placeholder::PlaceholderRasterizer;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

use futures::stream::{self, Stream, StreamExt};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::error::{PageMergeError, Result};
use crate::model::{DocumentIndex, Page};

/// Number of page results flushed per batch.
pub const BATCH_SIZE: usize = 10;

/// Widest thumbnail the bundled rasterizers produce; larger requests are
/// clamped.
pub const MAX_THUMBNAIL_WIDTH: u32 = 2048;

/// Renders one page of a PDF into pixels.
pub trait Rasterizer {
    /// Rasterize the 0-based `page_index` of the PDF held in `document`.
    fn rasterize(&self, document: &[u8], page_index: usize) -> Result<Thumbnail>;
}

/// An RGBA page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA pixels, four bytes per pixel.
    pub rgba: Vec<u8>,
}

impl Thumbnail {
    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let image = image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or_else(|| {
                PageMergeError::other(format!(
                    "Pixel buffer of {} bytes does not match {}x{}",
                    self.rgba.len(),
                    self.width,
                    self.height
                ))
            })?;

        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| PageMergeError::other(format!("PNG encoding failed: {e}")))?;
        Ok(out.into_inner())
    }

    /// Encode as PNG and write to `path`.
    pub async fn save_png(&self, path: &Path) -> Result<()> {
        let png = self.to_png()?;
        tokio::fs::write(path, png)
            .await
            .map_err(|e| PageMergeError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            })
    }
}

/// One source document queued for rasterization.
#[derive(Debug, Clone)]
pub struct RasterJob {
    /// Index of the document in the workspace.
    pub document: DocumentIndex,
    /// Raw PDF bytes.
    pub bytes: Arc<[u8]>,
    /// Number of pages to render.
    pub page_count: usize,
}

/// Outcome for a single page.
#[derive(Debug)]
pub struct PageRaster {
    /// The page the result belongs to.
    pub page: Page,
    /// The rendered thumbnail, or why it could not be produced.
    pub thumbnail: Result<Thumbnail>,
}

/// A flushed group of page results, in page order.
#[derive(Debug)]
pub struct RasterBatch {
    /// Results, at most [`BATCH_SIZE`] of them.
    pub results: Vec<PageRaster>,
}

impl RasterBatch {
    /// Number of pages whose thumbnail failed.
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.thumbnail.is_err()).count()
    }
}

/// Lazily rasterize every page of every job.
///
/// A failing page is reported as a `RasterizeFailed` result inside its batch;
/// the stream keeps going.
pub fn rasterize_pages<'a, R>(
    rasterizer: &'a R,
    jobs: Vec<RasterJob>,
) -> impl Stream<Item = RasterBatch> + 'a
where
    R: Rasterizer + ?Sized,
{
    let pages = jobs.into_iter().flat_map(|job| {
        (0..job.page_count).map(move |page_index| (job.document, Arc::clone(&job.bytes), page_index))
    });

    stream::iter(pages)
        .then(move |(document, bytes, page_index)| async move {
            tokio::task::yield_now().await;

            let thumbnail = rasterizer.rasterize(&bytes, page_index).map_err(|e| {
                PageMergeError::RasterizeFailed {
                    document,
                    page_index: page_index as u32,
                    reason: e.to_string(),
                }
            });

            PageRaster {
                page: Page::new(document, page_index as u32),
                thumbnail,
            }
        })
        .chunks(BATCH_SIZE)
        .map(|results| RasterBatch { results })
}

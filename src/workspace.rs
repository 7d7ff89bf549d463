//! The workspace: every piece of editing state behind one owner.
//!
//! A [`Workspace`] holds the loaded source documents, the page registry, the
//! group partition and the thumbnail cache. Front ends (the CLI, or a GUI
//! driving drag and drop) only talk to it, so the four stay consistent
//! between calls: deleting a page removes it from all of them at once.
//!
//! # Examples
//!
//! ```no_run
//! use pagemerge::config::MergeOptions;
//! use pagemerge::io::PdfReader;
//! use pagemerge::raster::PlaceholderRasterizer;
//! use pagemerge::workspace::Workspace;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workspace = Workspace::new();
//! let docs = workspace.add_document(PdfReader::new().load(Path::new("a.pdf")).await?);
//! workspace
//!     .rasterize(&PlaceholderRasterizer::default(), docs..docs + 1, |_, _| {})
//!     .await?;
//!
//! let intro = workspace.create_group("Intro")?;
//! workspace.apply_raw_gesture("f0-p0", intro.as_str());
//!
//! if let Some(merged) = workspace.merge(&MergeOptions::default()).await? {
//!     println!("{} pages", merged.page_count());
//! }
//! # Ok(())
//! # }
//! ```

use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

use crate::config::MergeOptions;
use crate::error::{PageMergeError, Result};
use crate::io::LoadedPdf;
use crate::layout::{LayoutFile, LayoutGroup};
use crate::merge::assembler::UNGROUPED_SECTION;
use crate::merge::{
    Assembler, EmbeddedLayout, MergePlan, MergedDocument, PlannedSection, read_embedded,
};
use crate::model::{DocumentIndex, Group, GroupId, GroupPartition, Page, PageId, PageRegistry};
use crate::raster::{RasterBatch, RasterJob, Rasterizer, Thumbnail, rasterize_pages};
use crate::reorder::{self, Container, DragItem, Gesture, GestureOutcome};

/// Raw id a front end uses for the ungrouped container.
pub const UNGROUPED_ID: &str = "ungrouped";

/// Editing state for one merge session.
#[derive(Debug, Default)]
pub struct Workspace {
    documents: Vec<LoadedPdf>,
    registry: PageRegistry,
    partition: GroupPartition,
    thumbnails: HashMap<PageId, Thumbnail>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source document and return its index.
    ///
    /// Its pages are not registered yet; that happens when rasterization
    /// results are ingested or through [`Workspace::register_pages`].
    pub fn add_document(&mut self, document: LoadedPdf) -> DocumentIndex {
        self.documents.push(document);
        self.documents.len() - 1
    }

    /// Add several documents, returning the range of their indices.
    pub fn add_documents<I>(&mut self, documents: I) -> Range<DocumentIndex>
    where
        I: IntoIterator<Item = LoadedPdf>,
    {
        let start = self.documents.len();
        self.documents.extend(documents);
        start..self.documents.len()
    }

    /// Loaded source documents, by index.
    pub fn documents(&self) -> &[LoadedPdf] {
        &self.documents
    }

    /// The page registry.
    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    /// The group partition.
    pub fn partition(&self) -> &GroupPartition {
        &self.partition
    }

    /// Cached thumbnail of a page.
    pub fn thumbnail(&self, page: &PageId) -> Option<&Thumbnail> {
        self.thumbnails.get(page)
    }

    /// Number of cached thumbnails.
    pub fn thumbnail_count(&self) -> usize {
        self.thumbnails.len()
    }

    /// Rasterization jobs for a range of documents.
    pub fn raster_jobs(&self, documents: Range<DocumentIndex>) -> Vec<RasterJob> {
        documents
            .filter_map(|index| {
                self.documents.get(index).map(|doc| RasterJob {
                    document: index,
                    bytes: doc.bytes.clone(),
                    page_count: doc.page_count,
                })
            })
            .collect()
    }

    /// Register the pages of one batch and cache their thumbnails.
    ///
    /// Pages whose thumbnail failed are still registered, without one.
    ///
    /// # Errors
    ///
    /// Fails with [`PageMergeError::DuplicatePage`] if any page of the batch
    /// is already registered; nothing from the batch is kept in that case.
    pub fn ingest(&mut self, batch: RasterBatch) -> Result<usize> {
        let pages: Vec<Page> = batch.results.iter().map(|r| r.page.clone()).collect();
        let count = pages.len();
        self.registry.append(pages)?;

        for result in batch.results {
            match result.thumbnail {
                Ok(thumbnail) => {
                    self.thumbnails.insert(result.page.id().clone(), thumbnail);
                }
                Err(e) => log::warn!("{e}"),
            }
        }

        Ok(count)
    }

    /// Rasterize and ingest every page of a range of documents.
    ///
    /// `progress` is called after each ingested batch with
    /// `(pages done, pages total)`.
    pub async fn rasterize<R, F>(
        &mut self,
        rasterizer: &R,
        documents: Range<DocumentIndex>,
        mut progress: F,
    ) -> Result<usize>
    where
        R: Rasterizer + ?Sized,
        F: FnMut(usize, usize),
    {
        let jobs = self.raster_jobs(documents);
        let total: usize = jobs.iter().map(|j| j.page_count).sum();

        let mut batches = Box::pin(rasterize_pages(rasterizer, jobs));
        let mut done = 0;
        while let Some(batch) = batches.next().await {
            done += self.ingest(batch)?;
            progress(done, total);
        }

        Ok(done)
    }

    /// Register every page of a document without rendering thumbnails.
    pub fn register_pages(&mut self, document: DocumentIndex) -> Result<usize> {
        let loaded = self.documents.get(document).ok_or_else(|| {
            PageMergeError::other(format!("No document with index {document}"))
        })?;
        let pages: Vec<Page> = (0..loaded.page_count as u32)
            .map(|page| Page::new(document, page))
            .collect();
        let count = pages.len();
        self.registry.append(pages)?;
        Ok(count)
    }

    /// Delete a page everywhere: registry, groups and thumbnail cache.
    pub fn delete_page(&mut self, page: &PageId) -> Option<Page> {
        let removed = self.registry.remove(page)?;
        self.partition.remove_from_groups(page);
        self.thumbnails.remove(page);
        Some(removed)
    }

    /// Create an empty named group.
    pub fn create_group(&mut self, name: &str) -> Result<GroupId> {
        self.partition.create_group(name)
    }

    /// Delete a group; its pages become ungrouped.
    pub fn delete_group(&mut self, group: &GroupId) -> Option<Group> {
        self.partition.delete_group(group)
    }

    /// Resolve a raw id reported by a front end.
    ///
    /// `"ungrouped"` names the ungrouped container; otherwise group ids are
    /// tried before page ids. Unknown ids resolve to `None`.
    pub fn resolve(&self, raw: &str) -> Option<DragItem> {
        if raw == UNGROUPED_ID {
            return Some(DragItem::Ungrouped);
        }
        if let Some(group) = self.partition.find(raw) {
            return Some(DragItem::Group(group.clone()));
        }
        PageId::from_raw(raw)
            .filter(|id| self.registry.contains(id))
            .map(DragItem::Page)
    }

    /// Resolve both ends of a raw gesture.
    pub fn resolve_gesture(&self, dragged: &str, target: &str) -> Option<Gesture> {
        Some(Gesture::new(self.resolve(dragged)?, self.resolve(target)?))
    }

    /// Apply a typed gesture.
    pub fn apply_gesture(&mut self, gesture: &Gesture) -> GestureOutcome {
        reorder::apply(&mut self.registry, &mut self.partition, gesture)
    }

    /// Resolve and apply a raw gesture; unknown ids change nothing.
    pub fn apply_raw_gesture(&mut self, dragged: &str, target: &str) -> GestureOutcome {
        match self.resolve_gesture(dragged, target) {
            Some(gesture) => self.apply_gesture(&gesture),
            None => {
                log::debug!("ignoring gesture {dragged} -> {target}: unknown id");
                GestureOutcome::Unchanged
            }
        }
    }

    /// Container currently holding an item.
    pub fn container_of(&self, item: &DragItem) -> Option<Container> {
        reorder::container_of(&self.registry, &self.partition, item)
    }

    /// Pages in no group, in registry order.
    pub fn ungrouped(&self) -> Vec<&Page> {
        self.registry
            .iter()
            .filter(|page| self.partition.group_of(page.id()).is_none())
            .collect()
    }

    /// Snapshot the current order as a merge plan.
    ///
    /// Non-empty groups come first, in partition order, followed by one
    /// `Ungrouped` section when any page is ungrouped.
    pub fn plan(&self) -> MergePlan {
        let mut sections = Vec::with_capacity(self.partition.len() + 1);

        for group in self.partition.iter() {
            let pages: Vec<Page> = group
                .pages()
                .iter()
                .filter_map(|id| {
                    let page = self.registry.get(id).cloned();
                    if page.is_none() {
                        log::warn!("group {} references unknown page {id}", group.name());
                    }
                    page
                })
                .collect();

            if !pages.is_empty() {
                sections.push(PlannedSection {
                    name: group.name().to_string(),
                    grouped: true,
                    pages,
                });
            }
        }

        let ungrouped: Vec<Page> = self.ungrouped().into_iter().cloned().collect();
        if !ungrouped.is_empty() {
            sections.push(PlannedSection {
                name: UNGROUPED_SECTION.to_string(),
                grouped: false,
                pages: ungrouped,
            });
        }

        MergePlan { sections }
    }

    /// Merge the current state into one document.
    ///
    /// Returns `Ok(None)` when no documents were ever added.
    ///
    /// # Errors
    ///
    /// Fails with [`PageMergeError::NoPagesToMerge`] when documents exist
    /// but every page has been deleted.
    pub async fn merge(&self, options: &MergeOptions) -> Result<Option<MergedDocument>> {
        self.merge_with_progress(options, |_, _| {}).await
    }

    /// Merge, reporting per-page progress.
    pub async fn merge_with_progress<F>(
        &self,
        options: &MergeOptions,
        progress: F,
    ) -> Result<Option<MergedDocument>>
    where
        F: FnMut(usize, usize),
    {
        if self.documents.is_empty() {
            log::debug!("merge requested with no documents loaded");
            return Ok(None);
        }

        let plan = self.plan();
        if plan.is_empty() {
            return Err(PageMergeError::NoPagesToMerge);
        }

        Assembler::new(&self.documents, options)
            .assemble_with_progress(&plan, progress)
            .await
            .map(Some)
    }

    /// Rebuild the groups of a previously merged document.
    ///
    /// Every grouped section becomes a group holding the pages of its range.
    /// When the document starts with a generated table of contents, that page
    /// is deleted. Returns the number of groups created.
    ///
    /// # Errors
    ///
    /// The layout is checked against the document before anything changes.
    /// A blank section name fails with [`PageMergeError::InvalidGroupName`];
    /// a range outside the document, or overlapping another section or the
    /// table of contents, fails with [`PageMergeError::InvalidLayout`].
    pub fn restore_groups(&mut self, document: DocumentIndex, layout: &EmbeddedLayout) -> Result<usize> {
        let page_count = self
            .documents
            .get(document)
            .map(|loaded| loaded.page_count)
            .ok_or_else(|| {
                PageMergeError::invalid_layout(format!("no document with index {document}"))
            })?;
        let first_page = if layout.table_of_contents { 2 } else { 1 };

        let mut sections = Vec::new();
        let mut claimed = HashSet::new();
        for section in layout.groups() {
            if section.name.trim().is_empty() {
                return Err(PageMergeError::InvalidGroupName {
                    name: section.name.clone(),
                });
            }
            if section.start < first_page || section.start > section.end || section.end > page_count {
                return Err(PageMergeError::invalid_layout(format!(
                    "section {:?} covers pages {} - {}, outside pages {first_page} - {page_count}",
                    section.name, section.start, section.end
                )));
            }

            let mut pages = Vec::with_capacity(section.page_count());
            for number in section.start..=section.end {
                let index = u32::try_from(number - 1).map_err(|_| {
                    PageMergeError::invalid_layout(format!("page number {number} out of range"))
                })?;
                let page = PageId::new(document, index);
                if !claimed.insert(page.clone()) {
                    return Err(PageMergeError::invalid_layout(format!(
                        "page {number} belongs to more than one section"
                    )));
                }
                pages.push(page);
            }
            sections.push((section.name.as_str(), pages));
        }

        let restored = sections.len();
        for (name, pages) in sections {
            let group = self.partition.create_group(name)?;
            for page in &pages {
                if self.registry.contains(page) {
                    self.partition.move_page_into_group(page, &group, None);
                } else {
                    log::debug!("embedded layout names missing page {page}");
                }
            }
        }

        if layout.table_of_contents {
            self.delete_page(&PageId::new(document, 0));
        }

        Ok(restored)
    }

    /// Read a document's embedded layout, if any, and restore its groups.
    pub fn restore_embedded_groups(&mut self, document: DocumentIndex) -> Result<usize> {
        let layout = match self.documents.get(document) {
            Some(loaded) => read_embedded(&loaded.document)?,
            None => None,
        };

        match layout {
            Some(layout) => self.restore_groups(document, &layout),
            None => Ok(0),
        }
    }

    /// Apply a layout file.
    ///
    /// The whole file is validated before anything changes: malformed or
    /// duplicated ids and blank group names are reported as errors, and ids
    /// of pages not in the registry as [`PageMergeError::UnknownPage`].
    /// Then deleted pages are removed, `order` pages are moved to the front
    /// and the groups are created.
    pub fn apply_layout(&mut self, layout: &LayoutFile) -> Result<()> {
        let deleted = self.parse_ids(&layout.deleted)?;
        let order = self.parse_ids(&layout.order)?;

        let mut grouped = Vec::with_capacity(layout.groups.len());
        let mut assigned: HashSet<PageId> = deleted.iter().cloned().collect();
        for group in &layout.groups {
            if group.name.trim().is_empty() {
                return Err(PageMergeError::InvalidGroupName {
                    name: group.name.clone(),
                });
            }
            let pages = self.parse_ids(&group.pages)?;
            for page in &pages {
                if !assigned.insert(page.clone()) {
                    return Err(PageMergeError::invalid_layout(format!(
                        "page {page} is deleted or assigned to more than one group"
                    )));
                }
            }
            grouped.push((group.name.as_str(), pages));
        }

        for page in &deleted {
            self.delete_page(page);
        }

        let mut placed = 0;
        for page in order.iter().filter(|page| !deleted.contains(*page)) {
            let anchor = self.registry.iter().nth(placed).map(|p| p.id().clone());
            if let Some(anchor) = anchor {
                self.registry.reorder(page, &anchor);
            }
            placed += 1;
        }

        for (name, pages) in grouped {
            let group = self.partition.create_group(name)?;
            for page in &pages {
                self.partition.move_page_into_group(page, &group, None);
            }
        }

        Ok(())
    }

    /// Describe the current state as a layout file.
    pub fn layout_template(&self) -> LayoutFile {
        LayoutFile {
            groups: self
                .partition
                .iter()
                .map(|group| LayoutGroup {
                    name: group.name().to_string(),
                    pages: group.pages().iter().map(ToString::to_string).collect(),
                })
                .collect(),
            order: self.registry.iter().map(|p| p.id().to_string()).collect(),
            deleted: Vec::new(),
        }
    }

    fn parse_ids(&self, raw: &[String]) -> Result<Vec<PageId>> {
        let mut seen = HashSet::with_capacity(raw.len());
        raw.iter()
            .map(|raw| {
                let id = PageId::from_raw(raw.trim()).ok_or_else(|| {
                    PageMergeError::invalid_layout(format!("malformed page id {raw:?}"))
                })?;
                if !self.registry.contains(&id) {
                    return Err(PageMergeError::UnknownPage { id: id.to_string() });
                }
                if !seen.insert(id.clone()) {
                    return Err(PageMergeError::invalid_layout(format!(
                        "page {id} listed twice"
                    )));
                }
                Ok(id)
            })
            .collect()
    }
}

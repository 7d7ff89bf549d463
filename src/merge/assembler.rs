//! Core merge implementation.
//!
//! Sections are copied in plan order into a fresh document. Each section that
//! ends up with at least one page becomes a table-of-contents entry; the
//! optional ToC page is then inserted in front and every entry shifted by one.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crate::config::{CompressionLevel, DEFAULT_OUTPUT_NAME, MergeOptions};
use crate::error::{PageMergeError, Result};
use crate::io::LoadedPdf;
use crate::merge::bookmarks::BookmarkManager;
use crate::merge::labels::stamp_group_label;
use crate::merge::layout::{EmbeddedLayout, embed};
use crate::merge::metadata::MetadataManager;
use crate::merge::pages::{PageCopier, pages_dictionary};
use crate::merge::toc::{TocEntry, add_helvetica, build_toc_page};
use crate::model::Page;

/// Name of the trailing section holding ungrouped pages.
pub const UNGROUPED_SECTION: &str = "Ungrouped";

/// A run of pages that becomes one table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSection {
    /// Entry name.
    pub name: String,
    /// Whether the section is a named group (and gets labels).
    pub grouped: bool,
    /// Pages in output order.
    pub pages: Vec<Page>,
}

/// Snapshot of what to merge, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Sections in output order.
    pub sections: Vec<PlannedSection>,
}

impl MergePlan {
    /// Total number of pages across all sections.
    pub fn page_count(&self) -> usize {
        self.sections.iter().map(|s| s.pages.len()).sum()
    }

    /// Check whether the plan holds no pages at all.
    pub fn is_empty(&self) -> bool {
        self.page_count() == 0
    }
}

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default)]
pub struct MergeStatistics {
    /// Number of distinct source documents that contributed pages.
    pub documents_used: usize,

    /// Total number of pages in the merged document, ToC included.
    pub total_pages: usize,

    /// Number of table-of-contents entries.
    pub sections: usize,

    /// Planned pages that could not be found and were skipped.
    pub pages_skipped: usize,

    /// Number of pages that received a group label.
    pub labels_stamped: usize,

    /// Number of bookmarks added.
    pub bookmarks_added: usize,

    /// Total time taken for the merge.
    pub merge_time: Duration,

    /// Whether compression was applied.
    pub compressed: bool,
}

/// Result of a merge operation.
pub struct MergedDocument {
    /// The merged PDF document.
    pub document: Document,

    /// Table-of-contents entries with final page numbers.
    pub toc: Vec<TocEntry>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

impl MergedDocument {
    /// Serialize the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Number of pages in the merged document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }
}

/// Builds merged documents from loaded sources.
pub struct Assembler<'a> {
    /// Loaded source documents, indexed by document index.
    sources: &'a [LoadedPdf],

    /// Assembly options.
    options: &'a MergeOptions,

    /// Bookmark manager for outline handling.
    bookmark_manager: BookmarkManager,

    /// Metadata manager for document properties.
    metadata_manager: MetadataManager,
}

impl<'a> Assembler<'a> {
    /// Create an assembler over `sources`.
    pub fn new(sources: &'a [LoadedPdf], options: &'a MergeOptions) -> Self {
        Self {
            sources,
            options,
            bookmark_manager: BookmarkManager::new(),
            metadata_manager: MetadataManager::new(),
        }
    }

    /// Assemble the plan into one document.
    ///
    /// # Errors
    ///
    /// Returns [`PageMergeError::NoPagesToMerge`] if no page could be
    /// copied, or a merge error if the output cannot be built.
    pub async fn assemble(&self, plan: &MergePlan) -> Result<MergedDocument> {
        self.assemble_with_progress(plan, |_, _| {}).await
    }

    /// Assemble the plan, reporting `(pages processed, pages planned)` after
    /// every page.
    ///
    /// Yields to the runtime before each page copy.
    pub async fn assemble_with_progress<F>(&self, plan: &MergePlan, mut progress: F) -> Result<MergedDocument>
    where
        F: FnMut(usize, usize),
    {
        let merge_start = Instant::now();
        let planned = plan.page_count();

        let mut output = Document::with_version("1.5");
        let pages_id = output.new_object_id();
        let font_id = (self.options.table_of_contents || self.options.label_pages)
            .then(|| add_helvetica(&mut output));

        let mut copier = PageCopier::new();
        let mut kids: Vec<ObjectId> = Vec::with_capacity(planned + 1);
        let mut sections: Vec<(TocEntry, ObjectId)> = Vec::with_capacity(plan.sections.len());
        let mut documents_used = BTreeSet::new();
        let mut pages_skipped = 0;
        let mut labels_stamped = 0;
        let mut processed = 0;

        for section in &plan.sections {
            let first = kids.len();

            for page in &section.pages {
                tokio::task::yield_now().await;
                processed += 1;

                let copied = copier.copy_page(
                    &mut output,
                    pages_id,
                    self.sources,
                    page.document(),
                    page.page_index(),
                );

                match copied {
                    Some(page_id) => {
                        if self.options.label_pages
                            && section.grouped
                            && let Some(font) = font_id
                        {
                            stamp_group_label(&mut output, page_id, &section.name, font)?;
                            labels_stamped += 1;
                        }
                        kids.push(page_id);
                        documents_used.insert(page.document());
                    }
                    None => {
                        log::warn!("skipping page {}: source page not found", page.id());
                        pages_skipped += 1;
                    }
                }

                progress(processed, planned);
            }

            if kids.len() > first {
                let entry = TocEntry {
                    name: section.name.clone(),
                    start: first + 1,
                    end: kids.len(),
                    grouped: section.grouped,
                };
                sections.push((entry, kids[first]));
            }
        }

        if kids.is_empty() {
            return Err(PageMergeError::NoPagesToMerge);
        }

        if self.options.table_of_contents
            && let Some(font) = font_id
        {
            for (entry, _) in &mut sections {
                entry.start += 1;
                entry.end += 1;
            }
            let toc_id = build_toc_page(&mut output, pages_id, font, &sections)?;
            kids.insert(0, toc_id);
        }

        output
            .objects
            .insert(pages_id, Object::Dictionary(pages_dictionary(&kids)));
        let catalog_id = output.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        output.trailer.set("Root", catalog_id);

        let bookmarks_added = if self.options.bookmarks {
            self.bookmark_manager
                .add_section_bookmarks(&mut output, &sections)?
        } else {
            0
        };

        let title = self.options.title.as_deref().unwrap_or(DEFAULT_OUTPUT_NAME);
        self.metadata_manager.set_metadata(&mut output, title)?;

        let toc: Vec<TocEntry> = sections.into_iter().map(|(entry, _)| entry).collect();
        if self.options.embed_layout {
            let layout = EmbeddedLayout::new(toc.clone(), self.options.table_of_contents);
            embed(&mut output, &layout)?;
        }

        match self.options.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => output.compress(),
            CompressionLevel::Maximum => {
                let pruned = output.prune_objects();
                log::debug!("pruned {} unreferenced object(s)", pruned.len());
                output.compress();
            }
        }
        output.renumber_objects();

        log::debug!(
            "assembled {} page(s) in {} section(s), {} skipped",
            kids.len(),
            toc.len(),
            pages_skipped
        );

        let statistics = MergeStatistics {
            documents_used: documents_used.len(),
            total_pages: kids.len(),
            sections: toc.len(),
            pages_skipped,
            labels_stamped,
            bookmarks_added,
            merge_time: merge_start.elapsed(),
            compressed: self.options.compression != CompressionLevel::None,
        };

        Ok(MergedDocument {
            document: output,
            toc,
            statistics,
        })
    }
}

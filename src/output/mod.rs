//! User-facing output for the pagemerge CLI.
//!
//! This module handles:
//! - Formatted status messages (quiet and verbose aware)
//! - Progress bars for rasterization and merging
//! - A `log` backend routing library diagnostics through the formatter
//! - Summary reports
//!
//! # Examples
//!
//! ```no_run
//! use pagemerge::output::{FormatterLogger, OutputFormatter};
//!
//! # fn example() -> pagemerge::Result<()> {
//! let formatter = OutputFormatter::new(false, true);
//! FormatterLogger::new(formatter.clone()).install()?;
//! formatter.info("Loading documents...");
//! # Ok(())
//! # }
//! ```

pub mod formatter;
pub mod logger;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use logger::FormatterLogger;
pub use progress::{ProgressBar, ProgressStyle};

use crate::io::LoadStatistics;
use crate::merge::{MergePlan, MergeStatistics, TocEntry};

/// Display load statistics.
pub fn display_load_statistics(formatter: &OutputFormatter, stats: &LoadStatistics) {
    if stats.failure_count > 0 {
        formatter.warning(&format!(
            "{} file(s) failed to load",
            stats.failure_count
        ));
    }

    formatter.info(&format!(
        "Loaded {} file(s) in {:.2}s: {} pages, {}",
        stats.success_count,
        stats.total_time.as_secs_f64(),
        stats.total_pages,
        stats.format_total_size()
    ));
}

/// Display the sections a merge would produce.
pub fn display_plan(formatter: &OutputFormatter, plan: &MergePlan) {
    formatter.section("Merge plan");
    for (index, section) in plan.sections.iter().enumerate() {
        let pages: Vec<&str> = section.pages.iter().map(|p| p.id().as_str()).collect();
        formatter.list_item(
            index + 1,
            &format!("{} ({}): {}", section.name, pages.len(), pages.join(", ")),
        );
    }
}

/// Display the table of contents of a merged document.
pub fn display_toc(formatter: &OutputFormatter, toc: &[TocEntry]) {
    formatter.section("Table of contents");
    for (index, entry) in toc.iter().enumerate() {
        formatter.list_item(index + 1, &entry.label());
    }
}

/// Display merge statistics in verbose mode.
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    if !formatter.is_verbose() {
        return;
    }

    formatter.section("Statistics");
    formatter.detail("Documents used", &stats.documents_used.to_string());
    formatter.detail("Total pages", &stats.total_pages.to_string());
    formatter.detail("Sections", &stats.sections.to_string());
    formatter.detail("Pages skipped", &stats.pages_skipped.to_string());
    formatter.detail("Labels stamped", &stats.labels_stamped.to_string());
    formatter.detail("Bookmarks", &stats.bookmarks_added.to_string());
    formatter.detail(
        "Merge time",
        &format!("{:.2}s", stats.merge_time.as_secs_f64()),
    );
    formatter.detail("Compressed", if stats.compressed { "Yes" } else { "No" });
}

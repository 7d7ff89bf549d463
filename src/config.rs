//! Configuration module for pagemerge.
//!
//! Two layers live here:
//! - [`MergeOptions`]: what the library needs to assemble one output document.
//! - [`Config`]: what the command-line front end collects on top of that
//!   (inputs, output location, overwrite policy, verbosity), validated as a
//!   whole before any file is touched.

use anyhow::{Result, bail};

use crate::PageMergeError;
use std::{path::PathBuf, str::FromStr};

/// Name used for the output when the user gives none.
pub const DEFAULT_OUTPUT_NAME: &str = "merged";

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - preserves exact quality and structure.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Compress streams and prune unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = crate::PageMergeError;

    /// Parse compression level from string: "none", "standard" or "maximum".
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PageMergeError::InvalidConfig {
                message: format!(
                    "Invalid compression level: {s}. Must be one of: none, standard, maximum"
                ),
            }),
        }
    }
}

/// Options controlling how a merged document is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Prepend a table-of-contents page with links to every section.
    pub table_of_contents: bool,

    /// Stamp a visible `Group: {name}` label on every grouped page.
    pub label_pages: bool,

    /// Add one outline entry (bookmark) per section.
    pub bookmarks: bool,

    /// Compression applied to the assembled document.
    pub compression: CompressionLevel,

    /// Attach the group layout as JSON so a later import can restore groups.
    pub embed_layout: bool,

    /// Document title written to the Info dictionary.
    pub title: Option<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            table_of_contents: true,
            label_pages: false,
            bookmarks: false,
            compression: CompressionLevel::Standard,
            embed_layout: true,
            title: None,
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a merge run from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input PDF file paths, in load order.
    pub inputs: Vec<PathBuf>,

    /// Output name without directory; `.pdf` is appended if missing.
    pub output_name: String,

    /// Directory the output is written to.
    pub output_dir: PathBuf,

    /// Optional JSON layout describing groups and page order.
    pub layout: Option<PathBuf>,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Dry run mode - plan the merge without writing output.
    pub dry_run: bool,

    /// Options passed to the assembler.
    pub merge: MergeOptions,
}

impl Config {
    /// Full path of the output file.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(output_file_name(Some(&self.output_name)))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - The output name is blank or contains a path separator
    /// - The output would overwrite one of the inputs
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        let name = self.output_name.trim();
        if name.is_empty() {
            bail!("Output name cannot be empty");
        }
        if name.contains(['/', '\\']) {
            bail!("Output name must not contain a path separator: {name}; use --out-dir instead");
        }

        let output = self.output_path();
        for input in &self.inputs {
            if input == &output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    output.display()
                );
            }
        }

        Ok(())
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

/// File name of the merged document: `{name || "merged"}.pdf`.
///
/// Blank names fall back to the default, and a `.pdf` extension the user
/// already typed is not doubled.
///
/// ```
/// use pagemerge::config::output_file_name;
///
/// assert_eq!(output_file_name(None), "merged.pdf");
/// assert_eq!(output_file_name(Some("report")), "report.pdf");
/// assert_eq!(output_file_name(Some("report.PDF")), "report.PDF");
/// ```
pub fn output_file_name(name: Option<&str>) -> String {
    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_OUTPUT_NAME);

    if name.to_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{name}.pdf")
    }
}

//! Command-line interface for pagemerge.
//!
//! ```text
//! pagemerge merge a.pdf b.pdf --layout groups.json -o report
//! pagemerge layout a.pdf b.pdf > groups.json
//! pagemerge groups report.pdf
//! pagemerge thumbnails a.pdf --out-dir thumbs
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use pagemerge::config::{
    CompressionLevel, Config, DEFAULT_OUTPUT_NAME, MergeOptions, OverwriteMode,
};
use pagemerge::utils::expand_inputs;
use pagemerge::{PageMergeError, Result};

/// Reorder, group and merge PDF pages.
///
/// Pages are identified as `f{document}-p{page}`, both 0-based, in the order
/// the files are given. Groups become sections of a linked table of contents
/// on the first page of the output.
#[derive(Parser, Debug)]
#[command(name = "pagemerge")]
#[command(version)]
#[command(author)]
#[command(about = "Reorder, group and merge PDF pages with a linked table of contents")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show detailed progress and statistics
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge pages into one PDF with a table of contents
    Merge(MergeArgs),

    /// Print a JSON layout template listing every page id
    Layout(LayoutArgs),

    /// Print the group layout embedded in a merged PDF
    Groups(GroupsArgs),

    /// Render every page to `{page-id}.png`
    Thumbnails(ThumbnailArgs),
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Input PDF files (glob patterns allowed), in document order
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output name; `.pdf` is appended
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// Directory to write the output to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// JSON layout file with groups, page order and deleted pages
    ///
    /// Without one, groups embedded in previously merged inputs are
    /// restored.
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Do not prepend a table-of-contents page
    #[arg(long)]
    pub no_toc: bool,

    /// Stamp `Group: {name}` on every grouped page
    #[arg(long)]
    pub label_pages: bool,

    /// Add a bookmark for every section
    #[arg(short, long)]
    pub bookmarks: bool,

    /// Compression level for the output PDF
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Do not embed the group layout in the output
    #[arg(long)]
    pub no_embed_layout: bool,

    /// Document title (defaults to the output name)
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Show the merge plan without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Input PDF files (glob patterns allowed), in document order
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct GroupsArgs {
    /// A PDF written by `pagemerge merge`
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Input PDF files (glob patterns allowed), in document order
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Directory the PNG files are written to
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Thumbnail width in pixels
    #[arg(long, value_name = "PX", default_value_t = 200)]
    pub width: u32,
}

impl MergeArgs {
    /// Convert the arguments into a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`PageMergeError::InvalidConfig`] if the compression level is
    /// unknown or the resulting configuration fails validation, and a
    /// missing-file error for glob patterns matching nothing.
    pub fn to_config(&self, quiet: bool, verbose: bool) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)
            .map_err(|e| PageMergeError::invalid_config(e.to_string()))?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let output_name = self
            .output
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_OUTPUT_NAME)
            .to_string();

        let title = self.title.clone().or_else(|| Some(title_from_name(&output_name)));

        let config = Config {
            inputs: expand_inputs(&self.inputs)?,
            output_name,
            output_dir: self.out_dir.clone(),
            layout: self.layout.clone(),
            overwrite_mode,
            quiet,
            verbose,
            dry_run: self.dry_run,
            merge: MergeOptions {
                table_of_contents: !self.no_toc,
                label_pages: self.label_pages,
                bookmarks: self.bookmarks,
                compression,
                embed_layout: !self.no_embed_layout,
                title,
            },
        };

        config.validate().map_err(|e| {
            PageMergeError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }
}

/// Output name without a trailing `.pdf`.
fn title_from_name(name: &str) -> String {
    let cut = name.len().saturating_sub(4);
    match name.get(cut..) {
        Some(ext) if ext.eq_ignore_ascii_case(".pdf") => name[..cut].to_string(),
        _ => name.to_string(),
    }
}

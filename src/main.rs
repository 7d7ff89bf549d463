//! pagemerge - reorder, group and merge PDF pages.
//!
//! A CLI front end over the `pagemerge` workspace: layout files stand in for
//! drag and drop.

mod cli;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;

use crate::cli::{Cli, Command, GroupsArgs, LayoutArgs, MergeArgs, ThumbnailArgs};
use pagemerge::config::OverwriteMode;
use pagemerge::io::{PdfReader, PdfWriter};
use pagemerge::layout::LayoutFile;
use pagemerge::merge::read_embedded;
use pagemerge::output::{
    FormatterLogger, OutputFormatter, ProgressBar, display_load_statistics,
    display_merge_statistics, display_plan, display_toc,
};
use pagemerge::raster::{PlaceholderRasterizer, Rasterizer};
use pagemerge::utils::expand_inputs;
use pagemerge::workspace::Workspace;
use pagemerge::{PageMergeError, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.quiet, cli.verbose);

    if let Err(err) = FormatterLogger::new(formatter.clone()).install() {
        formatter.warning(&err.to_string());
    }

    if let Err(err) = run(cli, &formatter).await {
        formatter.error(&format!("Error: {err}"));
        process::exit(err.exit_code());
    }
}

async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    match cli.command {
        Command::Merge(args) => merge(args, cli.quiet, cli.verbose, formatter).await,
        Command::Layout(args) => layout(args, formatter).await,
        Command::Groups(args) => groups(args, formatter).await,
        Command::Thumbnails(args) => thumbnails(args, formatter).await,
    }
}

async fn merge(
    args: MergeArgs,
    quiet: bool,
    verbose: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = args.to_config(quiet, verbose)?;
    let output = config.output_path();

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pagemerge::NAME, pagemerge::VERSION));
    }

    if !config.dry_run {
        PdfWriter::new().can_write(&output).await?;
        handle_output_overwrite(&output, config.overwrite_mode, formatter).await?;
    }

    let mut workspace = load_workspace(&config.inputs, formatter).await?;
    let documents = 0..workspace.documents().len();
    for document in documents.clone() {
        workspace.register_pages(document)?;
    }

    match &config.layout {
        Some(path) => {
            let layout = LayoutFile::load(path).await?;
            workspace.apply_layout(&layout)?;
            formatter.info(&format!(
                "Applied layout {}: {} group(s)",
                path.display(),
                workspace.partition().len()
            ));
        }
        None => {
            for document in documents {
                let restored = workspace.restore_embedded_groups(document)?;
                if restored > 0 {
                    formatter.info(&format!(
                        "Restored {restored} group(s) from {}",
                        workspace.documents()[document].name
                    ));
                }
            }
        }
    }

    let plan = workspace.plan();
    if config.dry_run {
        display_plan(formatter, &plan);
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", output.display()));
        return Ok(());
    }

    let mut progress = ProgressBar::for_task(plan.page_count(), quiet);
    progress.set_message("Merging");
    let merged = workspace
        .merge_with_progress(&config.merge, |done, _| progress.update(done))
        .await?;
    progress.finish();

    let Some(merged) = merged else {
        formatter.warning("No documents to merge");
        return Ok(());
    };

    if formatter.should_print() {
        display_toc(formatter, &merged.toc);
        display_merge_statistics(formatter, &merged.statistics);
    }

    let write_stats = PdfWriter::new()
        .save_with_stats(&merged.document, &output)
        .await?;

    formatter.success(&format!(
        "Created {} ({} pages, {})",
        output.display(),
        merged.statistics.total_pages,
        write_stats.format_file_size()
    ));
    formatter.detail(
        "Write time",
        &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
    );

    Ok(())
}

async fn layout(args: LayoutArgs, formatter: &OutputFormatter) -> Result<()> {
    let inputs = expand_inputs(&args.inputs)?;
    let mut workspace = load_workspace(&inputs, formatter).await?;
    for document in 0..workspace.documents().len() {
        workspace.register_pages(document)?;
    }

    println!("{}", workspace.layout_template().to_json_pretty()?);
    Ok(())
}

async fn groups(args: GroupsArgs, formatter: &OutputFormatter) -> Result<()> {
    let loaded = PdfReader::new().load(&args.file).await?;

    match read_embedded(&loaded.document)? {
        Some(layout) => {
            let json = serde_json::to_string_pretty(&layout)?;
            println!("{json}");
        }
        None => formatter.warning(&format!(
            "{} carries no embedded group layout",
            args.file.display()
        )),
    }

    Ok(())
}

async fn thumbnails(args: ThumbnailArgs, formatter: &OutputFormatter) -> Result<()> {
    let inputs = expand_inputs(&args.inputs)?;
    tokio::fs::create_dir_all(&args.out_dir).await?;

    let mut workspace = load_workspace(&inputs, formatter).await?;
    let documents = 0..workspace.documents().len();
    let total: usize = workspace.documents().iter().map(|d| d.page_count).sum();
    let rasterizer = select_rasterizer(args.width);

    let mut progress = ProgressBar::for_task(total, formatter.is_quiet());
    progress.set_message("Rendering");
    workspace
        .rasterize(rasterizer.as_ref(), documents, |done, total| {
            progress.update(done);
            log::debug!("rendered {done}/{total} pages");
        })
        .await?;
    progress.finish();

    let mut written = 0;
    for page in workspace.registry().iter() {
        if let Some(thumbnail) = workspace.thumbnail(page.id()) {
            let path = args.out_dir.join(format!("{}.png", page.id()));
            thumbnail.save_png(&path).await?;
            written += 1;
        }
    }

    let missing = workspace.registry().len() - written;
    if missing > 0 {
        formatter.warning(&format!("{missing} page(s) could not be rendered"));
    }
    formatter.success(&format!(
        "Wrote {written} thumbnail(s) to {}",
        args.out_dir.display()
    ));

    Ok(())
}

/// Load every input into a fresh workspace, failing on the first bad file.
async fn load_workspace(inputs: &[PathBuf], formatter: &OutputFormatter) -> Result<Workspace> {
    let (results, stats) = PdfReader::new().load_all(inputs).await;
    display_load_statistics(formatter, &stats);

    let documents = results.into_iter().collect::<Result<Vec<_>>>()?;
    for (index, document) in documents.iter().enumerate() {
        formatter.detail(
            &format!("f{index}"),
            &format!("{} ({} pages)", document.name, document.page_count),
        );
    }

    let mut workspace = Workspace::new();
    workspace.add_documents(documents);
    Ok(workspace)
}

#[cfg(feature = "pdfium")]
fn select_rasterizer(width: u32) -> Box<dyn Rasterizer> {
    use pagemerge::raster::PdfiumRasterizer;

    match PdfiumRasterizer::new() {
        Ok(rasterizer) => Box::new(rasterizer.with_size(width, width.saturating_mul(2))),
        Err(e) => {
            log::warn!("pdfium unavailable ({e}); drawing placeholder thumbnails");
            Box::new(PlaceholderRasterizer::new(width))
        }
    }
}

#[cfg(not(feature = "pdfium"))]
fn select_rasterizer(width: u32) -> Box<dyn Rasterizer> {
    Box::new(PlaceholderRasterizer::new(width))
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    output: &Path,
    mode: OverwriteMode,
    formatter: &OutputFormatter,
) -> Result<()> {
    if !PdfWriter::new().exists(output).await {
        return Ok(());
    }

    match mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PageMergeError::output_exists(output.to_path_buf())),
        OverwriteMode::Prompt => {
            // Nobody to ask in quiet mode.
            if formatter.is_quiet() {
                return Err(PageMergeError::output_exists(output.to_path_buf()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PageMergeError::other(format!("Failed to read input: {err}")))?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(()),
                _ => Err(PageMergeError::Cancelled),
            }
        }
    }
}

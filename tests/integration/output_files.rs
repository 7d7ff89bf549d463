//! Reading sources from disk, writing merged output and thumbnails.

use tempfile::TempDir;

use pagemerge::PageMergeError;
use pagemerge::config::{Config, MergeOptions, OverwriteMode, output_file_name};
use pagemerge::io::{PdfReader, PdfWriter};
use pagemerge::merge::MetadataManager;
use pagemerge::raster::{MAX_THUMBNAIL_WIDTH, PlaceholderRasterizer};
use pagemerge::workspace::Workspace;

use crate::common::write_fixture;

#[tokio::test]
async fn test_merge_files_from_disk() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_fixture(dir.path(), "a.pdf", "a", 2),
        write_fixture(dir.path(), "b.pdf", "b", 3),
    ];

    let (results, stats) = PdfReader::new().load_all(&inputs).await;
    assert_eq!(stats.success_count, 2);
    assert_eq!(stats.total_pages, 5);

    let mut workspace = Workspace::new();
    let range = workspace.add_documents(results.into_iter().map(Result::unwrap));
    for document in range {
        workspace.register_pages(document).unwrap();
    }
    let intro = workspace.create_group("Intro").unwrap();
    workspace.apply_raw_gesture("f1-p2", intro.as_str());

    let options = MergeOptions {
        title: Some("Quarterly".to_string()),
        ..MergeOptions::default()
    };
    let merged = workspace.merge(&options).await.unwrap().unwrap();

    let output = dir.path().join(output_file_name(Some("quarterly")));
    let write_stats = PdfWriter::new()
        .save_with_stats(&merged.document, &output)
        .await
        .unwrap();
    assert!(write_stats.file_size > 0);
    assert!(!output.with_extension("tmp").exists());

    let reread = PdfReader::new().load(&output).await.unwrap();
    assert_eq!(reread.page_count, 6);
    assert_eq!(
        MetadataManager::new().get_title(&reread.document).as_deref(),
        Some("Quarterly")
    );
}

#[tokio::test]
async fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = PdfReader::new()
        .load(&dir.path().join("absent.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, PageMergeError::FileNotFound { .. }));
}

#[tokio::test]
async fn test_not_a_pdf() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.pdf");
    tokio::fs::write(&path, b"just some text").await.unwrap();

    let err = PdfReader::new().load(&path).await.unwrap_err();
    assert!(matches!(err, PageMergeError::FailedToLoadPdf { .. }));
}

#[tokio::test]
async fn test_output_directory_must_exist() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("missing").join("merged.pdf");

    let err = PdfWriter::new().can_write(&output).await.unwrap_err();
    assert!(matches!(err, PageMergeError::InvalidConfig { .. }));
}

#[tokio::test]
async fn test_thumbnails_written_as_png() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(dir.path(), "a.pdf", "a", 12);

    let mut workspace = Workspace::new();
    let index = workspace.add_document(PdfReader::new().load(&input).await.unwrap());
    let mut batches = Vec::new();
    workspace
        .rasterize(&PlaceholderRasterizer::new(60), index..index + 1, |done, total| {
            batches.push((done, total))
        })
        .await
        .unwrap();
    assert_eq!(batches, vec![(10, 12), (12, 12)]);

    let out_dir = dir.path().join("thumbs");
    tokio::fs::create_dir_all(&out_dir).await.unwrap();
    for page in workspace.registry().iter() {
        let path = out_dir.join(format!("{}.png", page.id()));
        workspace.thumbnail(page.id()).unwrap().save_png(&path).await.unwrap();
    }

    let first = tokio::fs::read(out_dir.join("f0-p0.png")).await.unwrap();
    assert_eq!(&first[..8], b"\x89PNG\r\n\x1a\n");
    // A4 portrait at 60 px wide.
    let thumbnail = workspace.thumbnail(&pagemerge::model::PageId::new(0, 0)).unwrap();
    assert_eq!((thumbnail.width, thumbnail.height), (60, 85));
    assert!(out_dir.join("f0-p11.png").exists());
}

#[tokio::test]
async fn test_oversized_thumbnail_width_is_clamped() {
    let mut workspace = Workspace::new();
    let index = workspace.add_document(crate::common::loaded("a", 2));

    let rendered = workspace
        .rasterize(&PlaceholderRasterizer::new(u32::MAX), index..index + 1, |_, _| {})
        .await
        .unwrap();

    assert_eq!(rendered, 2);
    assert_eq!(workspace.thumbnail_count(), 2);
    for page in workspace.registry().iter() {
        let thumbnail = workspace.thumbnail(page.id()).unwrap();
        assert_eq!(thumbnail.width, MAX_THUMBNAIL_WIDTH);
        assert_eq!(
            thumbnail.rgba.len(),
            thumbnail.width as usize * thumbnail.height as usize * 4
        );
    }
}

#[test]
fn test_config_rejects_output_over_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("merged.pdf");
    let config = Config {
        inputs: vec![input],
        output_name: "merged".to_string(),
        output_dir: dir.path().to_path_buf(),
        layout: None,
        overwrite_mode: OverwriteMode::Force,
        quiet: true,
        verbose: false,
        dry_run: false,
        merge: MergeOptions::default(),
    };

    assert!(config.validate().is_err());
}

//! Layout files and regrouping previously merged output.

use rstest::rstest;
use tempfile::TempDir;

use pagemerge::PageMergeError;
use pagemerge::config::MergeOptions;
use pagemerge::io::PdfReader;
use pagemerge::layout::LayoutFile;
use pagemerge::merge::layout::embed;
use pagemerge::merge::{EmbeddedLayout, TocEntry, read_embedded};
use pagemerge::workspace::Workspace;

use crate::common::{build_pdf, group_names, group_pages, loaded, registry_order, workspace_with};

async fn merge_to_bytes(workspace: &Workspace, options: &MergeOptions) -> Vec<u8> {
    let mut merged = workspace.merge(options).await.unwrap().unwrap();
    merged.to_bytes().unwrap()
}

fn reimport(bytes: Vec<u8>) -> Workspace {
    let mut workspace = Workspace::new();
    let loaded = PdfReader::new().load_bytes("merged.pdf", bytes).unwrap();
    let index = workspace.add_document(loaded);
    workspace.register_pages(index).unwrap();
    workspace
}

fn grouped_workspace() -> Workspace {
    let mut workspace = workspace_with(&[("a", 3), ("b", 2)]);
    let layout = LayoutFile::from_json(
        r#"{
            "groups": [
                { "name": "Intro", "pages": ["f1-p0", "f0-p0"] },
                { "name": "Résumé", "pages": ["f0-p2"] }
            ]
        }"#,
    )
    .unwrap();
    workspace.apply_layout(&layout).unwrap();
    workspace
}

#[tokio::test]
async fn test_embedded_layout_matches_toc() {
    let workspace = grouped_workspace();
    let mut merged = workspace.merge(&MergeOptions::default()).await.unwrap().unwrap();
    let toc = merged.toc.clone();

    let reloaded = lopdf::Document::load_mem(&merged.to_bytes().unwrap()).unwrap();
    let layout = read_embedded(&reloaded).unwrap().unwrap();

    assert_eq!(layout.sections, toc);
    assert!(layout.table_of_contents);
    let names: Vec<&str> = layout.groups().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Intro", "Résumé"]);
}

#[tokio::test]
async fn test_reimported_output_regroups() {
    let bytes = merge_to_bytes(&grouped_workspace(), &MergeOptions::default()).await;

    let mut workspace = reimport(bytes);
    assert_eq!(workspace.restore_embedded_groups(0).unwrap(), 2);

    // Output: ToC, Intro (2 pages), Résumé (1), Ungrouped (2).
    assert_eq!(group_names(&workspace), vec!["Intro", "Résumé"]);
    assert_eq!(group_pages(&workspace, "Intro"), vec!["f0-p1", "f0-p2"]);
    assert_eq!(group_pages(&workspace, "Résumé"), vec!["f0-p3"]);
    assert_eq!(registry_order(&workspace), vec!["f0-p1", "f0-p2", "f0-p3", "f0-p4", "f0-p5"]);
}

#[tokio::test]
async fn test_regrouped_output_merges_to_same_sections() {
    let options = MergeOptions::default();
    let original = grouped_workspace().merge(&options).await.unwrap().unwrap();

    let mut workspace = reimport(merge_to_bytes(&grouped_workspace(), &options).await);
    workspace.restore_embedded_groups(0).unwrap();
    let remerged = workspace.merge(&options).await.unwrap().unwrap();

    assert_eq!(remerged.toc, original.toc);
    assert_eq!(remerged.page_count(), original.page_count());
}

#[tokio::test]
async fn test_reimport_without_toc_keeps_first_page() {
    let options = MergeOptions {
        table_of_contents: false,
        ..MergeOptions::default()
    };
    let bytes = merge_to_bytes(&grouped_workspace(), &options).await;

    let mut workspace = reimport(bytes);
    workspace.restore_embedded_groups(0).unwrap();

    assert_eq!(workspace.registry().len(), 5);
    assert_eq!(group_pages(&workspace, "Intro"), vec!["f0-p0", "f0-p1"]);
}

#[tokio::test]
async fn test_output_without_embedded_layout() {
    let options = MergeOptions {
        embed_layout: false,
        ..MergeOptions::default()
    };
    let bytes = merge_to_bytes(&grouped_workspace(), &options).await;

    let mut workspace = reimport(bytes);
    assert_eq!(workspace.restore_embedded_groups(0).unwrap(), 0);
    assert!(workspace.partition().is_empty());
    assert_eq!(workspace.registry().len(), 6);
}

#[test]
fn test_plain_document_has_no_layout() {
    let document = loaded("plain", 2);
    assert_eq!(read_embedded(&document.document).unwrap(), None);
}

#[tokio::test]
async fn test_layout_file_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("layout.json");
    tokio::fs::write(
        &path,
        r#"{ "groups": [{ "name": "Body", "pages": ["f0-p1"] }], "order": ["f0-p2"], "deleted": ["f0-p0"] }"#,
    )
    .await
    .unwrap();

    let mut workspace = workspace_with(&[("a", 3)]);
    let layout = LayoutFile::load(&path).await.unwrap();
    workspace.apply_layout(&layout).unwrap();

    assert_eq!(registry_order(&workspace), vec!["f0-p2", "f0-p1"]);
    assert_eq!(group_pages(&workspace, "Body"), vec!["f0-p1"]);
}

#[tokio::test]
async fn test_broken_layout_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("layout.json");
    tokio::fs::write(&path, "{ \"groups\": [").await.unwrap();

    let err = LayoutFile::load(&path).await.unwrap_err();
    assert!(matches!(err, PageMergeError::InvalidLayout { .. }));
}

#[test]
fn test_layout_naming_unknown_page_is_rejected() {
    let mut workspace = workspace_with(&[("a", 1)]);
    let layout = LayoutFile::from_json(r#"{ "groups": [{ "name": "X", "pages": ["f3-p0"] }] }"#)
        .unwrap();

    let err = workspace.apply_layout(&layout).unwrap_err();
    assert!(matches!(err, PageMergeError::UnknownPage { .. }));
    assert!(workspace.partition().is_empty());
}

#[test]
fn test_layout_template_round_trips_through_json() {
    let workspace = grouped_workspace();
    let json = workspace.layout_template().to_json_pretty().unwrap();

    let mut fresh = workspace_with(&[("a", 3), ("b", 2)]);
    fresh.apply_layout(&LayoutFile::from_json(&json).unwrap()).unwrap();

    assert_eq!(group_names(&fresh), group_names(&workspace));
    assert_eq!(group_pages(&fresh, "Intro"), vec!["f1-p0", "f0-p0"]);
    assert_eq!(registry_order(&fresh), registry_order(&workspace));
}

#[test]
fn test_layout_order_skips_deleted_pages() {
    let mut workspace = workspace_with(&[("a", 2), ("b", 2)]);
    let layout = LayoutFile::from_json(
        r#"{ "order": ["f0-p0", "f1-p1", "f0-p1"], "deleted": ["f0-p0"] }"#,
    )
    .unwrap();

    workspace.apply_layout(&layout).unwrap();

    assert_eq!(registry_order(&workspace), vec!["f1-p1", "f0-p1", "f1-p0"]);
}

/// A four-page document carrying a hand-written layout attachment.
fn with_embedded_sections(sections: Vec<TocEntry>) -> Workspace {
    let mut document = lopdf::Document::load_mem(&build_pdf("merged", 4)).unwrap();
    embed(&mut document, &EmbeddedLayout::new(sections, true)).unwrap();
    let mut bytes = Vec::new();
    document.save_to(&mut bytes).unwrap();
    reimport(bytes)
}

fn grouped(name: &str, start: usize, end: usize) -> TocEntry {
    TocEntry {
        name: name.to_string(),
        start,
        end,
        grouped: true,
    }
}

#[rstest]
#[case(grouped("Intro", 2, 9))]
#[case(grouped("Intro", 1, 2))]
#[case(grouped("Intro", 4_294_967_299, 4_294_967_299))]
fn test_out_of_range_embedded_layout_is_rejected(#[case] bad: TocEntry) {
    let mut workspace = with_embedded_sections(vec![grouped("Body", 3, 3), bad]);

    let err = workspace.restore_embedded_groups(0).unwrap_err();

    assert!(matches!(err, PageMergeError::InvalidLayout { .. }));
    assert!(workspace.partition().is_empty());
    assert_eq!(registry_order(&workspace), vec!["f0-p0", "f0-p1", "f0-p2", "f0-p3"]);
}

#[test]
fn test_blank_embedded_group_name_is_rejected() {
    let mut workspace = with_embedded_sections(vec![grouped("Body", 2, 2), grouped("", 3, 4)]);

    let err = workspace.restore_embedded_groups(0).unwrap_err();

    assert!(matches!(err, PageMergeError::InvalidGroupName { .. }));
    assert!(workspace.partition().is_empty());
}

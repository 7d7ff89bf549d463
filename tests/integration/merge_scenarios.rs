//! End-to-end merges driven through the workspace.

use rstest::rstest;

use pagemerge::PageMergeError;
use pagemerge::config::{CompressionLevel, MergeOptions};
use pagemerge::merge::pages::media_box;
use pagemerge::model::PageId;
use pagemerge::workspace::Workspace;

use crate::common::{
    A4, LETTER, fixture_media_box, loaded, page_texts, workspace_with,
};

fn uncompressed() -> MergeOptions {
    MergeOptions {
        compression: CompressionLevel::None,
        ..MergeOptions::default()
    }
}

/// Intro = [f0-p0, f0-p1], Body = [f1-p0], f1-p1 ungrouped.
fn scenario_workspace() -> Workspace {
    let mut workspace = workspace_with(&[("a", 2), ("b", 2)]);
    let intro = workspace.create_group("Intro").unwrap();
    let body = workspace.create_group("Body").unwrap();
    workspace.apply_raw_gesture("f0-p0", intro.as_str());
    workspace.apply_raw_gesture("f0-p1", intro.as_str());
    workspace.apply_raw_gesture("f1-p0", body.as_str());
    workspace
}

#[tokio::test]
async fn test_scenario_toc_and_page_order() {
    let workspace = scenario_workspace();

    let merged = workspace.merge(&uncompressed()).await.unwrap().unwrap();

    let labels: Vec<String> = merged.toc.iter().map(|e| e.label()).collect();
    assert_eq!(labels, vec!["Intro: 2 - 3", "Body: 4 - 4", "Ungrouped: 5 - 5"]);

    let texts = page_texts(&merged.document);
    assert_eq!(texts.len(), 5);
    assert_eq!(
        texts[0],
        vec!["Table of Contents", "Intro: 2 - 3", "Body: 4 - 4", "Ungrouped: 5 - 5"]
    );
    assert_eq!(texts[1], vec!["a 1"]);
    assert_eq!(texts[2], vec!["a 2"]);
    assert_eq!(texts[3], vec!["b 1"]);
    assert_eq!(texts[4], vec!["b 2"]);
}

#[tokio::test]
async fn test_toc_links_point_at_section_starts() {
    let workspace = scenario_workspace();
    let merged = workspace.merge(&uncompressed()).await.unwrap().unwrap();
    let doc = &merged.document;

    let pages = doc.get_pages();
    let toc_page = doc.get_dictionary(pages[&1]).unwrap();
    let annots = toc_page.get(b"Annots").unwrap().as_array().unwrap();
    assert_eq!(annots.len(), 3);

    let targets: Vec<_> = annots
        .iter()
        .map(|annot| {
            let annot = doc.get_dictionary(annot.as_reference().unwrap()).unwrap();
            let dest = annot.get(b"Dest").unwrap().as_array().unwrap();
            dest[0].as_reference().unwrap()
        })
        .collect();

    assert_eq!(targets, vec![pages[&2], pages[&4], pages[&5]]);
}

#[rstest]
#[case(vec![2, 1], 1)]
#[case(vec![3], 0)]
#[case(vec![], 4)]
#[case(vec![1, 1, 1], 2)]
#[tokio::test]
async fn test_sections_are_contiguous(#[case] group_sizes: Vec<usize>, #[case] ungrouped: usize) {
    let total: usize = group_sizes.iter().sum::<usize>() + ungrouped;
    let mut workspace = workspace_with(&[("doc", total)]);

    let mut next = 0u32;
    for (index, &size) in group_sizes.iter().enumerate() {
        let group = workspace.create_group(&format!("G{index}")).unwrap();
        for _ in 0..size {
            workspace.apply_raw_gesture(&PageId::new(0, next).to_string(), group.as_str());
            next += 1;
        }
    }

    let merged = workspace.merge(&uncompressed()).await.unwrap().unwrap();

    assert_eq!(merged.page_count(), 1 + total);
    let expected_entries = group_sizes.len() + usize::from(ungrouped > 0);
    assert_eq!(merged.toc.len(), expected_entries);

    let mut expected_start = 2;
    for (index, entry) in merged.toc.iter().enumerate() {
        assert_eq!(entry.start, expected_start, "entry {index} starts late");
        assert!(entry.end >= entry.start);
        expected_start = entry.end + 1;
    }
    assert_eq!(expected_start, total + 2);
    if ungrouped > 0 {
        assert_eq!(merged.toc.last().unwrap().name, "Ungrouped");
    }
}

#[tokio::test]
async fn test_page_geometry_survives_the_merge() {
    let workspace = workspace_with(&[("a", 3)]);

    let merged = workspace.merge(&uncompressed()).await.unwrap().unwrap();
    let doc = &merged.document;
    let pages = doc.get_pages();

    assert_eq!(media_box(doc, pages[&1]), LETTER);
    for n in 1..=3 {
        assert_eq!(media_box(doc, pages[&(n as u32 + 1)]), fixture_media_box(n));
    }
    assert_eq!(media_box(doc, pages[&2]), A4);
}

#[tokio::test]
async fn test_group_labels_only_on_grouped_pages() {
    let workspace = scenario_workspace();
    let options = MergeOptions {
        label_pages: true,
        ..uncompressed()
    };

    let merged = workspace.merge(&options).await.unwrap().unwrap();
    let texts = page_texts(&merged.document);

    assert_eq!(texts[1], vec!["a 1", "Group: Intro"]);
    assert_eq!(texts[3], vec!["b 1", "Group: Body"]);
    assert_eq!(texts[4], vec!["b 2"]);
}

#[tokio::test]
async fn test_empty_groups_and_deleted_pages_are_left_out() {
    let mut workspace = scenario_workspace();
    workspace.create_group("Appendix").unwrap();
    workspace.delete_page(&PageId::new(1, 1));

    let merged = workspace.merge(&uncompressed()).await.unwrap().unwrap();

    let labels: Vec<String> = merged.toc.iter().map(|e| e.label()).collect();
    assert_eq!(labels, vec!["Intro: 2 - 3", "Body: 4 - 4"]);
    assert_eq!(merged.page_count(), 4);
}

#[tokio::test]
async fn test_group_order_follows_partition() {
    let mut workspace = scenario_workspace();
    let body = workspace.partition().iter().nth(1).unwrap().id().clone();
    let intro = workspace.partition().iter().next().unwrap().id().clone();
    workspace.apply_raw_gesture(body.as_str(), intro.as_str());

    let merged = workspace.merge(&uncompressed()).await.unwrap().unwrap();

    let labels: Vec<String> = merged.toc.iter().map(|e| e.label()).collect();
    assert_eq!(labels, vec!["Body: 2 - 2", "Intro: 3 - 4", "Ungrouped: 5 - 5"]);
    assert_eq!(page_texts(&merged.document)[1], vec!["b 1"]);
}

#[tokio::test]
async fn test_merge_without_documents() {
    let workspace = Workspace::new();
    assert!(workspace.merge(&MergeOptions::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_merge_with_every_page_deleted() {
    let mut workspace = Workspace::new();
    let index = workspace.add_document(loaded("a", 1));
    workspace.register_pages(index).unwrap();
    workspace.delete_page(&PageId::new(0, 0));

    let err = workspace.merge(&MergeOptions::default()).await.err().unwrap();
    assert!(matches!(err, PageMergeError::NoPagesToMerge));
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
#[tokio::test]
async fn test_every_compression_level_reloads(#[case] compression: CompressionLevel) {
    let workspace = scenario_workspace();
    let options = MergeOptions {
        compression,
        bookmarks: true,
        ..MergeOptions::default()
    };

    let mut merged = workspace.merge(&options).await.unwrap().unwrap();
    let bytes = merged.to_bytes().unwrap();
    let reloaded = lopdf::Document::load_mem(&bytes).unwrap();

    assert_eq!(reloaded.get_pages().len(), 5);
    assert_eq!(page_texts(&reloaded)[4], vec!["b 2"]);
}

//! Drag-and-drop gestures applied through raw front-end ids.

use rstest::rstest;

use pagemerge::model::PageId;
use pagemerge::reorder::{Container, DragItem, GestureOutcome};

use crate::common::{group_names, group_pages, registry_order, workspace_with};

#[test]
fn test_drag_page_onto_group_appends() {
    let mut workspace = workspace_with(&[("a", 3)]);
    let intro = workspace.create_group("Intro").unwrap();
    workspace.apply_raw_gesture("f0-p1", intro.as_str());

    let outcome = workspace.apply_raw_gesture("f0-p0", intro.as_str());

    assert_eq!(
        outcome,
        GestureOutcome::PageMoved {
            page: PageId::new(0, 0),
            to: Container::Group(intro.clone()),
        }
    );
    assert_eq!(group_pages(&workspace, "Intro"), vec!["f0-p1", "f0-p0"]);
    let ungrouped: Vec<String> = workspace.ungrouped().iter().map(|p| p.id().to_string()).collect();
    assert_eq!(ungrouped, vec!["f0-p2"]);
}

#[test]
fn test_drag_page_onto_grouped_page_inserts_before_it() {
    let mut workspace = workspace_with(&[("a", 3)]);
    let intro = workspace.create_group("Intro").unwrap();
    workspace.apply_raw_gesture("f0-p0", intro.as_str());
    workspace.apply_raw_gesture("f0-p1", intro.as_str());

    workspace.apply_raw_gesture("f0-p2", "f0-p1");

    assert_eq!(group_pages(&workspace, "Intro"), vec!["f0-p0", "f0-p2", "f0-p1"]);
}

#[test]
fn test_move_page_between_groups() {
    let mut workspace = workspace_with(&[("a", 2)]);
    let intro = workspace.create_group("Intro").unwrap();
    let body = workspace.create_group("Body").unwrap();
    workspace.apply_raw_gesture("f0-p0", intro.as_str());

    workspace.apply_raw_gesture("f0-p0", body.as_str());

    assert!(group_pages(&workspace, "Intro").is_empty());
    assert_eq!(group_pages(&workspace, "Body"), vec!["f0-p0"]);
}

#[test]
fn test_drag_grouped_page_back_to_ungrouped() {
    let mut workspace = workspace_with(&[("a", 3)]);
    let intro = workspace.create_group("Intro").unwrap();
    workspace.apply_raw_gesture("f0-p0", intro.as_str());

    let outcome = workspace.apply_raw_gesture("f0-p0", "ungrouped");

    assert!(outcome.is_changed());
    assert!(group_pages(&workspace, "Intro").is_empty());
    assert_eq!(registry_order(&workspace), vec!["f0-p1", "f0-p2", "f0-p0"]);
    assert_eq!(
        workspace.container_of(&DragItem::Page(PageId::new(0, 0))),
        Some(Container::Ungrouped)
    );
}

#[test]
fn test_drag_grouped_page_onto_ungrouped_page() {
    let mut workspace = workspace_with(&[("a", 3)]);
    let intro = workspace.create_group("Intro").unwrap();
    workspace.apply_raw_gesture("f0-p2", intro.as_str());

    workspace.apply_raw_gesture("f0-p2", "f0-p0");

    assert!(group_pages(&workspace, "Intro").is_empty());
    assert_eq!(registry_order(&workspace), vec!["f0-p2", "f0-p0", "f0-p1"]);
}

#[test]
fn test_reorder_within_ungrouped() {
    let mut workspace = workspace_with(&[("a", 2), ("b", 1)]);

    workspace.apply_raw_gesture("f0-p1", "f0-p0");

    assert_eq!(registry_order(&workspace), vec!["f0-p1", "f0-p0", "f1-p0"]);
    assert!(workspace.partition().is_empty());
}

#[test]
fn test_reorder_groups() {
    let mut workspace = workspace_with(&[("a", 1)]);
    let intro = workspace.create_group("Intro").unwrap();
    workspace.create_group("Body").unwrap();
    let appendix = workspace.create_group("Appendix").unwrap();

    let outcome = workspace.apply_raw_gesture(appendix.as_str(), intro.as_str());

    assert_eq!(outcome, GestureOutcome::GroupMoved { group: appendix });
    assert_eq!(group_names(&workspace), vec!["Appendix", "Intro", "Body"]);
}

#[test]
fn test_drop_group_onto_member_page_of_other_group() {
    let mut workspace = workspace_with(&[("a", 1)]);
    let intro = workspace.create_group("Intro").unwrap();
    let body = workspace.create_group("Body").unwrap();
    workspace.apply_raw_gesture("f0-p0", intro.as_str());

    workspace.apply_raw_gesture(body.as_str(), "f0-p0");

    assert_eq!(group_names(&workspace), vec!["Body", "Intro"]);
}

#[rstest]
#[case("f0-p0", "f0-p0")]
#[case("f0-p0", "f9-p9")]
#[case("bogus", "f0-p0")]
#[case("ungrouped", "f0-p0")]
fn test_meaningless_gestures_change_nothing(#[case] dragged: &str, #[case] target: &str) {
    let mut workspace = workspace_with(&[("a", 2)]);
    let before = registry_order(&workspace);

    assert_eq!(workspace.apply_raw_gesture(dragged, target), GestureOutcome::Unchanged);
    assert_eq!(registry_order(&workspace), before);
    assert!(workspace.partition().is_empty());
}

#[test]
fn test_group_dropped_on_ungrouped_is_ignored() {
    let mut workspace = workspace_with(&[("a", 2)]);
    let intro = workspace.create_group("Intro").unwrap();
    workspace.create_group("Body").unwrap();

    assert_eq!(
        workspace.apply_raw_gesture(intro.as_str(), "f0-p0"),
        GestureOutcome::Unchanged
    );
    assert_eq!(
        workspace.apply_raw_gesture(intro.as_str(), "ungrouped"),
        GestureOutcome::Unchanged
    );
    assert_eq!(group_names(&workspace), vec!["Intro", "Body"]);
}

#[test]
fn test_page_never_in_two_groups() {
    let mut workspace = workspace_with(&[("a", 4)]);
    let groups: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|name| workspace.create_group(name).unwrap())
        .collect();

    for round in 0..12u32 {
        let page = format!("f0-p{}", round % 4);
        let group = &groups[(round as usize * 7) % groups.len()];
        workspace.apply_raw_gesture(&page, group.as_str());
    }

    let mut seen = std::collections::HashSet::new();
    for group in workspace.partition().iter() {
        for page in group.pages() {
            assert!(seen.insert(page.clone()), "{page} is in two groups");
        }
    }
    assert_eq!(workspace.registry().len(), 4);
}

//! Drag-and-drop gesture interpretation.
//!
//! A front end reports a gesture as "this item was dropped on that item".
//! [`apply`] turns that into registry and partition mutations. Gestures that
//! do not mean anything (a group dropped on an ungrouped page, an item dropped
//! on itself, unknown ids) leave the state untouched.

use crate::model::{GroupId, GroupPartition, PageId, PageRegistry};

/// One end of a drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DragItem {
    /// A single page thumbnail.
    Page(PageId),
    /// A group container (its header or empty body).
    Group(GroupId),
    /// The container of pages that belong to no group.
    Ungrouped,
}

/// A completed drag: `dragged` was released over `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gesture {
    /// Item being moved.
    pub dragged: DragItem,
    /// Item it was dropped on.
    pub target: DragItem,
}

impl Gesture {
    /// Create a gesture.
    pub fn new(dragged: DragItem, target: DragItem) -> Self {
        Self { dragged, target }
    }
}

/// Where a page lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Container {
    /// Inside the given group.
    Group(GroupId),
    /// In the ungrouped set.
    Ungrouped,
}

/// What a gesture did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing changed.
    Unchanged,
    /// A page moved; `to` is its container afterwards.
    PageMoved {
        /// The moved page.
        page: PageId,
        /// Container holding the page now.
        to: Container,
    },
    /// A group changed position in the partition.
    GroupMoved {
        /// The moved group.
        group: GroupId,
    },
}

impl GestureOutcome {
    /// Check whether the gesture mutated anything.
    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Find the container an item belongs to.
///
/// Pages resolve to their group or to [`Container::Ungrouped`]; groups and the
/// ungrouped container resolve to themselves. Unknown items resolve to `None`.
pub fn container_of(
    registry: &PageRegistry,
    partition: &GroupPartition,
    item: &DragItem,
) -> Option<Container> {
    match item {
        DragItem::Page(page) => {
            if !registry.contains(page) {
                return None;
            }
            Some(match partition.group_of(page) {
                Some(group) => Container::Group(group.clone()),
                None => Container::Ungrouped,
            })
        }
        DragItem::Group(group) => partition.get(group).map(|_| Container::Group(group.clone())),
        DragItem::Ungrouped => Some(Container::Ungrouped),
    }
}

/// Apply a gesture to the registry and partition.
pub fn apply(
    registry: &mut PageRegistry,
    partition: &mut GroupPartition,
    gesture: &Gesture,
) -> GestureOutcome {
    if gesture.dragged == gesture.target {
        return GestureOutcome::Unchanged;
    }

    let (Some(source), Some(destination)) = (
        container_of(registry, partition, &gesture.dragged),
        container_of(registry, partition, &gesture.target),
    ) else {
        log::debug!("ignoring gesture with unknown item: {gesture:?}");
        return GestureOutcome::Unchanged;
    };

    match (&gesture.dragged, &gesture.target) {
        (DragItem::Page(page), DragItem::Group(group)) => {
            if partition.move_page_into_group(page, group, None) {
                page_moved(page, Container::Group(group.clone()))
            } else {
                GestureOutcome::Unchanged
            }
        }

        (DragItem::Group(group), DragItem::Group(before)) => {
            group_moved(group, partition.reorder_groups(group, before))
        }

        (DragItem::Page(page), DragItem::Page(before)) if source == destination => {
            let changed = match &source {
                Container::Ungrouped => registry.reorder(page, before),
                Container::Group(group) => partition.reorder_within_group(group, page, before),
            };
            if changed {
                page_moved(page, source)
            } else {
                GestureOutcome::Unchanged
            }
        }

        (DragItem::Page(page), DragItem::Page(before)) => match destination {
            Container::Group(group) => {
                partition.move_page_into_group(page, &group, Some(before));
                page_moved(page, Container::Group(group))
            }
            Container::Ungrouped => {
                partition.remove_from_groups(page);
                registry.reorder(page, before);
                page_moved(page, Container::Ungrouped)
            }
        },

        (DragItem::Page(page), DragItem::Ungrouped) => {
            let already_last = registry.index_of(page) == Some(registry.len() - 1);
            if source == Container::Ungrouped && already_last {
                return GestureOutcome::Unchanged;
            }
            partition.remove_from_groups(page);
            registry.move_to_end(page);
            page_moved(page, Container::Ungrouped)
        }

        (DragItem::Group(group), DragItem::Page(_)) => match destination {
            Container::Group(before) => group_moved(group, partition.reorder_groups(group, &before)),
            Container::Ungrouped => GestureOutcome::Unchanged,
        },

        (DragItem::Group(_), DragItem::Ungrouped) | (DragItem::Ungrouped, _) => {
            GestureOutcome::Unchanged
        }
    }
}

fn page_moved(page: &PageId, to: Container) -> GestureOutcome {
    GestureOutcome::PageMoved {
        page: page.clone(),
        to,
    }
}

fn group_moved(group: &GroupId, changed: bool) -> GestureOutcome {
    if changed {
        GestureOutcome::GroupMoved {
            group: group.clone(),
        }
    } else {
        GestureOutcome::Unchanged
    }
}

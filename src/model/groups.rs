//! Named, ordered page groups.
//!
//! A page belongs to at most one group. Every mutator that changes
//! membership removes the page from its previous group in the same call,
//! so no caller can observe a page listed twice.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PageMergeError, Result};
use crate::model::page::PageId;

/// Identifier of a group, `group-{n}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    fn from_counter(n: u64) -> Self {
        Self(format!("group-{n}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, ordered list of page ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    name: String,
    pages: Vec<PageId>,
}

impl Group {
    /// Group id.
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// Display name given at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member pages in group order.
    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }

    /// Check whether the group holds no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn position(&self, page: &PageId) -> Option<usize> {
        self.pages.iter().position(|p| p == page)
    }
}

/// Ordered collection of groups; order is merge output order.
#[derive(Debug, Clone, Default)]
pub struct GroupPartition {
    groups: Vec<Group>,
    next_id: u64,
}

impl GroupPartition {
    /// Create an empty partition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new empty group and return its id.
    ///
    /// Ids come from a counter that is never rewound, so they stay unique
    /// even after groups are deleted.
    ///
    /// # Errors
    ///
    /// Returns [`PageMergeError::InvalidGroupName`] if the name is blank.
    pub fn create_group(&mut self, name: &str) -> Result<GroupId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PageMergeError::InvalidGroupName {
                name: name.to_string(),
            });
        }

        self.next_id += 1;
        let id = GroupId::from_counter(self.next_id);
        self.groups.push(Group {
            id: id.clone(),
            name: name.to_string(),
            pages: Vec::new(),
        });
        Ok(id)
    }

    /// Remove a group. Its pages become ungrouped; none are deleted.
    pub fn delete_group(&mut self, id: &GroupId) -> Option<Group> {
        let index = self.index_of(id)?;
        Some(self.groups.remove(index))
    }

    /// Move a page into `group`, before `before` or at the end.
    ///
    /// The page is first taken out of whichever group holds it (possibly
    /// `group` itself). If `before` is absent or not a member of `group`,
    /// the page is appended. Returns false if `group` does not exist, in
    /// which case nothing changes.
    pub fn move_page_into_group(
        &mut self,
        page: &PageId,
        group: &GroupId,
        before: Option<&PageId>,
    ) -> bool {
        if self.index_of(group).is_none() || before == Some(page) {
            return false;
        }

        self.remove_from_groups(page);

        let Some(target) = self.groups.iter_mut().find(|g| &g.id == group) else {
            return false;
        };
        let at = before
            .and_then(|b| target.position(b))
            .unwrap_or(target.pages.len());
        target.pages.insert(at, page.clone());
        true
    }

    /// Take a page out of any group, making it ungrouped.
    ///
    /// Returns the group it was removed from.
    pub fn remove_from_groups(&mut self, page: &PageId) -> Option<GroupId> {
        for group in &mut self.groups {
            if let Some(index) = group.position(page) {
                group.pages.remove(index);
                return Some(group.id.clone());
            }
        }
        None
    }

    /// Move `group` so that it sits immediately before `before`.
    pub fn reorder_groups(&mut self, group: &GroupId, before: &GroupId) -> bool {
        if group == before {
            return false;
        }
        let (Some(from), Some(_)) = (self.index_of(group), self.index_of(before)) else {
            return false;
        };

        let moved = self.groups.remove(from);
        let to = self.index_of(before).unwrap_or(self.groups.len());
        self.groups.insert(to, moved);
        true
    }

    /// Reorder a page within its group, placing it before `before`.
    ///
    /// Both pages must already belong to `group`.
    pub fn reorder_within_group(&mut self, group: &GroupId, page: &PageId, before: &PageId) -> bool {
        if page == before {
            return false;
        }
        let Some(target) = self.groups.iter_mut().find(|g| &g.id == group) else {
            return false;
        };
        let (Some(from), Some(_)) = (target.position(page), target.position(before)) else {
            return false;
        };

        let moved = target.pages.remove(from);
        let to = target.position(before).unwrap_or(target.pages.len());
        target.pages.insert(to, moved);
        true
    }

    /// The group currently holding `page`, if any.
    pub fn group_of(&self, page: &PageId) -> Option<&GroupId> {
        self.groups
            .iter()
            .find(|g| g.position(page).is_some())
            .map(|g| &g.id)
    }

    /// Look up a group by id.
    pub fn get(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    /// Find a group id from its string form.
    pub fn find(&self, raw: &str) -> Option<&GroupId> {
        self.groups.iter().map(|g| &g.id).find(|id| id.as_str() == raw)
    }

    /// Iterate groups in partition order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn index_of(&self, id: &GroupId) -> Option<usize> {
        self.groups.iter().position(|g| &g.id == id)
    }
}

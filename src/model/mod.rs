//! Page and group data model.
//!
//! - [`page`]: page identity (`f{document}-p{page}`)
//! - [`registry`]: flat ordered list of every known page
//! - [`groups`]: named, ordered groups over a subset of the registry

pub mod groups;
pub mod page;
pub mod registry;

pub use groups::{Group, GroupId, GroupPartition};
pub use page::{DocumentIndex, Page, PageId};
pub use registry::PageRegistry;

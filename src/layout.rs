//! JSON layout files.
//!
//! A layout file lets the command line do what a drag-and-drop front end does
//! interactively: name groups, assign pages to them, reorder the remaining
//! pages and drop unwanted ones.
//!
//! ```json
//! {
//!   "groups": [
//!     { "name": "Intro", "pages": ["f0-p0", "f0-p1"] },
//!     { "name": "Body", "pages": ["f1-p0"] }
//!   ],
//!   "order": ["f1-p1"],
//!   "deleted": ["f0-p2"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PageMergeError, Result};

/// One named group in a layout file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGroup {
    /// Group name, shown in the table of contents.
    pub name: String,
    /// Page ids in group order.
    #[serde(default)]
    pub pages: Vec<String>,
}

/// Group and ordering instructions for a set of loaded documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutFile {
    /// Groups in output order.
    #[serde(default)]
    pub groups: Vec<LayoutGroup>,

    /// Page ids to move to the front of the page order, in this order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,

    /// Page ids to drop entirely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

impl LayoutFile {
    /// Parse a layout from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a layout file.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PageMergeError::file_not_found(path.to_path_buf())
            } else {
                PageMergeError::Io { source: e }
            }
        })?;
        Self::from_json(&text).map_err(|e| {
            PageMergeError::invalid_layout(format!("{}: {e}", path.display()))
        })
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

//! GitLab REST v4 wire models.
//!
//! Only the fields the inventory reads are modelled; serde ignores the rest.

use serde::Deserialize;

/// Entry of the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectSummary {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
    #[serde(default)]
    pub archived: bool,
}

/// Full project record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
    /// `None` for empty repositories.
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub ssh_url_to_repo: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub archived: bool,
}

/// Entry of a repository tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    /// Object id of the blob or tree.
    pub id: String,
    pub name: String,
    /// `blob`, `tree` or `commit` (submodule).
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    /// Git file mode; `120000` marks a symlink.
    #[serde(default)]
    pub mode: String,
}

impl TreeEntry {
    /// Whether the entry is a symbolic link.
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.mode == "120000"
    }
}

/// Raw blob as returned by `repository/blobs/:sha`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Blob {
    pub content: String,
    /// `base64` (GitLab's default) or `text`.
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub sha: String,
}

fn default_encoding() -> String {
    "base64".to_string()
}

/// Repository tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub name: String,
}

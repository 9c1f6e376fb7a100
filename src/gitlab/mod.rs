//! Access to the source-code hosting platform.
//!
//! The inventory only needs six read operations from GitLab. They are
//! expressed as the [`ProjectHost`] trait so that the traversal can run
//! against the real REST API ([`GitlabClient`]) or an in-memory fixture.
//!
//! # Not-found handling
//!
//! [`ProjectHost::list_tree`] is the only operation where a 404 is an
//! expected outcome: it returns `Ok(None)` instead of an error so callers can
//! branch on it without inspecting error variants.

mod client;
pub mod models;

pub use client::GitlabClient;
pub use models::{Blob, Project, ProjectSummary, Tag, TreeEntry};

use crate::core::RolegraphError;

/// Read operations the inventory needs from the hosting platform.
#[allow(async_fn_in_trait)]
pub trait ProjectHost {
    /// Verify that the configured credential is accepted.
    async fn authenticate(&self) -> Result<(), RolegraphError>;

    /// List every project with the given visibility (all pages).
    async fn list_projects(&self, visibility: &str) -> Result<Vec<ProjectSummary>, RolegraphError>;

    /// Fetch the full project record.
    async fn get_project(&self, id: u64) -> Result<Project, RolegraphError>;

    /// List the entries of `path` at `reference`.
    ///
    /// Returns `Ok(None)` when the directory (or the reference) does not exist.
    async fn list_tree(
        &self,
        project_id: u64,
        path: &str,
        reference: &str,
    ) -> Result<Option<Vec<TreeEntry>>, RolegraphError>;

    /// Fetch a blob by its object id.
    async fn get_blob(&self, project_id: u64, sha: &str) -> Result<Blob, RolegraphError>;

    /// List the repository tags in the order the platform returns them.
    async fn list_tags(&self, project_id: u64) -> Result<Vec<Tag>, RolegraphError>;
}

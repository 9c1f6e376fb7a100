//! Metadata Fetcher: read one YAML file out of a repository directory.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_yaml::Value;
use tracing::debug;

use crate::core::RolegraphError;
use crate::gitlab::{Blob, Project, ProjectHost};
use crate::utils::Diagnostics;

/// Result of looking for a metadata file.
///
/// Every variant except [`FetchOutcome::Found`] means "no metadata here";
/// they are kept apart so callers and tests can tell why.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The file exists and parsed as YAML.
    Found(Value),
    /// The directory (or the whole repository tree) does not exist.
    DirectoryMissing,
    /// The directory exists but lists no entries.
    DirectoryEmpty,
    /// The directory has no entry with the requested name.
    FileMissing,
    /// The file is listed but its blob could not be retrieved.
    BlobUnavailable,
}

impl FetchOutcome {
    /// The parsed document, if any.
    #[must_use]
    pub fn into_found(self) -> Option<Value> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Reads metadata files through a [`ProjectHost`].
pub struct MetadataFetcher<'a, H> {
    host: &'a H,
    diagnostics: Diagnostics,
}

impl<'a, H: ProjectHost> MetadataFetcher<'a, H> {
    /// Create a fetcher reporting to `diagnostics`.
    pub const fn new(host: &'a H, diagnostics: Diagnostics) -> Self {
        Self {
            host,
            diagnostics,
        }
    }

    /// Fetch `directory/filename` at the project's default branch and parse it.
    ///
    /// A missing directory, an empty directory, a missing file and an
    /// unreadable blob are soft outcomes. Any other listing failure is
    /// [`RolegraphError::TreeListingFailed`]; undecodable or unparseable
    /// content is [`RolegraphError::InvalidMetadata`].
    pub async fn fetch(
        &self,
        project: &Project,
        directory: &str,
        filename: &str,
    ) -> Result<FetchOutcome, RolegraphError> {
        let Some(reference) = project.default_branch.as_deref() else {
            self.diagnostics.info(format!(
                "skip project '{}', because it has no default branch",
                project.name
            ));
            return Ok(FetchOutcome::DirectoryMissing);
        };

        let entries = match self.host.list_tree(project.id, directory, reference).await {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                self.diagnostics.info(format!(
                    "skip project '{}', because it has no '{directory}' directory",
                    project.name
                ));
                return Ok(FetchOutcome::DirectoryMissing);
            }
            Err(e) => {
                self.diagnostics.error(format!(
                    "failed to list '{directory}' in '{}': {e}",
                    project.path_with_namespace
                ));
                return Err(RolegraphError::TreeListingFailed {
                    project: project.path_with_namespace.clone(),
                    path: directory.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        if entries.is_empty() {
            debug!(project = %project.path_with_namespace, directory, "Directory is empty");
            return Ok(FetchOutcome::DirectoryEmpty);
        }

        let Some(entry) = entries.iter().find(|entry| entry.name == filename) else {
            debug!(project = %project.path_with_namespace, directory, filename, "File not present");
            return Ok(FetchOutcome::FileMissing);
        };

        if entry.is_symlink() {
            debug!(project = %project.path_with_namespace, path = %entry.path, "Entry is a symlink");
        }

        let blob = match self.host.get_blob(project.id, &entry.id).await {
            Ok(blob) => blob,
            Err(e) => {
                self.diagnostics.error(format!(
                    "failed to retrieve {} from '{}': {e}",
                    entry.path, project.path_with_namespace
                ));
                return Ok(FetchOutcome::BlobUnavailable);
            }
        };

        let invalid = |reason: String| RolegraphError::InvalidMetadata {
            project: project.path_with_namespace.clone(),
            file: format!("{directory}/{filename}"),
            reason,
        };

        let bytes = decode_blob(&blob).map_err(invalid)?;
        let value: Value =
            serde_yaml::from_slice(&bytes).map_err(|e| invalid(e.to_string()))?;

        Ok(FetchOutcome::Found(value))
    }
}

/// Decode blob content from its transport encoding.
pub fn decode_blob(blob: &Blob) -> Result<Vec<u8>, String> {
    match blob.encoding.as_str() {
        "base64" => {
            let compact: String =
                blob.content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            STANDARD.decode(compact).map_err(|e| format!("invalid base64 content: {e}"))
        }
        "text" | "" => Ok(blob.content.clone().into_bytes()),
        other => Err(format!("unsupported blob encoding '{other}'")),
    }
}

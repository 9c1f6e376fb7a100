//! In-memory [`ProjectHost`] for traversal tests.
//!
//! ```rust,no_run
//! use rolegraph::test_utils::{MockHost, MockProject};
//!
//! let host = MockHost::new()
//!     .with_role(12, "infra/webserver", "galaxy_info:\n  description: Installs nginx\n")
//!     .with_play(5, "ops/site", "- src: git@gitlab.example.com:infra/webserver.git\n")
//!     .with_project(MockProject::new(7, "infra/old").archived());
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::constants::{PLAY_REQUIREMENTS_DIR, PLAY_REQUIREMENTS_FILE, ROLE_META_DIR, ROLE_META_FILE};
use crate::core::RolegraphError;
use crate::gitlab::{Blob, Project, ProjectHost, ProjectSummary, Tag, TreeEntry};

const HOST: &str = "gitlab.example.com";

#[derive(Debug, Clone)]
struct MockFile {
    name: String,
    content: Option<String>,
    symlink: bool,
}

/// A project served by [`MockHost`].
#[derive(Debug, Clone)]
pub struct MockProject {
    project: Project,
    directories: HashMap<String, Vec<MockFile>>,
    failing: HashMap<String, u16>,
    tags: Vec<String>,
}

impl MockProject {
    /// Project `id` at `path`; its name is the last path segment.
    #[must_use]
    pub fn new(id: u64, path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        Self {
            project: Project {
                id,
                name,
                path_with_namespace: path.to_string(),
                default_branch: Some("main".to_string()),
                ssh_url_to_repo: format!("git@{HOST}:{path}.git"),
                web_url: format!("https://{HOST}/{path}"),
                archived: false,
            },
            directories: HashMap::new(),
            failing: HashMap::new(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn archived(mut self) -> Self {
        self.project.archived = true;
        self
    }

    /// Empty repository: no default branch.
    #[must_use]
    pub fn without_default_branch(mut self) -> Self {
        self.project.default_branch = None;
        self
    }

    fn entries(&mut self, directory: &str) -> &mut Vec<MockFile> {
        self.failing.remove(directory);
        self.directories.entry(directory.to_string()).or_default()
    }

    /// Add a file with YAML `content`.
    #[must_use]
    pub fn file(mut self, directory: &str, name: &str, content: &str) -> Self {
        self.entries(directory).push(MockFile {
            name: name.to_string(),
            content: Some(content.to_string()),
            symlink: false,
        });
        self
    }

    /// Add a symlink; GitLab serves the link target as blob content.
    #[must_use]
    pub fn symlink(mut self, directory: &str, name: &str, target: &str) -> Self {
        self.entries(directory).push(MockFile {
            name: name.to_string(),
            content: Some(target.to_string()),
            symlink: true,
        });
        self
    }

    /// Add a listed file whose blob cannot be fetched.
    #[must_use]
    pub fn unreadable(mut self, directory: &str, name: &str) -> Self {
        self.entries(directory).push(MockFile {
            name: name.to_string(),
            content: None,
            symlink: false,
        });
        self
    }

    /// Add an existing directory without entries.
    #[must_use]
    pub fn empty_dir(mut self, directory: &str) -> Self {
        self.entries(directory);
        self
    }

    /// Make listing `directory` fail with HTTP `status`.
    #[must_use]
    pub fn failing_dir(mut self, directory: &str, status: u16) -> Self {
        self.failing.insert(directory.to_string(), status);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }
}

/// [`ProjectHost`] serving a fixed list of projects from memory.
///
/// Every blob request is recorded so tests can check which metadata files a
/// traversal read.
#[derive(Debug, Default)]
pub struct MockHost {
    projects: Vec<MockProject>,
    reject_auth: bool,
    blob_requests: Mutex<Vec<String>>,
}

impl MockHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project; projects are listed in insertion order.
    #[must_use]
    pub fn with_project(mut self, project: MockProject) -> Self {
        self.projects.push(project);
        self
    }

    /// Add a role project with `meta/main.yml`.
    #[must_use]
    pub fn with_role(self, id: u64, path: &str, meta_main: &str) -> Self {
        self.with_project(MockProject::new(id, path).file(ROLE_META_DIR, ROLE_META_FILE, meta_main))
    }

    /// Add a play project with `roles/requirements.yml`.
    #[must_use]
    pub fn with_play(self, id: u64, path: &str, requirements: &str) -> Self {
        self.with_project(MockProject::new(id, path).file(
            PLAY_REQUIREMENTS_DIR,
            PLAY_REQUIREMENTS_FILE,
            requirements,
        ))
    }

    /// Fail authentication.
    #[must_use]
    pub fn rejecting_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    /// Blob requests so far, as `<project path>/<directory>/<file>`.
    pub fn blob_requests(&self) -> Vec<String> {
        self.blob_requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }

    fn find(&self, id: u64) -> Result<&MockProject, RolegraphError> {
        self.projects.iter().find(|p| p.project.id == id).ok_or_else(|| RolegraphError::NotFound {
            url: format!("/projects/{id}"),
        })
    }
}

fn blob_id(project: u64, directory: &str, name: &str) -> String {
    format!("{project}:{directory}/{name}")
}

impl ProjectHost for MockHost {
    async fn authenticate(&self) -> Result<(), RolegraphError> {
        if self.reject_auth {
            return Err(RolegraphError::AuthenticationFailed {
                url: format!("https://{HOST}"),
            });
        }
        Ok(())
    }

    async fn list_projects(&self, _visibility: &str) -> Result<Vec<ProjectSummary>, RolegraphError> {
        Ok(self
            .projects
            .iter()
            .map(|p| ProjectSummary {
                id: p.project.id,
                name: p.project.name.clone(),
                path_with_namespace: p.project.path_with_namespace.clone(),
                archived: p.project.archived,
            })
            .collect())
    }

    async fn get_project(&self, id: u64) -> Result<Project, RolegraphError> {
        Ok(self.find(id)?.project.clone())
    }

    async fn list_tree(
        &self,
        project_id: u64,
        path: &str,
        _reference: &str,
    ) -> Result<Option<Vec<TreeEntry>>, RolegraphError> {
        let project = self.find(project_id)?;
        if let Some(&status) = project.failing.get(path) {
            return Err(RolegraphError::Api {
                url: format!("/projects/{project_id}/repository/tree?path={path}"),
                status,
            });
        }
        match project.directories.get(path) {
            None => Ok(None),
            Some(files) => Ok(Some(
                files
                    .iter()
                    .map(|file| TreeEntry {
                        id: blob_id(project_id, path, &file.name),
                        name: file.name.clone(),
                        kind: "blob".to_string(),
                        path: format!("{path}/{}", file.name),
                        mode: if file.symlink { "120000" } else { "100644" }.to_string(),
                    })
                    .collect(),
            )),
        }
    }

    async fn get_blob(&self, project_id: u64, sha: &str) -> Result<Blob, RolegraphError> {
        let project = self.find(project_id)?;
        let not_found = || RolegraphError::NotFound {
            url: format!("/projects/{project_id}/repository/blobs/{sha}"),
        };
        let (directory, name) = sha
            .split_once(':')
            .and_then(|(_, file)| file.rsplit_once('/'))
            .ok_or_else(not_found)?;

        if let Ok(mut requests) = self.blob_requests.lock() {
            requests.push(format!("{}/{directory}/{name}", project.project.path_with_namespace));
        }

        let content = project
            .directories
            .get(directory)
            .and_then(|files| files.iter().find(|file| file.name == name))
            .and_then(|file| file.content.clone())
            .ok_or_else(not_found)?;

        Ok(Blob {
            size: content.len() as u64,
            content: STANDARD.encode(content),
            encoding: "base64".to_string(),
            sha: sha.to_string(),
        })
    }

    async fn list_tags(&self, project_id: u64) -> Result<Vec<Tag>, RolegraphError> {
        Ok(self.find(project_id)?.tags.iter().map(|name| Tag { name: name.clone() }).collect())
    }
}

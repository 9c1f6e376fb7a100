//! rolegraph - Ansible role inventory for GitLab
//!
//! Lists the internal projects of a GitLab instance, reads role metadata
//! (`meta/main.yml`) and play requirements (`roles/requirements.yml`) from
//! every project matching a path filter, and builds a dependency graph of
//! which plays and roles use which roles. The graph is rendered as an HTML
//! overview and a Graphviz diagram.
//!
//! # Architecture Overview
//!
//! ```text
//! GitLab ──> MetadataFetcher ──> extract_role / extract_play ──> Linker ──> EdgeTable
//!                                                                            │
//!                          reports <── Inventory <── reconcile <─────────────┘
//! ```
//!
//! Dependencies are recorded as reverse "used-by" edges keyed by target
//! project path during the traversal and resolved only after every project
//! has been seen. Targets that match no project become placeholder entities
//! (`role_external` for references without source, `role_unknown` otherwise).
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface
//! - [`config`] - Resolved runtime settings and the optional TOML settings file
//! - [`core`] - Error taxonomy and user-facing error reporting
//! - [`gitlab`] - The [`gitlab::ProjectHost`] seam and its REST implementation
//! - [`metadata`] - Fetching and interpreting metadata files
//! - [`inventory`] - Entities, dependency linking and the inventory builder
//! - [`report`] - HTML and Graphviz renderers
//! - [`utils`] - Console diagnostics and file helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use rolegraph::config::Settings;
//! use rolegraph::gitlab::{GitlabClient, ProjectHost};
//! use rolegraph::inventory::InventoryBuilder;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::new("https://gitlab.example.com")?
//!     .with_token(Some("glpat-...".to_string()))
//!     .with_filters(["ansible/roles/", "ansible/plays/"])?;
//! let client = GitlabClient::new(settings.gitlab_url(), settings.token.clone())?;
//! client.authenticate().await?;
//!
//! let inventory = InventoryBuilder::new(&client, &settings).build().await?;
//! rolegraph::report::write_reports(&inventory, &settings).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;

pub mod gitlab;
pub mod inventory;
pub mod metadata;

pub mod report;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

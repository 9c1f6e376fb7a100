//! Metadata files read from role and play repositories.
//!
//! - [`fetcher`] - Locate a file in a repository directory and parse it as YAML
//! - [`document`] - Classify parsed documents and read `meta/main.yml` fields
//! - [`dependency`] - Dependency references declared by roles and plays

pub mod dependency;
pub mod document;
pub mod fetcher;

pub use dependency::DependencyRef;
pub use document::{GalaxyInfo, MetadataDocument, Platform, RoleMeta};
pub use fetcher::{FetchOutcome, MetadataFetcher};

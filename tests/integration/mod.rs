//! Integration test suite for rolegraph
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **inventory**: traversal, linking and reconciliation against the in-memory host
//! - **reports**: HTML and Graphviz artifacts written to a temporary directory
//! - **gitlab_api**: the REST client against a local axum fake of the GitLab API
//! - **cli**: exit codes and usage errors of the binary

mod cli;
mod gitlab_api;
mod inventory;
mod reports;

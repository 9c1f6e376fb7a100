//! Core types for rolegraph
//!
//! The core module holds the error taxonomy shared by every other module:
//! - [`RolegraphError`] - Enumerated fatal error conditions of an inventory run
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! # Error Handling Pattern
//!
//! ```rust,no_run
//! use rolegraph::core::{RolegraphError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<()> {
//!     Err(RolegraphError::MalformedProjectPath { path: "webserver".to_string() }.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     friendly.display();
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, RolegraphError, user_friendly_error};

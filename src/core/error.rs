//! Error handling for rolegraph
//!
//! This module provides the error taxonomy of the inventory run and the
//! user-facing error reporting of the CLI. The error system follows two rules:
//! 1. **Strongly-typed errors** inside the library so callers can branch on them
//! 2. **User-friendly messages** with actionable suggestions at the CLI boundary
//!
//! # Error Categories
//!
//! - **Host access**: [`RolegraphError::AuthenticationFailed`], [`RolegraphError::Api`],
//!   [`RolegraphError::Transport`], [`RolegraphError::TreeListingFailed`]
//! - **Input data**: [`RolegraphError::MalformedProjectPath`], [`RolegraphError::InvalidMetadata`]
//! - **Configuration**: [`RolegraphError::InvalidFilter`], [`RolegraphError::InvalidConfig`]
//! - **Reports**: [`RolegraphError::TemplateError`], [`RolegraphError::GraphRenderFailed`]
//!
//! Soft conditions (archived repositories, missing metadata, symlinked
//! metadata files, unresolved dependencies) are never errors; they are
//! reported as diagnostics and the run continues.
//!
//! # Exit Codes
//!
//! [`RolegraphError::exit_code`] maps the fatal conditions to process exit
//! statuses: authentication failure exits with `1`, a repository tree listing
//! failure other than not-found exits with `255`, everything else with `1`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rolegraph::core::{RolegraphError, user_friendly_error};
//!
//! let err = anyhow::Error::from(RolegraphError::AuthenticationFailed {
//!     url: "https://gitlab.example.com".to_string(),
//! });
//! let ctx = user_friendly_error(err);
//! ctx.display();
//! std::process::exit(ctx.exit_code());
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Exit status for fatal errors without a dedicated code.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status when a repository tree listing fails for a reason other than not-found.
pub const EXIT_TREE_LISTING_FAILED: i32 = 255;

/// All fatal failure modes of an inventory run.
#[derive(Error, Debug)]
pub enum RolegraphError {
    /// The GitLab instance rejected the access token (or no token was given).
    #[error("authentication failure against {url}")]
    AuthenticationFailed {
        /// Base URL of the GitLab instance
        url: String,
    },

    /// Listing a metadata directory failed with something other than not-found.
    ///
    /// This aborts the whole run because the inventory would otherwise be
    /// silently incomplete.
    #[error("failed to list '{path}' in project '{project}': {reason}")]
    TreeListingFailed {
        /// Namespaced path of the project
        project: String,
        /// Directory inside the repository
        path: String,
        /// Status or transport error description
        reason: String,
    },

    /// The API answered with an unexpected HTTP status.
    #[error("GitLab API request to {url} failed with HTTP {status}")]
    Api {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The API answered 404 for a resource that has to exist.
    #[error("GitLab resource not found: {url}")]
    NotFound {
        /// Requested URL
        url: String,
    },

    /// The request never produced an HTTP response or its body was unreadable.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying client error
        message: String,
    },

    /// A repository path carried no group separator.
    #[error("repository path '{path}' has no group component")]
    MalformedProjectPath {
        /// The offending `path_with_namespace`
        path: String,
    },

    /// A metadata file could not be decoded or parsed.
    #[error("invalid metadata in {project}:{file}: {reason}")]
    InvalidMetadata {
        /// Namespaced path of the project
        project: String,
        /// File inside the repository
        file: String,
        /// Decoder or parser message
        reason: String,
    },

    /// A `--filter` value is not a valid regular expression.
    #[error("invalid path filter '{filter}': {reason}")]
    InvalidFilter {
        /// Filter as given by the operator
        filter: String,
        /// Regex compiler message
        reason: String,
    },

    /// The settings file or a flag combination is unusable.
    #[error("configuration error: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// The HTML template failed to load or render.
    #[error("template error: {message}")]
    TemplateError {
        /// Tera error chain
        message: String,
    },

    /// Graphviz returned a failure while rendering the diagram.
    #[error("graph rendering failed for {path}: {reason}")]
    GraphRenderFailed {
        /// DOT source file
        path: String,
        /// Exit status or stderr of `dot`
        reason: String,
    },

    /// File system error while writing reports.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else.
    #[error("{message}")]
    Other {
        /// Free-form message
        message: String,
    },
}

impl RolegraphError {
    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::TreeListingFailed { .. } => EXIT_TREE_LISTING_FAILED,
            _ => EXIT_FAILURE,
        }
    }
}

impl Clone for RolegraphError {
    fn clone(&self) -> Self {
        match self {
            Self::AuthenticationFailed { url } => Self::AuthenticationFailed { url: url.clone() },
            Self::TreeListingFailed { project, path, reason } => Self::TreeListingFailed {
                project: project.clone(),
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::Api { url, status } => Self::Api { url: url.clone(), status: *status },
            Self::NotFound { url } => Self::NotFound { url: url.clone() },
            Self::Transport { url, message } => Self::Transport {
                url: url.clone(),
                message: message.clone(),
            },
            Self::MalformedProjectPath { path } => Self::MalformedProjectPath { path: path.clone() },
            Self::InvalidMetadata { project, file, reason } => Self::InvalidMetadata {
                project: project.clone(),
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::InvalidFilter { filter, reason } => Self::InvalidFilter {
                filter: filter.clone(),
                reason: reason.clone(),
            },
            Self::InvalidConfig { message } => Self::InvalidConfig { message: message.clone() },
            Self::TemplateError { message } => Self::TemplateError { message: message.clone() },
            Self::GraphRenderFailed { path, reason } => Self::GraphRenderFailed {
                path: path.clone(),
                reason: reason.clone(),
            },
            // io::Error is not Clone
            Self::Io(e) => Self::Other { message: format!("IO error: {e}") },
            Self::Other { message } => Self::Other { message: message.clone() },
        }
    }
}

/// Error wrapper carrying an optional suggestion and details for the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: RolegraphError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: RolegraphError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Process exit status for the wrapped error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] ready for display.
///
/// The first [`RolegraphError`] found in the chain gets tailored suggestions
/// and decides the exit code; anything else is wrapped as
/// [`RolegraphError::Other`] with the full chain as message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(err) = error.chain().find_map(|cause| cause.downcast_ref::<RolegraphError>()) {
        let ctx = create_error_context(err.clone());
        if error.downcast_ref::<RolegraphError>().is_some() {
            return ctx;
        }
        // Outer context layers carry information the typed error lacks.
        return ctx.with_details(format!("{error:#}"));
    }

    ErrorContext::new(RolegraphError::Other {
        message: format!("{error:#}"),
    })
}

fn create_error_context(error: RolegraphError) -> ErrorContext {
    match error {
        RolegraphError::AuthenticationFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Pass a valid personal access token with --token or the GITLAB_TOKEN environment variable")
            .with_details("The token needs at least the read_api scope to list projects and repository files"),

        RolegraphError::TreeListingFailed { .. } => ErrorContext::new(error)
            .with_details("Only a missing directory is tolerated; any other listing failure would leave the inventory incomplete"),

        RolegraphError::Api { status, .. } if status == 429 || status >= 500 => ErrorContext::new(error)
            .with_suggestion("The GitLab instance is overloaded or unavailable; retry the run later"),

        RolegraphError::Transport { .. } => ErrorContext::new(error)
            .with_suggestion("Check --gitlab-url and your network connection"),

        RolegraphError::MalformedProjectPath { .. } => ErrorContext::new(error)
            .with_details("Every GitLab project path is expected to look like <group>/<project>"),

        RolegraphError::InvalidMetadata { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the YAML in the named file or exclude the project with a narrower --filter"),

        RolegraphError::InvalidFilter { .. } => ErrorContext::new(error)
            .with_suggestion("Filters are regular expressions matched at the start of the project path, e.g. 'ansible/roles/'"),

        RolegraphError::TemplateError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the template passed with --template; omit it to use the built-in report"),

        RolegraphError::GraphRenderFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Re-run with --no-image and render the .gv file manually"),

        other => ErrorContext::new(other),
    }
}

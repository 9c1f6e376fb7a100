//! Runtime configuration.
//!
//! Configuration is resolved once at startup into an immutable [`Settings`]
//! value which is passed by reference to the inventory builder and the
//! renderers. Values come from command-line flags, their environment
//! variable fallbacks, and an optional TOML settings file ([`SettingsFile`]).
//!
//! # Settings File
//!
//! ```toml
//! gitlab_url = "https://gitlab.example.com"
//! filters = ["ansible/roles/", "ansible/plays/"]
//! dest_prefix = "ansible_roles"
//! output_dir = "public"
//! show_unknown = false
//! # template = "templates/custom.html.tera"
//! ```
//!
//! Flags given on the command line override file values, even when they
//! repeat a default; file filters are appended to flag filters.

mod file;

pub use file::SettingsFile;

use regex::Regex;
use std::path::PathBuf;

use crate::constants::{DEFAULT_DEST_PREFIX, DEFAULT_GITLAB_URL};
use crate::core::RolegraphError;
use crate::inventory::SourcePattern;
use crate::utils::Diagnostics;

/// A `--filter` value compiled into a regex anchored at the start of the project path.
#[derive(Debug, Clone)]
pub struct PathFilter {
    raw: String,
    regex: Regex,
}

impl PathFilter {
    /// Compile a filter; a leading `/` is stripped first.
    pub fn new(filter: &str) -> Result<Self, RolegraphError> {
        let raw = filter.trim_start_matches('/').to_string();
        let regex = Regex::new(&format!("^(?:{raw})")).map_err(|e| {
            RolegraphError::InvalidFilter {
                filter: filter.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { raw, regex })
    }

    /// Whether the namespaced project path starts with a match.
    #[must_use]
    pub fn matches(&self, path_with_namespace: &str) -> bool {
        self.regex.is_match(path_with_namespace)
    }

    /// The filter as shown in reports.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Values given on the command line or through their environment variables.
///
/// `None` leaves the settings file value (or the default) in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gitlab_url: Option<String>,
    pub token: Option<String>,
    pub filters: Vec<String>,
    pub show_unknown: Option<bool>,
    pub output_dir: Option<PathBuf>,
    pub dest_prefix: Option<String>,
    pub template: Option<PathBuf>,
}

/// Resolved configuration of one run.
#[derive(Debug, Clone)]
pub struct Settings {
    gitlab_url: String,
    source_pattern: SourcePattern,
    /// Personal access token passed through to the API.
    pub token: Option<String>,
    /// Path filters; a project matching any of them is processed.
    pub path_filters: Vec<PathFilter>,
    /// Show placeholder entities in the default HTML report.
    pub show_unknown: bool,
    /// Directory receiving the report artifacts.
    pub output_dir: PathBuf,
    /// File name prefix of the report artifacts.
    pub dest_prefix: String,
    /// Template replacing the built-in HTML report.
    pub template: Option<PathBuf>,
    /// Invoke Graphviz to render the diagram image.
    pub render_image: bool,
    /// Suppress info diagnostics.
    pub quiet: bool,
}

impl Settings {
    /// Settings for the instance at `gitlab_url` with every other value at its default.
    pub fn new(gitlab_url: &str) -> Result<Self, RolegraphError> {
        let gitlab_url = gitlab_url.trim_end_matches('/').to_string();
        if gitlab_url.is_empty() {
            return Err(RolegraphError::InvalidConfig {
                message: "the GitLab URL must not be empty".to_string(),
            });
        }

        Ok(Self {
            source_pattern: SourcePattern::for_instance(&gitlab_url),
            gitlab_url,
            token: None,
            path_filters: Vec::new(),
            show_unknown: false,
            output_dir: PathBuf::from("."),
            dest_prefix: DEFAULT_DEST_PREFIX.to_string(),
            template: None,
            render_image: true,
            quiet: false,
        })
    }

    /// Compile and append path filters.
    pub fn with_filters<I, S>(mut self, filters: I) -> Result<Self, RolegraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for filter in filters {
            self.path_filters.push(PathFilter::new(filter.as_ref())?);
        }
        Ok(self)
    }

    /// Set the access token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Base URL of the GitLab instance without trailing slash.
    #[must_use]
    pub fn gitlab_url(&self) -> &str {
        &self.gitlab_url
    }

    /// Pattern recognising dependency sources hosted on this instance.
    #[must_use]
    pub const fn source_pattern(&self) -> &SourcePattern {
        &self.source_pattern
    }

    /// Whether a project path matches any configured filter.
    ///
    /// With no filters configured nothing matches.
    #[must_use]
    pub fn matches_filter(&self, path_with_namespace: &str) -> bool {
        self.path_filters.iter().any(|filter| filter.matches(path_with_namespace))
    }

    /// Filters as plain strings, in configuration order.
    #[must_use]
    pub fn filter_strings(&self) -> Vec<String> {
        self.path_filters.iter().map(|f| f.as_str().to_string()).collect()
    }

    /// Diagnostics sink honouring `quiet`.
    #[must_use]
    pub const fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new(self.quiet)
    }

    /// Path of the artifact `<output_dir>/<dest_prefix><suffix>`.
    #[must_use]
    pub fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{}{suffix}", self.dest_prefix))
    }

    /// Layer command-line values over a settings file.
    ///
    /// A value present in `flags` always wins; filters from both sources
    /// are kept, flag filters first.
    pub fn resolve(flags: Overrides, file: SettingsFile) -> Result<Self, RolegraphError> {
        let url = flags.gitlab_url.or(file.gitlab_url);
        let mut settings = Self::new(url.as_deref().unwrap_or(DEFAULT_GITLAB_URL))?
            .with_token(flags.token)
            .with_filters(flags.filters.iter().chain(&file.filters))?;

        settings.show_unknown = flags.show_unknown.or(file.show_unknown).unwrap_or(false);
        if let Some(dir) = flags.output_dir.or(file.output_dir) {
            settings.output_dir = dir;
        }
        if let Some(prefix) = flags.dest_prefix.or(file.dest_prefix) {
            settings.dest_prefix = prefix;
        }
        settings.template = flags.template.or(file.template);
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gitlab_url: DEFAULT_GITLAB_URL.to_string(),
            source_pattern: SourcePattern::default(),
            token: None,
            path_filters: Vec::new(),
            show_unknown: false,
            output_dir: PathBuf::from("."),
            dest_prefix: DEFAULT_DEST_PREFIX.to_string(),
            template: None,
            render_image: true,
            quiet: false,
        }
    }
}

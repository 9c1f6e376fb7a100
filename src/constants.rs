//! Global constants used throughout the rolegraph codebase.
//!
//! Metadata locations, defaults for the command-line surface and HTTP
//! paging parameters live here so that the traversal, the client and the
//! renderers agree on them.

/// GitLab instance queried when `--gitlab-url` is not given.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.example.com";

/// File name prefix of every generated report artifact.
pub const DEFAULT_DEST_PREFIX: &str = "ansible_roles";

/// Directory holding role metadata inside a repository.
pub const ROLE_META_DIR: &str = "meta";

/// Role metadata file inside [`ROLE_META_DIR`].
pub const ROLE_META_FILE: &str = "main.yml";

/// Directory holding play requirements inside a repository.
pub const PLAY_REQUIREMENTS_DIR: &str = "roles";

/// Play requirements file inside [`PLAY_REQUIREMENTS_DIR`].
pub const PLAY_REQUIREMENTS_FILE: &str = "requirements.yml";

/// Only repositories with this visibility are inventoried.
pub const PROJECT_VISIBILITY: &str = "internal";

/// Page size requested from paginated GitLab endpoints (the API maximum).
pub const API_PAGE_SIZE: u32 = 100;

/// Prefix of identities synthesized for unresolved dependency targets.
///
/// The `zzz` prefix sorts placeholders after every discovered project.
pub const PLACEHOLDER_ID_PREFIX: &str = "zzz-unknown-";

/// Group and description shown for placeholder entities in reports.
pub const PLACEHOLDER_LABEL: &str = "unknown";

/// Title rendered at the top of the dependency diagram.
pub const GRAPH_TITLE: &str = "Roles and Plays";

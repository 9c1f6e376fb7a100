//! Dependency Linker: turn declared dependencies into reverse "used-by" edges.
//!
//! Linking never resolves anything. Each dependency is reduced to a target
//! key (a project path for sources on the configured instance, otherwise the
//! raw source or the bare name) and the declaring identity is appended to
//! that key's entry in the [`EdgeTable`]. Keys are resolved against the
//! discovered projects only after the whole traversal, because a dependency
//! may point at a repository that is listed later.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::constants::DEFAULT_GITLAB_URL;
use crate::inventory::EntityId;
use crate::metadata::DependencyRef;
use crate::utils::Diagnostics;

/// Names of dependency targets declared without source.
pub type ExternalSet = HashSet<String>;

/// Recognises dependency sources hosted on the configured GitLab instance.
///
/// Accepted forms, each with an optional `git+` prefix and `.git` suffix:
/// `git@<host>:<path>`, `ssh://git@<host>[:port]/<path>` and
/// `http(s)://[user@]<host>/<path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePattern {
    host: String,
}

impl SourcePattern {
    /// Pattern for the instance at `base_url`.
    #[must_use]
    pub fn for_instance(base_url: &str) -> Self {
        let without_scheme = base_url.split_once("://").map_or(base_url, |(_, rest)| rest);
        let host = without_scheme.split('/').next().unwrap_or_default();
        Self {
            host: host.to_ascii_lowercase(),
        }
    }

    /// Host name (with port, if the base URL had one).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host name without port, as used in SSH URLs.
    fn ssh_host(&self) -> &str {
        self.host.split(':').next().unwrap_or(&self.host)
    }

    /// Namespaced project path of `src`, if it lives on this instance.
    #[must_use]
    pub fn internal_path(&self, src: &str) -> Option<String> {
        let src = src.trim();
        let src = src.strip_prefix("git+").unwrap_or(src);

        let rest = if let Some(rest) = src.strip_prefix("git@") {
            let (host, path) = rest.split_once(':')?;
            host.eq_ignore_ascii_case(self.ssh_host()).then_some(path)?
        } else if let Some(rest) = src.strip_prefix("ssh://") {
            let rest = rest.split_once('@').map_or(rest, |(_, r)| r);
            let (authority, path) = rest.split_once('/')?;
            let host = authority.split(':').next().unwrap_or(authority);
            host.eq_ignore_ascii_case(self.ssh_host()).then_some(path)?
        } else if let Some(rest) =
            src.strip_prefix("https://").or_else(|| src.strip_prefix("http://"))
        {
            let (authority, path) = rest.split_once('/')?;
            let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
            host.eq_ignore_ascii_case(&self.host).then_some(path)?
        } else {
            return None;
        };

        let path = rest.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        (!path.is_empty()).then(|| path.to_string())
    }
}

impl Default for SourcePattern {
    fn default() -> Self {
        Self::for_instance(DEFAULT_GITLAB_URL)
    }
}

/// Ordered map from dependency target to the identities declaring it.
///
/// Targets keep first-insertion order and each identity appears at most once
/// per target, so the table (and everything derived from it) is
/// deterministic for a fixed repository order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeTable {
    entries: Vec<(String, Vec<EntityId>)>,
    index: HashMap<String, usize>,
}

impl EdgeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `user` depends on `target`. Returns `false` for a repeat.
    pub fn record(&mut self, target: &str, user: &EntityId) -> bool {
        let slot = match self.index.get(target) {
            Some(&slot) => slot,
            None => {
                self.entries.push((target.to_string(), Vec::new()));
                self.index.insert(target.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let users = &mut self.entries[slot].1;
        if users.contains(user) {
            return false;
        }
        users.push(user.clone());
        true
    }

    /// Declaring identities of `target`.
    #[must_use]
    pub fn get(&self, target: &str) -> Option<&[EntityId]> {
        self.index.get(target).map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[EntityId])> {
        self.entries.iter().map(|(target, users)| (target.as_str(), users.as_slice()))
    }

    /// Number of distinct targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How linking a dependency list ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Every dependency was linked.
    Completed {
        /// Edges newly added to the table
        added: usize,
    },
    /// An include directive stopped the list; edges before it stay recorded.
    AbortedAtInclude {
        /// Edges newly added before the include
        added: usize,
        /// The included file
        include: String,
    },
}

/// Links the dependency lists of one inventory run.
pub struct Linker<'a> {
    pattern: &'a SourcePattern,
    diagnostics: Diagnostics,
}

impl<'a> Linker<'a> {
    pub const fn new(pattern: &'a SourcePattern, diagnostics: Diagnostics) -> Self {
        Self {
            pattern,
            diagnostics,
        }
    }

    /// Record an edge from `identity` to every dependency in `dependencies`.
    ///
    /// `project` is the declaring project's namespaced path, used for
    /// diagnostics only. Dependencies without source are added to
    /// `external`; sources on another host are keyed by the raw source and
    /// later reconcile to unknown placeholders.
    pub fn link(
        &self,
        project: &str,
        identity: &EntityId,
        dependencies: &[DependencyRef],
        edges: &mut EdgeTable,
        external: &mut ExternalSet,
    ) -> LinkOutcome {
        let mut added = 0;

        for dependency in dependencies {
            let target = match dependency {
                DependencyRef::Include { path } => {
                    self.diagnostics.error(format!(
                        "includes are not supported. skipping '{project}' (include: {path})"
                    ));
                    return LinkOutcome::AbortedAtInclude {
                        added,
                        include: path.clone(),
                    };
                }
                DependencyRef::Source { src, .. } => match self.pattern.internal_path(src) {
                    Some(path) => path,
                    None => {
                        self.diagnostics.warning(format!(
                            "{project}->{}: source '{src}' is not hosted on {}, recording as unknown",
                            dependency.label(),
                            self.pattern.host()
                        ));
                        src.clone()
                    }
                },
                DependencyRef::Named { name } => {
                    self.diagnostics.warning(format!(
                        "{project}->{name}: dependency has no src (probably galaxy source), adding as external"
                    ));
                    external.insert(name.clone());
                    name.clone()
                }
            };

            if edges.record(&target, identity) {
                added += 1;
                debug!(project, target = %target, "Recorded dependency edge");
            }
        }

        LinkOutcome::Completed { added }
    }
}

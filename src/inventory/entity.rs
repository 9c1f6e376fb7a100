//! Entities of the dependency graph.
//!
//! An [`Entity`] is either discovered from a repository (a role or a play) or
//! synthesized during reconciliation for a dependency target that matched no
//! repository (an external or unknown placeholder). The variant-specific data
//! lives in [`EntityDetails`], so placeholders structurally carry no
//! repository and plays carry no Galaxy metadata.

use serde::Serialize;
use std::fmt;

use crate::constants::PLACEHOLDER_ID_PREFIX;
use crate::metadata::Platform;

/// Stable key of an entity: `<name>-<project id>` or `zzz-unknown-<n>`.
///
/// Ordering by identity sorts projects by name and pushes placeholders last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Identity of a discovered project.
    #[must_use]
    pub fn for_project(name: &str, id: u64) -> Self {
        Self(format!("{name}-{id}"))
    }

    /// Identity of the `n`-th placeholder.
    #[must_use]
    pub fn placeholder(n: usize) -> Self {
        Self(format!("{PLACEHOLDER_ID_PREFIX}{n}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Kind of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Repository with `meta/main.yml`.
    Role,
    /// Repository with `roles/requirements.yml`.
    Play,
    /// Placeholder for a dependency declared without source.
    RoleExternal,
    /// Placeholder for a source that matched no discovered repository.
    RoleUnknown,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Play => "play",
            Self::RoleExternal => "role_external",
            Self::RoleUnknown => "role_unknown",
        }
    }

    /// Whether entities of this kind are synthesized during reconciliation.
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        matches!(self, Self::RoleExternal | Self::RoleUnknown)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository attributes shared by roles and plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    /// Namespace of the project (its path without the last segment).
    pub group: String,
    /// SSH clone URL.
    pub url: String,
    pub web_url: String,
    /// Tag names in listing order.
    pub git_tags: Vec<String>,
}

/// Variant-specific entity data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityDetails {
    Role {
        repository: RepositoryInfo,
        description: String,
        platforms: Vec<Platform>,
        galaxy_tags: Vec<String>,
    },
    Play {
        repository: RepositoryInfo,
    },
    External,
    Unknown,
}

/// Node of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub identity: EntityId,
    /// Display name; not unique across the inventory.
    pub name: String,
    pub details: EntityDetails,
    /// Identities of the entities declaring a dependency on this one, in
    /// first-declaration order and without duplicates.
    pub used_by: Vec<EntityId>,
}

impl Entity {
    /// Placeholder for an unresolved dependency target.
    #[must_use]
    pub fn placeholder(identity: EntityId, target: &str, external: bool) -> Self {
        Self {
            identity,
            name: target.to_string(),
            details: if external {
                EntityDetails::External
            } else {
                EntityDetails::Unknown
            },
            used_by: Vec::new(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self.details {
            EntityDetails::Role { .. } => EntityKind::Role,
            EntityDetails::Play { .. } => EntityKind::Play,
            EntityDetails::External => EntityKind::RoleExternal,
            EntityDetails::Unknown => EntityKind::RoleUnknown,
        }
    }

    /// Repository attributes; `None` for placeholders.
    #[must_use]
    pub const fn repository(&self) -> Option<&RepositoryInfo> {
        match &self.details {
            EntityDetails::Role { repository, .. } | EntityDetails::Play { repository } => {
                Some(repository)
            }
            EntityDetails::External | EntityDetails::Unknown => None,
        }
    }

    /// Clone URL; empty for placeholders.
    #[must_use]
    pub fn url(&self) -> &str {
        self.repository().map_or("", |r| r.url.as_str())
    }

    /// Web URL; empty for placeholders.
    #[must_use]
    pub fn web_url(&self) -> &str {
        self.repository().map_or("", |r| r.web_url.as_str())
    }
}

//! Inventory Builder: traverse the repositories and assemble the entity set.
//!
//! The traversal is strictly sequential: one project is fully processed
//! (fetch, extract, link) before the next is looked at. Edges are only
//! recorded during the traversal; they are resolved against the discovered
//! projects in [`reconcile`] once every project has been seen.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info};

use crate::config::Settings;
use crate::constants::{
    PLAY_REQUIREMENTS_DIR, PLAY_REQUIREMENTS_FILE, PROJECT_VISIBILITY, ROLE_META_DIR,
    ROLE_META_FILE,
};
use crate::core::RolegraphError;
use crate::gitlab::{Project, ProjectHost, ProjectSummary};
use crate::inventory::attributes::{extract_play, extract_role};
use crate::inventory::linker::{EdgeTable, ExternalSet, LinkOutcome, Linker};
use crate::inventory::{Entity, EntityId, EntityKind};
use crate::metadata::{DependencyRef, MetadataDocument, MetadataFetcher, RoleMeta};
use crate::utils::Diagnostics;

/// Why a project with metadata was left out of the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The metadata file is a symlink; carries the file and its target.
    Symlink {
        file: String,
        target: String,
    },
}

/// Terminal state of one listed project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// The path matched no filter.
    FilteredOut,
    Archived,
    /// Discovered as a role or a play and its dependencies linked.
    Linked(EntityKind),
    Skipped(SkipReason),
    /// Neither role nor play metadata was found.
    NoMetadata,
}

/// A dependency name that may silently point at the wrong role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameCollision {
    /// A sourceless dependency shares its name with internal roles.
    ExternalMatchesRole { name: String, roles: Vec<EntityId> },
    /// Several internal roles share a name; carries their groups.
    DuplicateRole { name: String, groups: Vec<String> },
}

/// Result of an inventory run.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Every entity, ordered by identity.
    pub entities: BTreeMap<EntityId, Entity>,
    /// Terminal state of every listed project, in listing order.
    pub outcomes: Vec<(String, ProjectOutcome)>,
    /// Dependency targets and their declaring identities.
    pub edges: EdgeTable,
    /// Number of placeholder entities created during reconciliation.
    pub placeholders: usize,
    /// Ambiguous role names found after reconciliation.
    pub collisions: Vec<NameCollision>,
}

impl Inventory {
    /// Entity with the given identity.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&Entity> {
        self.entities.get(&EntityId::from(identity))
    }

    /// Entities of one kind, in identity order.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |entity| entity.kind() == kind)
    }

    /// Counts per entity kind and project outcome.
    #[must_use]
    pub fn summary(&self) -> InventorySummary {
        let mut summary = InventorySummary::default();
        for entity in self.entities.values() {
            match entity.kind() {
                EntityKind::Role => summary.roles += 1,
                EntityKind::Play => summary.plays += 1,
                EntityKind::RoleExternal => summary.external += 1,
                EntityKind::RoleUnknown => summary.unknown += 1,
            }
        }
        for (_, outcome) in &self.outcomes {
            match outcome {
                ProjectOutcome::FilteredOut => {}
                ProjectOutcome::Archived => summary.archived += 1,
                ProjectOutcome::Linked(_) => {}
                ProjectOutcome::Skipped(_) => summary.skipped += 1,
                ProjectOutcome::NoMetadata => summary.without_metadata += 1,
            }
        }
        summary.edges = self.edges.iter().map(|(_, users)| users.len()).sum();
        summary
    }
}

/// Counters printed at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventorySummary {
    pub roles: usize,
    pub plays: usize,
    pub external: usize,
    pub unknown: usize,
    pub edges: usize,
    pub archived: usize,
    pub skipped: usize,
    pub without_metadata: usize,
}

impl fmt::Display for InventorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} roles, {} plays, {} external, {} unknown ({} edges; {} archived, {} skipped, {} without metadata)",
            self.roles,
            self.plays,
            self.external,
            self.unknown,
            self.edges,
            self.archived,
            self.skipped,
            self.without_metadata
        )
    }
}

/// Mutable state accumulated over one traversal.
#[derive(Default)]
struct Traversal {
    entities: BTreeMap<EntityId, Entity>,
    /// Namespaced project path to identity of every discovered project.
    paths: HashMap<String, EntityId>,
    edges: EdgeTable,
    external: ExternalSet,
}

/// Builds an [`Inventory`] from the projects of a [`ProjectHost`].
pub struct InventoryBuilder<'a, H> {
    host: &'a H,
    settings: &'a Settings,
    diagnostics: Diagnostics,
}

impl<'a, H: ProjectHost> InventoryBuilder<'a, H> {
    pub const fn new(host: &'a H, settings: &'a Settings) -> Self {
        Self {
            host,
            settings,
            diagnostics: settings.diagnostics(),
        }
    }

    /// Traverse every internal project and reconcile the recorded edges.
    ///
    /// Fails on the first fatal condition: a listing error other than
    /// not-found, a malformed project path or unparseable metadata.
    pub async fn build(&self) -> Result<Inventory, RolegraphError> {
        if self.settings.path_filters.is_empty() {
            self.diagnostics.warning("no path filter configured, no project will be processed");
        }

        let projects = self.host.list_projects(PROJECT_VISIBILITY).await?;
        info!(count = projects.len(), "Listed projects");

        let mut state = Traversal::default();
        let mut outcomes = Vec::with_capacity(projects.len());
        for summary in &projects {
            let outcome = self.process(summary, &mut state).await?;
            debug!(project = %summary.path_with_namespace, ?outcome, "Project processed");
            outcomes.push((summary.path_with_namespace.clone(), outcome));
        }

        let placeholders = reconcile(
            &mut state.entities,
            &state.paths,
            &state.edges,
            &state.external,
            self.diagnostics,
        );
        let collisions = report_collisions(&state.entities, self.diagnostics);

        Ok(Inventory {
            entities: state.entities,
            outcomes,
            edges: state.edges,
            placeholders,
            collisions,
        })
    }

    async fn process(
        &self,
        summary: &ProjectSummary,
        state: &mut Traversal,
    ) -> Result<ProjectOutcome, RolegraphError> {
        if summary.archived {
            self.diagnostics
                .info(format!("skip project '{}', because it is archived", summary.name));
            return Ok(ProjectOutcome::Archived);
        }
        if !self.settings.matches_filter(&summary.path_with_namespace) {
            return Ok(ProjectOutcome::FilteredOut);
        }

        let project = self.host.get_project(summary.id).await?;
        let identity = EntityId::for_project(&project.name, project.id);
        let fetcher = MetadataFetcher::new(self.host, self.diagnostics);

        let role_doc = fetcher
            .fetch(&project, ROLE_META_DIR, ROLE_META_FILE)
            .await?
            .into_found()
            .map(MetadataDocument::classify);
        match role_doc {
            Some(MetadataDocument::Symlink(target)) => {
                return Ok(self.symlink(&project, ROLE_META_DIR, ROLE_META_FILE, target));
            }
            Some(MetadataDocument::Mapping(value)) => {
                let file = format!("{ROLE_META_DIR}/{ROLE_META_FILE}");
                let meta = RoleMeta::from_value(value)
                    .map_err(|e| invalid_metadata(&project, &file, e.to_string()))?;
                for field in &meta.galaxy_info.ignored {
                    self.diagnostics.warning(format!(
                        "{}:{file} has a malformed galaxy_info.{field}, using the default",
                        project.path_with_namespace
                    ));
                }
                let dependencies = DependencyRef::parse_list(&meta.dependencies)
                    .map_err(|reason| invalid_metadata(&project, &file, reason))?;
                let tags = self.host.list_tags(project.id).await?;
                let entity = extract_role(&project, &tags, &meta, identity.clone())?;
                self.register(&project, entity, &dependencies, state);
                return Ok(ProjectOutcome::Linked(EntityKind::Role));
            }
            Some(MetadataDocument::List(_) | MetadataDocument::Scalar(_)) => {
                return Err(invalid_metadata(
                    &project,
                    &format!("{ROLE_META_DIR}/{ROLE_META_FILE}"),
                    "expected a mapping".to_string(),
                ));
            }
            Some(MetadataDocument::Empty) | None => {}
        }

        let play_doc = fetcher
            .fetch(&project, PLAY_REQUIREMENTS_DIR, PLAY_REQUIREMENTS_FILE)
            .await?
            .into_found()
            .map(MetadataDocument::classify);
        let document = match play_doc {
            Some(MetadataDocument::Symlink(target)) => {
                return Ok(self.symlink(
                    &project,
                    PLAY_REQUIREMENTS_DIR,
                    PLAY_REQUIREMENTS_FILE,
                    target,
                ));
            }
            Some(MetadataDocument::Scalar(_)) => {
                return Err(invalid_metadata(
                    &project,
                    &format!("{PLAY_REQUIREMENTS_DIR}/{PLAY_REQUIREMENTS_FILE}"),
                    "expected a list of roles".to_string(),
                ));
            }
            Some(MetadataDocument::Empty) | None => return Ok(ProjectOutcome::NoMetadata),
            Some(document) => document,
        };

        let dependencies = DependencyRef::parse_list(&document.requirement_entries())
            .map_err(|reason| {
                invalid_metadata(
                    &project,
                    &format!("{PLAY_REQUIREMENTS_DIR}/{PLAY_REQUIREMENTS_FILE}"),
                    reason,
                )
            })?;
        let tags = self.host.list_tags(project.id).await?;
        let entity = extract_play(&project, &tags, identity)?;
        self.register(&project, entity, &dependencies, state);
        Ok(ProjectOutcome::Linked(EntityKind::Play))
    }

    fn symlink(
        &self,
        project: &Project,
        directory: &str,
        filename: &str,
        target: String,
    ) -> ProjectOutcome {
        let file = format!("{directory}/{filename}");
        self.diagnostics.warning(format!(
            "{} has a symlink in {file} (->{target})",
            project.path_with_namespace
        ));
        ProjectOutcome::Skipped(SkipReason::Symlink { file, target })
    }

    /// Add a discovered entity and link its dependencies.
    fn register(
        &self,
        project: &Project,
        entity: Entity,
        dependencies: &[DependencyRef],
        state: &mut Traversal,
    ) {
        let identity = entity.identity.clone();
        state.paths.insert(project.path_with_namespace.clone(), identity.clone());
        state.entities.insert(identity.clone(), entity);

        if dependencies.is_empty() {
            return;
        }
        let linker = Linker::new(self.settings.source_pattern(), self.diagnostics);
        let outcome = linker.link(
            &project.path_with_namespace,
            &identity,
            dependencies,
            &mut state.edges,
            &mut state.external,
        );
        if let LinkOutcome::AbortedAtInclude { added, include } = outcome {
            debug!(project = %project.path_with_namespace, added, include = %include, "Linking aborted");
        }
    }
}

fn invalid_metadata(project: &Project, file: &str, reason: String) -> RolegraphError {
    RolegraphError::InvalidMetadata {
        project: project.path_with_namespace.clone(),
        file: file.to_string(),
        reason,
    }
}

/// Resolve every edge-table target and assign `used_by` lists.
///
/// A target naming a discovered project overwrites that entity's `used_by`.
/// Any other target becomes a placeholder `zzz-unknown-<n>`, where `n` is the
/// target's position in the edge table; it is `role_external` when the
/// target was declared without source and `role_unknown` otherwise.
/// Returns the number of placeholders created.
pub fn reconcile(
    entities: &mut BTreeMap<EntityId, Entity>,
    paths: &HashMap<String, EntityId>,
    edges: &EdgeTable,
    external: &ExternalSet,
    diagnostics: Diagnostics,
) -> usize {
    let mut placeholders = 0;

    for (position, (target, users)) in edges.iter().enumerate() {
        if let Some(entity) = paths.get(target).and_then(|identity| entities.get_mut(identity)) {
            entity.used_by = users.to_vec();
            continue;
        }

        let is_external = external.contains(target);
        if !is_external {
            diagnostics.warning(format!("path_with_namespace '{target}' is unknown"));
        }
        let identity = EntityId::placeholder(position);
        let mut placeholder = Entity::placeholder(identity.clone(), target, is_external);
        placeholder.used_by = users.to_vec();
        entities.insert(identity, placeholder);
        placeholders += 1;
    }

    debug!(edges = edges.len(), placeholders, "Reconciled dependency edges");
    placeholders
}

/// Warn about names that may silently point at the wrong role.
///
/// Dependency names are not namespaced: a sourceless reference named like an
/// internal role stays external, and several internal roles may share a name.
/// Returns every collision reported.
pub fn report_collisions(
    entities: &BTreeMap<EntityId, Entity>,
    diagnostics: Diagnostics,
) -> Vec<NameCollision> {
    let mut roles_by_name: BTreeMap<&str, Vec<&Entity>> = BTreeMap::new();
    for entity in entities.values().filter(|e| e.kind() == EntityKind::Role) {
        roles_by_name.entry(entity.name.as_str()).or_default().push(entity);
    }

    let mut collisions = Vec::new();
    for entity in entities.values().filter(|e| e.kind() == EntityKind::RoleExternal) {
        if let Some(roles) = roles_by_name.get(entity.name.as_str()) {
            let roles: Vec<EntityId> = roles.iter().map(|r| r.identity.clone()).collect();
            let identities: Vec<&str> = roles.iter().map(EntityId::as_str).collect();
            diagnostics.warning(format!(
                "bare dependency name '{}' also matches internal role {}, possible silent collision",
                entity.name,
                identities.join(", ")
            ));
            collisions.push(NameCollision::ExternalMatchesRole {
                name: entity.name.clone(),
                roles,
            });
        }
    }

    for (name, roles) in roles_by_name.iter().filter(|(_, roles)| roles.len() > 1) {
        let groups: Vec<String> = roles
            .iter()
            .filter_map(|role| role.repository().map(|r| r.group.clone()))
            .collect();
        diagnostics.warning(format!(
            "role name '{name}' is used by {} projects ({})",
            roles.len(),
            groups.join(", ")
        ));
        collisions.push(NameCollision::DuplicateRole {
            name: (*name).to_string(),
            groups,
        });
    }
    collisions
}

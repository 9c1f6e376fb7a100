//! Attribute Extractor: normalize a repository and its metadata into an [`Entity`].

use crate::core::RolegraphError;
use crate::gitlab::{Project, Tag};
use crate::inventory::{Entity, EntityDetails, EntityId, RepositoryInfo};
use crate::metadata::RoleMeta;

/// Namespace of a project path: everything before the final `/`.
pub fn group_of(path_with_namespace: &str) -> Result<String, RolegraphError> {
    match path_with_namespace.rsplit_once('/') {
        Some((group, _)) if !group.is_empty() => Ok(group.to_string()),
        _ => Err(RolegraphError::MalformedProjectPath {
            path: path_with_namespace.to_string(),
        }),
    }
}

fn repository_info(project: &Project, tags: &[Tag]) -> Result<RepositoryInfo, RolegraphError> {
    Ok(RepositoryInfo {
        group: group_of(&project.path_with_namespace)?,
        url: project.ssh_url_to_repo.clone(),
        web_url: project.web_url.clone(),
        git_tags: tags.iter().map(|tag| tag.name.clone()).collect(),
    })
}

/// Build a role entity from `meta/main.yml`.
pub fn extract_role(
    project: &Project,
    tags: &[Tag],
    meta: &RoleMeta,
    identity: EntityId,
) -> Result<Entity, RolegraphError> {
    let info = &meta.galaxy_info;
    Ok(Entity {
        identity,
        name: project.name.clone(),
        details: EntityDetails::Role {
            repository: repository_info(project, tags)?,
            description: info.description.clone(),
            platforms: info.platforms.clone(),
            galaxy_tags: info.galaxy_tags.clone(),
        },
        used_by: Vec::new(),
    })
}

/// Build a play entity; plays carry repository attributes only.
pub fn extract_play(
    project: &Project,
    tags: &[Tag],
    identity: EntityId,
) -> Result<Entity, RolegraphError> {
    Ok(Entity {
        identity,
        name: project.name.clone(),
        details: EntityDetails::Play {
            repository: repository_info(project, tags)?,
        },
        used_by: Vec::new(),
    })
}

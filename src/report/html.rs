//! HTML overview rendered with Tera.
//!
//! The template receives:
//!
//! - `projects_data`: identity -> [`EntityView`], ordered by identity
//! - `projects_filter`: the active path filters
//! - `show_unknown`: whether placeholder entities should be listed
//! - `generated_at`: UTC timestamp of the run

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera};

use crate::config::Settings;
use crate::constants::PLACEHOLDER_LABEL;
use crate::core::RolegraphError;
use crate::inventory::{Entity, EntityDetails, Inventory};
use crate::metadata::Platform;
use crate::utils::{atomic_write, ensure_dir};

const TEMPLATE_NAME: &str = "roles.html";
const BUILTIN_TEMPLATE: &str = include_str!("../../templates/roles.html.tera");

/// Reference from an entity to one of its users.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub identity: String,
    pub name: String,
    pub kind: &'static str,
}

/// Flattened entity as seen by the template.
///
/// Placeholders carry `unknown` as group and description; plays carry empty
/// Galaxy fields.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntityView {
    pub name: String,
    pub group: String,
    pub kind: &'static str,
    pub description: String,
    pub platforms: Vec<Platform>,
    pub galaxy_tags: Vec<String>,
    pub git_tags: Vec<String>,
    pub url: String,
    pub web_url: String,
    pub used_by: Vec<UserView>,
}

impl EntityView {
    fn new(entity: &Entity, inventory: &Inventory) -> Self {
        let (description, platforms, galaxy_tags) = match &entity.details {
            EntityDetails::Role {
                description,
                platforms,
                galaxy_tags,
                ..
            } => (description.clone(), platforms.clone(), galaxy_tags.clone()),
            EntityDetails::Play { .. } => (String::new(), Vec::new(), Vec::new()),
            EntityDetails::External | EntityDetails::Unknown => {
                (PLACEHOLDER_LABEL.to_string(), Vec::new(), Vec::new())
            }
        };
        let repository = entity.repository();

        Self {
            name: entity.name.clone(),
            group: repository.map_or_else(|| PLACEHOLDER_LABEL.to_string(), |r| r.group.clone()),
            kind: entity.kind().as_str(),
            description,
            platforms,
            galaxy_tags,
            git_tags: repository.map(|r| r.git_tags.clone()).unwrap_or_default(),
            url: entity.url().to_string(),
            web_url: entity.web_url().to_string(),
            used_by: entity
                .used_by
                .iter()
                .map(|identity| {
                    let user = inventory.entities.get(identity);
                    UserView {
                        identity: identity.to_string(),
                        name: user.map_or_else(|| identity.to_string(), |u| u.name.clone()),
                        kind: user.map_or("", |u| u.kind().as_str()),
                    }
                })
                .collect(),
        }
    }
}

/// Flatten the inventory for the template.
#[must_use]
pub fn entity_views(inventory: &Inventory) -> BTreeMap<String, EntityView> {
    inventory
        .entities
        .iter()
        .map(|(identity, entity)| (identity.to_string(), EntityView::new(entity, inventory)))
        .collect()
}

/// Compiled HTML report template.
pub struct HtmlRenderer {
    tera: Tera,
}

impl HtmlRenderer {
    /// Renderer using the template shipped with the binary.
    pub fn builtin() -> Result<Self, RolegraphError> {
        Self::from_source(BUILTIN_TEMPLATE)
    }

    /// Renderer using a template file.
    pub fn from_file(path: &Path) -> Result<Self, RolegraphError> {
        let source = std::fs::read_to_string(path).map_err(|e| RolegraphError::TemplateError {
            message: format!("cannot read template {}: {e}", path.display()),
        })?;
        Self::from_source(&source)
    }

    fn from_source(source: &str) -> Result<Self, RolegraphError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source).map_err(|e| template_error(&e))?;
        Ok(Self { tera })
    }

    /// Render the report.
    pub fn render(
        &self,
        inventory: &Inventory,
        filters: &[String],
        show_unknown: bool,
        generated_at: DateTime<Utc>,
    ) -> Result<String, RolegraphError> {
        let mut context = TeraContext::new();
        context.insert("projects_data", &entity_views(inventory));
        context.insert("projects_filter", filters);
        context.insert("show_unknown", &show_unknown);
        context.insert("generated_at", &generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());

        self.tera.render(TEMPLATE_NAME, &context).map_err(|e| template_error(&e))
    }
}

/// Flatten a Tera error and its causes into one message.
fn template_error(error: &tera::Error) -> RolegraphError {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    RolegraphError::TemplateError { message }
}

/// Write `<prefix>.html` and `<prefix>_incl_unknown.html`.
///
/// The first honours `show_unknown`, the second always lists placeholders.
pub fn write_html_reports(
    inventory: &Inventory,
    settings: &Settings,
    generated_at: DateTime<Utc>,
) -> Result<Vec<PathBuf>> {
    let renderer = match &settings.template {
        Some(path) => HtmlRenderer::from_file(path)?,
        None => HtmlRenderer::builtin()?,
    };
    let filters = settings.filter_strings();
    ensure_dir(&settings.output_dir)?;

    let mut written = Vec::with_capacity(2);
    for (suffix, show_unknown) in [(".html", settings.show_unknown), ("_incl_unknown.html", true)] {
        let path = settings.artifact_path(suffix);
        let html = renderer.render(inventory, &filters, show_unknown, generated_at)?;
        atomic_write(&path, html.as_bytes())
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        tracing::info!(path = %path.display(), show_unknown, "Wrote HTML report");
        written.push(path);
    }
    Ok(written)
}

//! Dependency graph of roles and plays.
//!
//! - [`entity`] - Graph nodes and their kinds
//! - [`attributes`] - Turn a project and its metadata into an entity
//! - [`linker`] - Record reverse "used-by" edges from declared dependencies
//! - [`builder`] - Traverse the projects and reconcile edges into the final entity set
//!
//! ```rust,no_run
//! use rolegraph::config::Settings;
//! use rolegraph::gitlab::GitlabClient;
//! use rolegraph::inventory::InventoryBuilder;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::new("https://gitlab.example.com")?.with_filters(["ansible/"])?;
//! let client = GitlabClient::new(settings.gitlab_url(), settings.token.clone())?;
//! let inventory = InventoryBuilder::new(&client, &settings).build().await?;
//! println!("{}", inventory.summary());
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod builder;
pub mod entity;
pub mod linker;

pub use attributes::{extract_play, extract_role, group_of};
pub use builder::{
    Inventory, InventoryBuilder, InventorySummary, NameCollision, ProjectOutcome, SkipReason,
    reconcile, report_collisions,
};
pub use entity::{Entity, EntityDetails, EntityId, EntityKind, RepositoryInfo};
pub use linker::{EdgeTable, ExternalSet, LinkOutcome, Linker, SourcePattern};

//! Report artifacts rendered from a finished [`Inventory`].
//!
//! - [`html`] - `<prefix>.html` and `<prefix>_incl_unknown.html`
//! - [`dot`] - `<prefix>.gv` and the optional `<prefix>.gv.svg`
//!
//! Renderers only read the inventory.

pub mod dot;
pub mod html;

pub use dot::{UsageGraph, write_graph};
pub use html::{EntityView, HtmlRenderer, entity_views, write_html_reports};

use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;

use crate::config::Settings;
use crate::inventory::Inventory;

/// Write every report artifact and return their paths.
pub async fn write_reports(inventory: &Inventory, settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut written = write_html_reports(inventory, settings, Utc::now())?;
    written.extend(write_graph(inventory, settings).await?);
    Ok(written)
}

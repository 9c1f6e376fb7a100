//! Graphviz diagram of which plays and roles use which roles.
//!
//! Nodes are keyed by display name, so entities sharing a name collapse into
//! one node, and only entities taking part in an edge are drawn. Edges point
//! from the user to the dependency.

use anyhow::{Context, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Settings;
use crate::constants::GRAPH_TITLE;
use crate::core::RolegraphError;
use crate::inventory::{EntityKind, Inventory};
use crate::utils::{atomic_write, ensure_dir};

/// Fill color of a node.
#[must_use]
pub const fn fill_color(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Role => "lightblue",
        EntityKind::RoleUnknown => "red",
        EntityKind::RoleExternal => "yellow",
        EntityKind::Play => "limegreen",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GraphNode {
    name: String,
    kind: EntityKind,
}

/// Usage graph built from the `used_by` lists of an inventory.
pub struct UsageGraph {
    graph: DiGraph<GraphNode, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl UsageGraph {
    #[must_use]
    pub fn from_inventory(inventory: &Inventory) -> Self {
        let mut graph = Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        };

        for entity in inventory.entities.values() {
            for user_id in &entity.used_by {
                let Some(user) = inventory.entities.get(user_id) else {
                    continue;
                };
                let from = graph.ensure_node(&user.name, user.kind());
                let to = graph.ensure_node(&entity.name, entity.kind());
                if graph.graph.find_edge(from, to).is_none() {
                    graph.graph.add_edge(from, to, ());
                }
            }
        }
        graph
    }

    /// The last kind seen for a name wins, so the color matches the most
    /// recently drawn entity of that name.
    fn ensure_node(&mut self, name: &str, kind: EntityKind) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            self.graph[index].kind = kind;
            index
        } else {
            let index = self.graph.add_node(GraphNode {
                name: name.to_string(),
                kind,
            });
            self.node_map.insert(name.to_string(), index);
            index
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Serialize as a DOT digraph.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// {GRAPH_TITLE}");
        out.push_str("digraph G {\n");
        let _ = writeln!(out, "\tlabel={} labelloc=t fontsize=30", quote(GRAPH_TITLE));
        out.push_str("\tnode [style=filled]\n");

        for index in self.graph.node_indices() {
            let node = &self.graph[index];
            let _ = writeln!(out, "\t{} [fillcolor={}]", quote(&node.name), fill_color(node.kind));
        }
        for edge in self.graph.edge_references() {
            let _ = writeln!(
                out,
                "\t{} -> {}",
                quote(&self.graph[edge.source()].name),
                quote(&self.graph[edge.target()].name)
            );
        }
        out.push_str("}\n");
        out
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render `source` to SVG at `output` with Graphviz.
///
/// Returns `Ok(false)` when `dot` is not installed.
pub async fn render_svg(source: &Path, output: &Path) -> Result<bool, RolegraphError> {
    let Ok(dot) = which::which("dot") else {
        return Ok(false);
    };
    tracing::debug!(dot = %dot.display(), source = %source.display(), "Rendering diagram");

    let result = Command::new(&dot)
        .arg("-Tsvg")
        .arg("-o")
        .arg(output)
        .arg(source)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| RolegraphError::GraphRenderFailed {
            path: output.display().to_string(),
            reason: e.to_string(),
        })?;

    if !result.status.success() {
        return Err(RolegraphError::GraphRenderFailed {
            path: output.display().to_string(),
            reason: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }
    Ok(true)
}

/// Write `<prefix>.gv` and, unless disabled, `<prefix>.gv.svg`.
pub async fn write_graph(inventory: &Inventory, settings: &Settings) -> Result<Vec<PathBuf>> {
    let graph = UsageGraph::from_inventory(inventory);
    ensure_dir(&settings.output_dir)?;

    let source = settings.artifact_path(".gv");
    atomic_write(&source, graph.to_dot().as_bytes())
        .with_context(|| format!("Failed to write diagram source {}", source.display()))?;
    tracing::info!(
        path = %source.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Wrote diagram source"
    );

    let mut written = vec![source.clone()];
    if settings.render_image {
        let image = settings.artifact_path(".gv.svg");
        if render_svg(&source, &image).await? {
            written.push(image);
        } else {
            settings
                .diagnostics()
                .warning("graphviz 'dot' not found on PATH, skipping diagram image");
        }
    }
    Ok(written)
}

//! Implementation of `ignis graph`.

use std::collections::HashSet;
use std::fmt::Write;

use anyhow::Result;

use crate::asset::{AssetCatalog, AssetGraph, AssetId};

/// Look up a root asset by name and return its declared dependency graph.
pub fn asset_graph(catalog: &AssetCatalog, root: &str) -> Result<AssetGraph> {
    let Some(id) = catalog.ids().find(|id| id.as_str() == root) else {
        anyhow::bail!(
            "unknown asset `{}`\n\
             hint: use `ignis graph --list` to see all assets",
            root
        );
    };
    Ok(catalog.graph(id)?)
}

/// Render a graph as an indented tree.
///
/// Assets reachable through more than one path are expanded once; later
/// occurrences are marked with `(*)`.
pub fn format_tree(graph: &AssetGraph, max_depth: Option<usize>) -> String {
    let mut out = String::new();
    let mut seen = HashSet::new();
    write_node(
        &mut out,
        graph,
        graph.root(),
        0,
        max_depth.unwrap_or(usize::MAX),
        &mut seen,
    );
    out
}

fn write_node(
    out: &mut String,
    graph: &AssetGraph,
    id: AssetId,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<AssetId>,
) {
    if depth > max_depth {
        return;
    }

    let is_duplicate = !seen.insert(id);

    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };
    let dup_marker = if is_duplicate { " (*)" } else { "" };

    let _ = writeln!(
        out,
        "{}{} ({}){}",
        prefix,
        id,
        graph.name(id).unwrap_or("?"),
        dup_marker
    );

    if is_duplicate {
        return;
    }

    for dep in graph.deps(id) {
        write_node(out, graph, dep, depth + 1, max_depth, seen);
    }
}

/// One line per registered asset: id and human-friendly name.
pub fn format_list(catalog: &AssetCatalog) -> String {
    let mut out = String::new();
    for id in catalog.ids() {
        let name = catalog
            .construct(id)
            .map(|asset| asset.name().to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "{:<44} {}", id.as_str(), name);
    }
    out
}

//! Asset catalog - the id to constructor registry.
//!
//! Every asset type the store can resolve is registered here. Dependency
//! lists are plain data, so the whole declared graph can be checked before
//! a single asset is loaded or generated.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Topo;
use thiserror::Error;

use crate::asset::{Asset, AssetId};

type Constructor = Box<dyn Fn() -> Box<dyn Asset>>;

/// Problem found while validating the declared asset graph.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("asset `{asset}` depends on `{dependency}`, which is not registered")]
    UnregisteredDependency { asset: AssetId, dependency: AssetId },

    #[error("constructor registered for `{registered}` builds `{actual}`")]
    IdMismatch { registered: AssetId, actual: AssetId },

    #[error("cycle between assets: {}", join_ids(.members))]
    Cycle { members: Vec<AssetId> },

    #[error("no asset registered for `{id}`")]
    Unknown { id: AssetId },
}

fn join_ids(ids: &[AssetId]) -> String {
    ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
}

/// Registry of asset constructors.
#[derive(Default)]
pub struct AssetCatalog {
    constructors: BTreeMap<AssetId, Constructor>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        AssetCatalog {
            constructors: BTreeMap::new(),
        }
    }

    /// Register a constructor. Re-registering an id replaces it.
    pub fn register<F>(&mut self, id: AssetId, constructor: F)
    where
        F: Fn() -> Box<dyn Asset> + 'static,
    {
        self.constructors.insert(id, Box::new(constructor));
    }

    /// Build a fresh, unresolved asset.
    pub fn construct(&self, id: AssetId) -> Option<Box<dyn Asset>> {
        self.constructors.get(&id).map(|construct| construct())
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.constructors.contains_key(&id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = AssetId> + '_ {
        self.constructors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Check that every declared dependency is registered and that the
    /// declared graph is acyclic.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut graph = DiGraph::<AssetId, ()>::new();
        let mut nodes = HashMap::new();
        for id in self.ids() {
            nodes.insert(id, graph.add_node(id));
        }

        for (&id, construct) in &self.constructors {
            let asset = construct();
            if asset.id() != id {
                return Err(CatalogError::IdMismatch {
                    registered: id,
                    actual: asset.id(),
                });
            }
            for dep in asset.dependencies() {
                let to = *nodes.get(&dep).ok_or(CatalogError::UnregisteredDependency {
                    asset: id,
                    dependency: dep,
                })?;
                graph.update_edge(nodes[&id], to, ());
            }
        }

        if toposort(&graph, None).is_err() {
            let members = kosaraju_scc(&graph)
                .into_iter()
                .find(|scc| {
                    scc.len() > 1 || graph.contains_edge(scc[0], scc[0])
                })
                .map(|scc| {
                    let mut ids: Vec<_> = scc.into_iter().map(|n| graph[n]).collect();
                    ids.sort();
                    ids
                })
                .unwrap_or_default();
            return Err(CatalogError::Cycle { members });
        }

        Ok(())
    }

    /// The declared dependency graph reachable from `root`.
    pub fn graph(&self, root: AssetId) -> Result<AssetGraph, CatalogError> {
        let mut graph = AssetGraph::new(root);
        let mut edges = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if graph.contains(id) {
                continue;
            }
            let asset = self.construct(id).ok_or(CatalogError::Unknown { id })?;
            graph.add_asset(id, asset.name());
            for dep in asset.dependencies() {
                edges.push((id, dep));
                stack.push(dep);
            }
        }

        for (from, to) in edges {
            graph.add_edge(from, to);
        }

        Ok(graph)
    }
}

/// Declared dependency graph of one root asset.
///
/// An edge `a -> b` means "a depends on b".
#[derive(Debug, Clone)]
pub struct AssetGraph {
    root: AssetId,
    graph: DiGraph<AssetId, ()>,
    nodes: HashMap<AssetId, NodeIndex>,
    names: HashMap<AssetId, String>,
}

impl AssetGraph {
    fn new(root: AssetId) -> Self {
        AssetGraph {
            root,
            graph: DiGraph::new(),
            nodes: HashMap::new(),
            names: HashMap::new(),
        }
    }

    fn add_asset(&mut self, id: AssetId, name: &str) {
        if self.nodes.contains_key(&id) {
            return;
        }
        let node = self.graph.add_node(id);
        self.nodes.insert(id, node);
        self.names.insert(id, name.to_string());
    }

    fn add_edge(&mut self, from: AssetId, to: AssetId) {
        if let (Some(&from), Some(&to)) = (self.nodes.get(&from), self.nodes.get(&to)) {
            if !self.graph.contains_edge(from, to) {
                self.graph.add_edge(from, to, ());
            }
        }
    }

    pub fn root(&self) -> AssetId {
        self.root
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Human-friendly name of an asset in the graph.
    pub fn name(&self, id: AssetId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Direct dependencies, sorted by id.
    pub fn deps(&self, id: AssetId) -> Vec<AssetId> {
        let mut deps: Vec<_> = match self.nodes.get(&id) {
            Some(&node) => self.graph.neighbors(node).map(|n| self.graph[n]).collect(),
            None => Vec::new(),
        };
        deps.sort();
        deps
    }

    /// Assets in dependencies-first order.
    pub fn topological_order(&self) -> Vec<AssetId> {
        let mut topo = Topo::new(&self.graph);
        let mut order = Vec::new();

        while let Some(node) = topo.next(&self.graph) {
            order.push(self.graph[node]);
        }

        // Topo yields a before b for an edge a -> b; edges point at dependencies.
        order.reverse();
        order
    }
}

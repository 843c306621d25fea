//! Static template graph diagnostics.
//!
//! The resolver tolerates cycles and dangling references silently. This module
//! builds the whole `extends`/`include` graph of a template set with `petgraph` so
//! those problems can be reported as warnings (see `tgql check`) and the graph of a
//! single template can be printed as a tree.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::ArtifactLookup;

/// How one template references another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateEdge {
    Extends,
    Includes,
}

impl fmt::Display for TemplateEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateEdge::Extends => f.write_str("extends"),
            TemplateEdge::Includes => f.write_str("includes"),
        }
    }
}

/// A reference to a template that does not exist or failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub from: String,
    pub edge: TemplateEdge,
    pub to: String,
}

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Graph of the static references between templates.
pub struct GraphDiagnostics {
    graph: DiGraph<String, TemplateEdge>,
    node_map: HashMap<String, NodeIndex>,
    dangling: Vec<DanglingReference>,
}

impl GraphDiagnostics {
    /// An empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
            dangling: Vec::new(),
        }
    }

    /// Build the graph reachable from `roots`.
    pub fn build<L: ArtifactLookup + ?Sized>(lookup: &L, roots: &[String]) -> Self {
        let mut diagnostics = Self::new();
        let mut pending: Vec<String> = roots.to_vec();
        let mut seen: HashSet<String> = HashSet::new();

        while let Some(id) = pending.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(artifact) = lookup.lookup(&id) else {
                continue;
            };
            diagnostics.ensure_node(&id);

            let references = artifact
                .parent_id()
                .map(|parent| (TemplateEdge::Extends, parent))
                .into_iter()
                .chain(artifact.direct_includes().iter().map(|i| (TemplateEdge::Includes, i.as_str())));

            for (edge, target) in references {
                if lookup.lookup(target).is_some() {
                    diagnostics.add_reference(&id, target, edge);
                    pending.push(target.to_string());
                } else {
                    diagnostics.dangling.push(DanglingReference {
                        from: id.clone(),
                        edge,
                        to: target.to_string(),
                    });
                }
            }
        }

        diagnostics
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(id) {
            index
        } else {
            let index = self.graph.add_node(id.to_string());
            self.node_map.insert(id.to_string(), index);
            index
        }
    }

    /// Record that `from` references `to`.
    pub fn add_reference(&mut self, from: &str, to: &str, edge: TemplateEdge) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        let exists = self
            .graph
            .edges_connecting(from_idx, to_idx)
            .any(|existing| *existing.weight() == edge);
        if !exists {
            self.graph.add_edge(from_idx, to_idx, edge);
        }
    }

    /// Every cycle found by a depth-first walk, each closed by repeating its first id.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();
        let mut path = Vec::new();
        let mut cycles = Vec::new();

        let mut roots: Vec<NodeIndex> = self.graph.node_indices().collect();
        roots.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        for node in roots {
            if matches!(colors.get(&node), Some(Color::White)) {
                self.dfs_visit(node, &mut colors, &mut path, &mut cycles);
            }
        }

        cycles
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.ordered_targets(node).into_iter().map(|(target, _)| target) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    if let Some(start) = path.iter().position(|n| *n == neighbor) {
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|n| self.graph[*n].clone()).collect();
                        cycle.push(self.graph[neighbor].clone());
                        cycles.push(cycle);
                    }
                }
                Some(Color::White) => self.dfs_visit(neighbor, colors, path, cycles),
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
    }

    /// References from `node` in the order they were added.
    fn ordered_targets(&self, node: NodeIndex) -> Vec<(NodeIndex, TemplateEdge)> {
        let mut targets: Vec<_> =
            self.graph.edges(node).map(|edge| (edge.target(), *edge.weight())).collect();
        // petgraph yields the newest edge first
        targets.reverse();
        targets
    }

    /// References to missing templates.
    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Human-readable warnings for cycles and dangling references.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .cycles()
            .into_iter()
            .map(|cycle| format!("Circular template reference: {}", cycle.join(" → ")))
            .collect();
        warnings.extend(self.dangling.iter().map(|reference| {
            format!(
                "Template '{}' {} missing template '{}'",
                reference.from, reference.edge, reference.to
            )
        }));
        warnings
    }

    /// Direct references of `id`.
    pub fn direct_references(&self, id: &str) -> Vec<(String, TemplateEdge)> {
        self.node_map
            .get(id)
            .map(|&idx| {
                self.ordered_targets(idx)
                    .into_iter()
                    .map(|(target, edge)| (self.graph[target].clone(), edge))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `true` if the graph has no templates.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of templates in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of parent and include edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the references of `root` as a tree.
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = format!("{root}\n");
        let mut visited = HashSet::from([root.to_string()]);
        let references = self.direct_references(root);
        for (i, (target, edge)) in references.iter().enumerate() {
            let is_last = i == references.len() - 1;
            self.build_tree_string(target, *edge, &mut result, "", is_last, &mut visited);
        }
        result
    }

    fn build_tree_string(
        &self,
        id: &str,
        edge: TemplateEdge,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<String>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{id} ({edge})\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        if !visited.insert(id.to_string()) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        let references = self.direct_references(id);
        for (i, (target, edge)) in references.iter().enumerate() {
            let is_last_child = i == references.len() - 1;
            self.build_tree_string(target, *edge, result, &child_prefix, is_last_child, visited);
        }
        visited.remove(id);
    }
}

impl Default for GraphDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

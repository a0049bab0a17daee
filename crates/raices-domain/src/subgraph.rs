//! Subgraph selection - edges touching a focus set
//!
//! An edge is selected when at least one endpoint is in the focus set, not
//! only when both are.

use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How undirected edges are emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Each undirected edge once, oriented from the lower index
    #[default]
    Deduplicated,

    /// Each undirected edge twice, once per direction, walking the full
    /// index range. Kept for diagram parity with the legacy layout.
    Mirrored,
}

/// Parallel source/target/weight sequences of equal length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowEdges {
    /// Source label per edge
    pub sources: Vec<String>,

    /// Target label per edge
    pub targets: Vec<String>,

    /// Weight per edge
    pub weights: Vec<f64>,
}

impl FlowEdges {
    /// Number of edges
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no edge was selected
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn push(&mut self, source: &str, target: &str, weight: f64) {
        self.sources.push(source.to_string());
        self.targets.push(target.to_string());
        self.weights.push(weight);
    }

    /// Iterate `(source, target, weight)` triples
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.sources
            .iter()
            .zip(&self.targets)
            .zip(&self.weights)
            .map(|((s, t), w)| (s.as_str(), t.as_str(), *w))
    }

    /// Diagram position of a source label: its first occurrence in `sources`
    pub fn source_position(&self, label: &str) -> Option<usize> {
        self.sources.iter().position(|s| s == label)
    }

    /// Diagram position of a target label: `sources.len()` plus its first
    /// occurrence in `targets`
    pub fn target_position(&self, label: &str) -> Option<usize> {
        self.targets
            .iter()
            .position(|t| t == label)
            .map(|p| self.sources.len() + p)
    }

    /// `(source_position, target_position)` for every edge, in order
    ///
    /// Edges sharing a label collapse onto the same position.
    pub fn link_positions(&self) -> Vec<(usize, usize)> {
        self.iter()
            .filter_map(|(s, t, _)| Some((self.source_position(s)?, self.target_position(t)?)))
            .collect()
    }
}

/// Select every edge with at least one endpoint in `focus`
///
/// Focus labels unknown to the graph simply match nothing.
pub fn select_focus<S: AsRef<str>>(graph: &Graph, focus: &[S], mode: SelectionMode) -> FlowEdges {
    let focus: HashSet<&str> = focus.iter().map(|label| label.as_ref()).collect();
    let nodes = graph.nodes();
    let n = nodes.len();
    let mut edges = FlowEdges::default();

    for i in 0..n {
        let start = match mode {
            SelectionMode::Deduplicated => i,
            SelectionMode::Mirrored => 0,
        };
        for j in start..n {
            let weight = graph.weight_at(i, j);
            if weight <= 0.0 {
                continue;
            }
            if focus.contains(nodes[i].as_str()) || focus.contains(nodes[j].as_str()) {
                edges.push(&nodes[i], &nodes[j], weight);
            }
        }
    }

    edges
}

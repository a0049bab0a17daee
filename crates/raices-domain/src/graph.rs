//! Graph module - the symbolic relationship network
//!
//! Nodes are plain labels. Every edge record is written in both directions,
//! so the adjacency is symmetric whether or not the dataset lists both.

use crate::category::{Category, Taxonomy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One relationship record from the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source label
    pub source: String,

    /// Target label
    pub target: String,

    /// Relationship weight (defaults to 1 when absent)
    #[serde(default = "default_weight")]
    pub value: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Edge {
    /// Create a new edge record
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

/// Undirected weighted graph over node labels
///
/// Indices are a bijection over the node set and are only stable for the
/// lifetime of one `Graph` value.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<f64>>,
}

impl Graph {
    /// Build a graph whose node set is every label referenced by `edges`
    ///
    /// Nodes are indexed in order of first appearance (source before target).
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut nodes = Vec::new();
        let mut seen = HashMap::new();
        for edge in edges {
            for label in [&edge.source, &edge.target] {
                if !seen.contains_key(label) {
                    seen.insert(label.clone(), nodes.len());
                    nodes.push(label.clone());
                }
            }
        }
        Self::with_nodes(nodes, edges)
    }

    /// Build a graph over an externally supplied node set
    ///
    /// Edges with an endpoint outside the node set are skipped. Repeated
    /// labels in `nodes` keep their first index.
    pub fn with_nodes(nodes: Vec<String>, edges: &[Edge]) -> Self {
        let mut unique = Vec::with_capacity(nodes.len());
        let mut index = HashMap::with_capacity(nodes.len());
        for label in nodes {
            if !index.contains_key(&label) {
                index.insert(label.clone(), unique.len());
                unique.push(label);
            }
        }

        let n = unique.len();
        let mut graph = Self {
            nodes: unique,
            index,
            adjacency: vec![vec![0.0; n]; n],
        };

        for edge in edges {
            graph.add_link(&edge.source, &edge.target, edge.value);
        }

        graph
    }

    /// Write `value` into both cells for `a`/`b`; last write wins
    fn add_link(&mut self, a: &str, b: &str, value: f64) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&i), Some(&j)) => {
                self.adjacency[i][j] = value;
                self.adjacency[j][i] = value;
                true
            }
            _ => false,
        }
    }

    /// All node labels, by index
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index assigned to a label
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Whether a label is a node of this graph
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Label at an index
    pub fn label(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(String::as_str)
    }

    /// Weight between two labels (0 when unrelated or unknown)
    pub fn weight(&self, a: &str, b: &str) -> f64 {
        match (self.index_of(a), self.index_of(b)) {
            (Some(i), Some(j)) => self.adjacency[i][j],
            _ => 0.0,
        }
    }

    /// Weight at an index pair
    pub fn weight_at(&self, i: usize, j: usize) -> f64 {
        self.adjacency
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of distinct undirected edges
    pub fn edge_count(&self) -> usize {
        let n = self.len();
        (0..n)
            .flat_map(|i| (i..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.adjacency[i][j] != 0.0)
            .count()
    }

    /// Check adjacency[i][j] == adjacency[j][i] for every pair
    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| (0..i).all(|j| self.adjacency[i][j] == self.adjacency[j][i]))
    }

    /// Nodes falling into `category`, in index order
    pub fn nodes_in(&self, taxonomy: &Taxonomy, category: Category) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|label| taxonomy.categorize(label) == category)
            .map(String::as_str)
            .collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn edge_strategy() -> impl Strategy<Value = Edge> {
        ("[a-e]", "[a-e]", 1u8..10).prop_map(|(s, t, w)| Edge::new(s, t, w as f64))
    }

    proptest! {
        /// Property: adjacency is symmetric for any edge list
        #[test]
        fn test_adjacency_symmetric(edges in prop::collection::vec(edge_strategy(), 0..30)) {
            let graph = Graph::from_edges(&edges);
            prop_assert!(graph.is_symmetric());
        }

        /// Property: every endpoint becomes a node and every edge is non-zero
        #[test]
        fn test_every_endpoint_indexed(edges in prop::collection::vec(edge_strategy(), 1..30)) {
            let graph = Graph::from_edges(&edges);
            for edge in &edges {
                prop_assert!(graph.contains(&edge.source));
                prop_assert!(graph.contains(&edge.target));
                prop_assert!(graph.weight(&edge.source, &edge.target) > 0.0);
            }
        }
    }
}

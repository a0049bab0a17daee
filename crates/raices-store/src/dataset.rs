//! Relationship dataset and taxonomy loading
//!
//! Both are read once at startup and are read-only afterwards.

use crate::error::{Result, StoreError};
use raices_domain::{Edge, Graph, Taxonomy};
use std::fs;
use std::path::Path;
use tracing::info;

/// The loaded relationship records and the graph built from them
#[derive(Debug, Clone)]
pub struct Dataset {
    edges: Vec<Edge>,
    graph: Graph,
}

impl Dataset {
    /// Load a JSON array of `{source, target, value?}` records
    ///
    /// # Errors
    /// Missing file, unreadable file or malformed JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = read_existing(path)?;
        let dataset = Self::from_json(&contents)?;

        info!(
            path = %path.display(),
            records = dataset.edges.len(),
            nodes = dataset.graph.len(),
            "Loaded relationship dataset"
        );

        Ok(dataset)
    }

    /// Parse records from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let edges: Vec<Edge> = serde_json::from_str(json)?;
        Ok(Self::from_edges(edges))
    }

    /// Build from already-parsed records
    pub fn from_edges(edges: Vec<Edge>) -> Self {
        let graph = Graph::from_edges(&edges);
        Self { edges, graph }
    }

    /// Records in file order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Graph built from the records
    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

/// Load the categorizer lists from TOML, or the built-in lists when no path
/// is configured
pub fn load_taxonomy(path: Option<&Path>) -> Result<Taxonomy> {
    let Some(path) = path else {
        return Ok(Taxonomy::default());
    };

    let contents = read_existing(path)?;
    let taxonomy: Taxonomy = toml::from_str(&contents)?;
    if taxonomy.major_symbols.is_empty() && taxonomy.beyond_presences.is_empty() {
        return Err(StoreError::InvalidData(
            "taxonomy defines no exact-match labels".to_string(),
        ));
    }

    info!(path = %path.display(), "Loaded taxonomy");
    Ok(taxonomy)
}

fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

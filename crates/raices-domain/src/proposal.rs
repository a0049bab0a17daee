//! Proposal module - candidate edges submitted for manual review
//!
//! Proposals are never validated against the live graph and never merged
//! back into it. Field names match the review log format.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Weight recorded for every proposal
pub const PROPOSAL_WEIGHT: u32 = 1;

/// A user-submitted candidate edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposed source label
    pub source: String,

    /// Proposed target label
    pub target: String,

    /// Always [`PROPOSAL_WEIGHT`]
    pub value: u32,

    /// Username of the proposer
    #[serde(rename = "proponente")]
    pub proposer: String,

    /// Free-text rationale
    #[serde(rename = "descripcion")]
    pub description: String,

    /// Submission time (ISO-8601)
    #[serde(rename = "fecha")]
    pub submitted_at: DateTime<Local>,
}

impl Proposal {
    /// Create a proposal stamped with the current time
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        proposer: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::at(source, target, proposer, description, Local::now())
    }

    /// Create a proposal with an explicit timestamp
    pub fn at(
        source: impl Into<String>,
        target: impl Into<String>,
        proposer: impl Into<String>,
        description: impl Into<String>,
        submitted_at: DateTime<Local>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value: PROPOSAL_WEIGHT,
            proposer: proposer.into(),
            description: description.into(),
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let proposal = Proposal::new("El Colgado", "Acné", "ana", "purificación interna");
        let json = serde_json::to_value(&proposal).unwrap();
        let object = json.as_object().unwrap();

        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["descripcion", "fecha", "proponente", "source", "target", "value"]
        );
        assert_eq!(object["value"], 1);
        assert_eq!(object["proponente"], "ana");
    }

    #[test]
    fn test_timestamp_is_iso8601() {
        let proposal = Proposal::new("A", "B", "ana", "");
        let json = serde_json::to_value(&proposal).unwrap();
        let fecha = json["fecha"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(fecha).is_ok());
    }
}

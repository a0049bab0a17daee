//! Circle of Presences - participants sharing one card each
//!
//! Entries are kept in arrival order and never deduplicated; the same
//! participant may join many times.

use serde::{Deserialize, Serialize};

/// One participant's contribution to the circle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    /// Participant display name
    pub participant: String,

    /// Chosen card label
    pub card: String,
}

/// Card frequency within the circle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircleTally {
    /// Card label
    pub card: String,

    /// Number of entries that chose it
    pub count: usize,
}

/// Append-only list of group entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    entries: Vec<GroupEntry>,
}

impl Circle {
    /// Create an empty circle
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry at the end
    pub fn join(&mut self, participant: impl Into<String>, card: impl Into<String>) {
        self.entries.push(GroupEntry {
            participant: participant.into(),
            card: card.into(),
        });
    }

    /// All entries, in arrival order
    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody has joined
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct cards in first-arrival order with how often each was chosen
    pub fn tally(&self) -> Vec<CircleTally> {
        let mut tally: Vec<CircleTally> = Vec::new();
        for entry in &self.entries {
            match tally.iter_mut().find(|t| t.card == entry.card) {
                Some(existing) => existing.count += 1,
                None => tally.push(CircleTally {
                    card: entry.card.clone(),
                    count: 1,
                }),
            }
        }
        tally
    }
}

//! Raíces del Ser Domain Layer
//!
//! This crate holds the symbolic card network and everything derived from it.
//! It performs no I/O: loading datasets, persisting proposals and rendering
//! reports live in the other crates.
//!
//! ## Key Concepts
//!
//! - **Node**: a labelled card, phrase, symptom or presence
//! - **Graph**: deduplicated nodes plus a symmetric weighted adjacency
//! - **Category**: one of five semantic buckets, derived from the label
//! - **Focus set**: nodes whose incident edges are extracted for a diagram
//! - **Reading**: three Root Cards drawn without replacement
//! - **Circle**: participants sharing the card that represents them
//! - **Proposal**: a candidate edge awaiting manual review

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod circle;
pub mod error;
pub mod graph;
pub mod proposal;
pub mod reading;
pub mod subgraph;

// Re-exports for convenience
pub use category::{Category, Taxonomy};
pub use circle::{Circle, CircleTally, GroupEntry};
pub use error::DomainError;
pub use graph::{Edge, Graph};
pub use proposal::Proposal;
pub use reading::{draw_reading, Reading, READING_SIZE};
pub use subgraph::{select_focus, FlowEdges, SelectionMode};

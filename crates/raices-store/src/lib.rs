//! Raíces del Ser Storage Layer
//!
//! File-backed collaborators of the domain:
//!
//! - **Dataset**: the relationship records (JSON) and the optional taxonomy
//!   override (TOML), both read once at startup
//! - **Proposal log**: append-only JSON-Lines, one record per line
//! - **Report archive**: exported PDF files and their retention policy
//!
//! # Examples
//!
//! ```no_run
//! use raices_store::{Dataset, ProposalLog};
//! use raices_domain::Proposal;
//!
//! let dataset = Dataset::load("conexiones.json").unwrap();
//! println!("{} nodes", dataset.graph().len());
//!
//! let log = ProposalLog::new("data/propuestas.jsonl");
//! log.append(&Proposal::new("El Colgado", "Acné", "ana", "purificación")).unwrap();
//! ```

#![warn(missing_docs)]

mod dataset;
mod error;
mod proposals;
mod reports;
mod worker;

pub use dataset::{load_taxonomy, Dataset};
pub use error::{Result, StoreError};
pub use proposals::ProposalLog;
pub use reports::{ReportArchive, ReportFile, RetentionConfig, SweepMetrics};
pub use worker::RetentionWorker;

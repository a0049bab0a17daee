//! Append-only JSON-Lines log of proposals
//!
//! Each append is one `write_all` of a complete line on a file opened in
//! append mode, so concurrent writers interleave whole records. The log is
//! never rewritten.

use crate::error::{Result, StoreError};
use raices_domain::Proposal;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle to the proposal log file
#[derive(Debug, Clone)]
pub struct ProposalLog {
    path: PathBuf,
}

impl ProposalLog {
    /// Create a handle; the file is created on first append
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one proposal as a single line
    pub fn append(&self, proposal: &Proposal) -> Result<()> {
        let mut line = serde_json::to_string(proposal)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        debug!(
            source = %proposal.source,
            target = %proposal.target,
            proposer = %proposal.proposer,
            "Appended proposal"
        );
        Ok(())
    }

    /// Read every recorded proposal, skipping blank lines
    ///
    /// A missing log reads as empty.
    pub fn read_all(&self) -> Result<Vec<Proposal>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        fs::read_to_string(&self.path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<Proposal>(line).map_err(StoreError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let log = ProposalLog::new(dir.path().join("data").join("propuestas.jsonl"));

        log.append(&Proposal::new("El Colgado", "Acné", "ana", "purificación interna"))
            .unwrap();

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.ends_with('\n'));
        // UTF-8 kept verbatim, not escaped
        assert!(contents.contains("Acné"));
        assert!(contents.contains("purificación"));
    }

    #[test]
    fn test_read_back() {
        let dir = tempdir().unwrap();
        let log = ProposalLog::new(dir.path().join("propuestas.jsonl"));

        log.append(&Proposal::new("A", "B", "ana", "uno")).unwrap();
        log.append(&Proposal::new("C", "D", "luis", "dos")).unwrap();

        let proposals = log.read_all().unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].source, "A");
        assert_eq!(proposals[1].proposer, "luis");
        assert_eq!(proposals[1].value, 1);
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let dir = tempdir().unwrap();
        let log = ProposalLog::new(dir.path().join("none.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_existing_lines_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("propuestas.jsonl");
        fs::write(&path, "{\"keep\": true}\n").unwrap();

        let log = ProposalLog::new(&path);
        log.append(&Proposal::new("A", "B", "ana", "")).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("{\"keep\": true}\n"));
        assert_eq!(contents.lines().count(), 2);
    }
}

//! Report archive - PDF artifact naming, listing and retention
//!
//! Every export writes `informe_<username>_<hex>.pdf` into the reports
//! directory. Reports past their age limit, then the oldest reports beyond
//! the count limit, are removed by [`ReportArchive::sweep`].

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

const REPORT_PREFIX: &str = "informe_";
const REPORT_EXTENSION: &str = "pdf";

/// Retention policy for exported reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Reports older than this are removed (in hours)
    /// Default: 720 hours (30 days)
    pub max_age_hours: u64,

    /// Upper bound on kept reports; oldest go first
    /// Default: 500
    pub max_reports: usize,

    /// How often the background sweep runs (in minutes)
    /// Default: 60
    pub sweep_interval_minutes: u64,

    /// Log what would be removed without removing it
    pub dry_run: bool,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_hours: 720,
            max_reports: 500,
            sweep_interval_minutes: 60,
            dry_run: false,
        }
    }
}

impl RetentionConfig {
    /// Get max age as Duration
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours * 3600)
    }

    /// Get sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }
}

/// One report found on disk
#[derive(Debug, Clone)]
pub struct ReportFile {
    /// Full path
    pub path: PathBuf,

    /// Last modification time
    pub modified: SystemTime,

    /// Size in bytes
    pub size: u64,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepMetrics {
    /// Reports examined
    pub scanned: usize,

    /// Reports removed (or that would be, in dry-run)
    pub deleted: usize,

    /// Bytes reclaimed
    pub bytes_freed: u64,
}

/// Directory of exported reports
#[derive(Debug, Clone)]
pub struct ReportArchive {
    dir: PathBuf,
    retention: RetentionConfig,
}

impl ReportArchive {
    /// Create an archive rooted at `dir`
    pub fn new<P: Into<PathBuf>>(dir: P, retention: RetentionConfig) -> Self {
        Self {
            dir: dir.into(),
            retention,
        }
    }

    /// Reports directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Retention policy in force
    pub fn retention(&self) -> &RetentionConfig {
        &self.retention
    }

    /// Reserve a fresh report path for `username`, creating the directory
    pub fn allocate(&self, username: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let name = format!(
            "{}{}_{}.{}",
            REPORT_PREFIX,
            sanitize(username),
            Uuid::new_v4().simple(),
            REPORT_EXTENSION
        );
        Ok(self.dir.join(name))
    }

    /// Whether `path` is a report inside this archive
    pub fn owns(&self, path: &Path) -> bool {
        path.parent() == Some(self.dir.as_path()) && is_report_name(path)
    }

    /// Reports on disk, oldest first
    pub fn list(&self) -> Result<Vec<ReportFile>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !is_report_name(&path) {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            reports.push(ReportFile {
                path,
                modified: metadata.modified()?,
                size: metadata.len(),
            });
        }

        reports.sort_by_key(|r| r.modified);
        Ok(reports)
    }

    /// Apply the retention policy as of `now`
    pub fn sweep(&self, now: SystemTime) -> Result<SweepMetrics> {
        let reports = self.list()?;
        let mut metrics = SweepMetrics {
            scanned: reports.len(),
            ..SweepMetrics::default()
        };

        let max_age = self.retention.max_age();
        let (expired, kept): (Vec<_>, Vec<_>) = reports.into_iter().partition(|r| {
            now.duration_since(r.modified)
                .map(|age| age > max_age)
                .unwrap_or(false)
        });

        // `kept` is still oldest first
        let overflow = kept.len().saturating_sub(self.retention.max_reports);
        let doomed = expired.iter().chain(kept.iter().take(overflow));

        for report in doomed {
            if self.retention.dry_run {
                info!(path = %report.path.display(), "Would remove report (dry run)");
            } else if let Err(e) = fs::remove_file(&report.path) {
                warn!(path = %report.path.display(), error = %e, "Failed to remove report");
                continue;
            } else {
                debug!(path = %report.path.display(), "Removed report");
            }
            metrics.deleted += 1;
            metrics.bytes_freed += report.size;
        }

        Ok(metrics)
    }
}

fn is_report_name(path: &Path) -> bool {
    let name_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(REPORT_PREFIX));
    name_ok && path.extension().and_then(|e| e.to_str()) == Some(REPORT_EXTENSION)
}

/// Keep `[A-Za-z0-9_-]`, replace everything else with `-`
fn sanitize(username: &str) -> String {
    let cleaned: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "anon".to_string()
    } else {
        cleaned
    }
}

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

/// File name of the recovery log, kept next to the tasks file
pub const RECOVERY_LOG: &str = ".della-recovery.log";

/// Header written at the top of a new recovery log.
const FILE_HEADER: &str = "\
# della recovery log: append-only
# Holds task data della could not save normally, and subtrees removed
# with `rm`. View with: della recovery
# Safe to delete once you no longer need anything in it.

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Category of a recovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    Write,
    Detach,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Detach => write!(f, "detach"),
        }
    }
}

/// A single entry in the recovery log.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

pub fn recovery_log_path(dir: &Path) -> PathBuf {
    dir.join(RECOVERY_LOG)
}

/// Directory that should hold the recovery log for `tasks_file`: its parent,
/// or the nearest ancestor that exists.
pub fn log_dir_for(tasks_file: &Path) -> PathBuf {
    let mut dir = tasks_file.parent();
    while let Some(d) = dir {
        if d.as_os_str().is_empty() {
            break;
        }
        if d.is_dir() {
            return d.to_path_buf();
        }
        dir = d.parent();
    }
    PathBuf::from(".")
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry formatting
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    fn to_text(&self) -> String {
        let mut out = format!(
            "## {} {}: {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );

        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }

        if !self.body.is_empty() {
            out.push('\n');
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
        }

        out.push('\n');
        out.push_str("---\n");
        out
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append a recovery entry to the log in `dir`. Failures are reported as a
/// warning and otherwise ignored.
pub fn log_recovery(dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = log_recovery_inner(dir, &entry) {
        tracing::warn!(error = %e, "could not write to recovery log");
    }
}

fn log_recovery_inner(dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(dir);
    let needs_header = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_text().as_bytes())?;
    Ok(())
}

/// Record a detached subtree (rendered as TOML) in the recovery log.
pub fn log_detach(dir: &Path, full_path: &str, subtree: &str) {
    log_recovery(
        dir,
        RecoveryEntry {
            timestamp: Utc::now(),
            category: RecoveryCategory::Detach,
            description: format!("{} detached", full_path),
            fields: vec![("Path".to_string(), full_path.to_string())],
            body: subtree.to_string(),
        },
    );
}

/// Full text of the recovery log in `dir`, if there is one.
pub fn read_recovery_log(dir: &Path) -> Option<String> {
    std::fs::read_to_string(recovery_log_path(dir)).ok()
}

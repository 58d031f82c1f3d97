use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::tree::TaskTree;
use crate::parse::document::{
    DocumentError, from_doc, parse_document, serialize_document, to_doc,
};

/// Error type for loading and saving task files
#[derive(Debug, thiserror::Error)]
pub enum TreeIoError {
    #[error("tasks file not found: {0}")]
    NotFound(PathBuf),
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed tasks document: {0}")]
    Malformed(#[from] toml::de::Error),
    #[error("invalid tasks document: {0}")]
    Document(#[from] DocumentError),
    #[error("could not serialize tasks: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not write tasks: {0}")]
    Write(#[source] std::io::Error),
}

/// Load a task tree from a TOML file.
pub fn load_tree(path: &Path) -> Result<TaskTree, TreeIoError> {
    if !path.exists() {
        return Err(TreeIoError::NotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| TreeIoError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let tree = parse_tree(&text)?;
    info!(path = %path.display(), nodes = tree.len(), "loaded task tree");
    Ok(tree)
}

/// Parse TOML text into a task tree.
pub fn parse_tree(text: &str) -> Result<TaskTree, TreeIoError> {
    let doc = parse_document(text)?;
    Ok(from_doc(&doc)?)
}

/// Render the whole tree as TOML text.
pub fn tree_to_string(tree: &TaskTree) -> Result<String, TreeIoError> {
    Ok(serialize_document(&to_doc(tree, tree.root(), None))?)
}

/// Write the whole tree (unbounded depth) to `out`.
pub fn serialize<W: Write>(tree: &TaskTree, out: &mut W) -> Result<(), TreeIoError> {
    let text = tree_to_string(tree)?;
    out.write_all(text.as_bytes()).map_err(TreeIoError::Write)?;
    out.flush().map_err(TreeIoError::Write)?;
    Ok(())
}

/// Save the tree to `path` atomically. If the write fails, the rendered
/// document goes to the recovery log next to `path` before the error is
/// returned.
pub fn save_tree(tree: &TaskTree, path: &Path) -> Result<(), TreeIoError> {
    let text = tree_to_string(tree)?;
    if let Err(e) = recovery::atomic_write(path, text.as_bytes()) {
        warn!(path = %path.display(), error = %e, "tasks write failed");
        recovery::log_recovery(
            &recovery::log_dir_for(path),
            RecoveryEntry {
                timestamp: chrono::Utc::now(),
                category: RecoveryCategory::Write,
                description: "tasks write failed".to_string(),
                fields: vec![
                    ("Target".to_string(), path.display().to_string()),
                    ("Error".to_string(), e.to_string()),
                ],
                body: text,
            },
        );
        return Err(TreeIoError::Write(e));
    }
    debug!(path = %path.display(), "saved task tree");
    Ok(())
}

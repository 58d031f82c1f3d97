//! Interactive session state.
//!
//! A `Session` owns one loaded tree plus the "current" node that navigation
//! and completion are relative to. Loading a file replaces both.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::complete::{Completion, PathCompleter};
use crate::io::recovery;
use crate::io::tree_io::{self, TreeIoError};
use crate::model::task::{NodeId, TaskNode};
use crate::model::tree::TaskTree;
use crate::ops::tree_ops::{self, NewTask, TreeError};
use crate::parse::document::{NodeDoc, serialize_document};

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no task at path: {0}")]
    PathNotFound(String),
    #[error("session has no source file; use save_to")]
    NoSource,
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Io(#[from] TreeIoError),
}

#[derive(Debug)]
pub struct Session {
    tree: TaskTree,
    current: NodeId,
    source: Option<PathBuf>,
    dirty: bool,
}

impl Session {
    pub fn new(tree: TaskTree) -> Self {
        let current = tree.root();
        Session {
            tree,
            current,
            source: None,
            dirty: false,
        }
    }

    /// Load `path` into a fresh session positioned at the root.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let tree = tree_io::load_tree(path)?;
        let mut session = Session::new(tree);
        session.source = Some(path.to_path_buf());
        Ok(session)
    }

    /// Replace the tree with the contents of `path`. On failure the session
    /// is unchanged.
    pub fn reload(&mut self, path: &Path) -> Result<(), SessionError> {
        *self = Session::load(path)?;
        info!(path = %path.display(), "session reloaded");
        Ok(())
    }

    pub fn tree(&self) -> &TaskTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn current_node(&self) -> Option<&TaskNode> {
        self.tree.get(self.current)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Resolve a slug path relative to the current node.
    pub fn resolve(&self, path: &str) -> Result<NodeId, SessionError> {
        self.tree
            .resolve_path(self.current, path)
            .ok_or_else(|| SessionError::PathNotFound(path.to_string()))
    }

    /// Move the current node to `path` (relative, or absolute with `/`).
    pub fn navigate(&mut self, path: &str) -> Result<NodeId, SessionError> {
        let target = self.resolve(path)?;
        self.current = target;
        debug!(current = %target, "navigated");
        Ok(target)
    }

    pub fn completer(&self) -> PathCompleter<'_> {
        PathCompleter::new(&self.tree, self.current)
    }

    pub fn complete(&self, text: &str, cursor: usize) -> Completion {
        self.completer().complete(text, cursor)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn add(&mut self, parent: NodeId, task: NewTask) -> Result<NodeId, SessionError> {
        let id = tree_ops::add_subnode(&mut self.tree, parent, task)?;
        self.dirty = true;
        Ok(id)
    }

    /// Detach `node`. If the current node was inside the removed subtree the
    /// session falls back to the root. The subtree is also written to the
    /// recovery log when the session has a source file.
    pub fn detach(&mut self, node: NodeId) -> Result<NodeDoc, SessionError> {
        let full_path = self.tree.full_path_str(node);
        let current_gone = self.tree.is_ancestor_or_self(node, self.current);
        let doc = tree_ops::detach_from_parent(&mut self.tree, node)?;
        if current_gone {
            self.current = self.tree.root();
        }
        self.dirty = true;

        if let Some(source) = &self.source {
            let body = serialize_document(&doc).map_err(TreeIoError::from)?;
            recovery::log_detach(&recovery::log_dir_for(source), &full_path, &body);
        }
        Ok(doc)
    }

    pub fn change_parent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), SessionError> {
        tree_ops::change_parent(&mut self.tree, node, new_parent)?;
        self.dirty = true;
        Ok(())
    }

    pub fn change_date(&mut self, node: NodeId, date: Option<NaiveDate>) -> Result<(), SessionError> {
        tree_ops::change_date(&mut self.tree, node, date)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_unique_id(&mut self, node: NodeId, id: Option<String>) -> Result<(), SessionError> {
        tree_ops::set_unique_id(&mut self.tree, node, id)?;
        self.dirty = true;
        Ok(())
    }

    pub fn set_content(&mut self, node: NodeId, content: &str) -> Result<(), SessionError> {
        tree_ops::set_content(&mut self.tree, node, content)?;
        self.dirty = true;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save back to the file the session was loaded from.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let path = self.source.clone().ok_or(SessionError::NoSource)?;
        self.save_to(&path)
    }

    /// Save to `path` and make it the session's source.
    pub fn save_to(&mut self, path: &Path) -> Result<(), SessionError> {
        tree_io::save_tree(&self.tree, path)?;
        self.source = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }
}

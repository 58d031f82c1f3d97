use chrono::NaiveDate;
use tracing::debug;

use crate::model::task::{NodeId, TaskNode, is_path_char};
use crate::model::tree::TaskTree;
use crate::parse::document::{NodeDoc, to_doc};

/// Error type for tree mutations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("task content must not be empty")]
    EmptyContent,
    #[error("duplicate unique id: {0}")]
    DuplicateId(String),
    #[error("invalid unique id {0:?}: must be non-empty, not . or .., and free of whitespace, '/', '#' and '~'")]
    InvalidId(String),
    #[error("cannot detach a node with no parent")]
    NoParent,
    #[error("{node} is already a subnode of {parent}")]
    AlreadyChild { node: NodeId, parent: NodeId },
    #[error("cannot move {node} under its own descendant {parent}")]
    CycleDetected { node: NodeId, parent: NodeId },
}

/// Fields for a task created by hand (rather than loaded from a document)
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub content: String,
    pub due_date: Option<NaiveDate>,
    pub unique_id: Option<String>,
}

impl NewTask {
    pub fn new(content: impl Into<String>) -> Self {
        NewTask {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.unique_id = Some(id.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Create a tree whose root is `task`.
pub fn new_tree(task: NewTask) -> Result<TaskTree, TreeError> {
    check_content(&task.content)?;
    if let Some(uid) = &task.unique_id {
        check_id_valid(uid)?;
    }
    let mut tree = TaskTree::with_root(TaskNode::new(task.content, task.due_date));
    let root = tree.root();
    tree.register_id(root, task.unique_id);
    Ok(tree)
}

/// Create a task as the last child of `parent`. The new node's parent link
/// and the parent's child list are set together.
pub fn add_subnode(tree: &mut TaskTree, parent: NodeId, task: NewTask) -> Result<NodeId, TreeError> {
    require(tree, parent)?;
    check_content(&task.content)?;
    if let Some(uid) = &task.unique_id {
        check_id_valid(uid)?;
        check_id_free(tree, uid, None)?;
    }

    let id = tree.insert_child(parent, TaskNode::new(task.content, task.due_date));
    tree.register_id(id, task.unique_id);
    debug!(node = %id, parent = %parent, "added subnode");
    Ok(id)
}

// ---------------------------------------------------------------------------
// Structural changes
// ---------------------------------------------------------------------------

/// Remove `node` (with its subtree) from its parent and from the tree.
///
/// Returns the detached subtree in nested form so the caller can keep or
/// re-import it. The subtree's unique ids become free again.
pub fn detach_from_parent(tree: &mut TaskTree, node: NodeId) -> Result<NodeDoc, TreeError> {
    let current = require(tree, node)?;
    if current.is_root() {
        return Err(TreeError::NoParent);
    }

    let doc = to_doc(tree, node, None);
    tree.remove_subtree(node);
    debug!(node = %node, "detached subtree");
    Ok(doc)
}

/// Move `node` to the end of `new_parent`'s children.
///
/// All checks run before anything moves, so a failed call leaves the tree
/// as it was.
pub fn change_parent(tree: &mut TaskTree, node: NodeId, new_parent: NodeId) -> Result<(), TreeError> {
    let current = require(tree, node)?;
    let target = require(tree, new_parent)?;
    if target.children().contains(&node) {
        return Err(TreeError::AlreadyChild {
            node,
            parent: new_parent,
        });
    }
    if current.is_root() {
        return Err(TreeError::NoParent);
    }
    if tree.is_ancestor_or_self(node, new_parent) {
        return Err(TreeError::CycleDetected {
            node,
            parent: new_parent,
        });
    }

    tree.relink(node, new_parent);
    debug!(node = %node, parent = %new_parent, "changed parent");
    Ok(())
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

pub fn change_date(tree: &mut TaskTree, node: NodeId, new_date: Option<NaiveDate>) -> Result<(), TreeError> {
    let task = tree.get_mut(node).ok_or(TreeError::NodeNotFound(node))?;
    task.due_date = new_date;
    Ok(())
}

pub fn set_content(tree: &mut TaskTree, node: NodeId, content: &str) -> Result<(), TreeError> {
    require(tree, node)?;
    check_content(content)?;
    if let Some(task) = tree.get_mut(node) {
        task.content = content.to_string();
    }
    Ok(())
}

/// Assign (or clear) a node's unique id. Fails without touching the tree if
/// another node already holds the id.
pub fn set_unique_id(tree: &mut TaskTree, node: NodeId, unique_id: Option<String>) -> Result<(), TreeError> {
    require(tree, node)?;
    if let Some(uid) = &unique_id {
        check_id_valid(uid)?;
        check_id_free(tree, uid, Some(node))?;
    }
    tree.register_id(node, unique_id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require(tree: &TaskTree, node: NodeId) -> Result<&TaskNode, TreeError> {
    tree.get(node).ok_or(TreeError::NodeNotFound(node))
}

/// Content is stored exactly as given; it only has to be non-blank.
fn check_content(content: &str) -> Result<(), TreeError> {
    if content.trim().is_empty() {
        return Err(TreeError::EmptyContent);
    }
    Ok(())
}

/// An id doubles as a path segment, so it may not contain path syntax.
fn check_id_valid(uid: &str) -> Result<(), TreeError> {
    if matches!(uid, "" | "." | "..") || uid.chars().any(is_path_char) {
        return Err(TreeError::InvalidId(uid.to_string()));
    }
    Ok(())
}

/// `owner` may already hold `uid` (re-assigning the same id is fine).
pub(crate) fn check_id_free(tree: &TaskTree, uid: &str, owner: Option<NodeId>) -> Result<(), TreeError> {
    match tree.find_by_unique_id(uid) {
        Some(holder) if Some(holder) != owner => Err(TreeError::DuplicateId(uid.to_string())),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

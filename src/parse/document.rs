use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::task::{NodeId, TaskNode};
use crate::model::tree::TaskTree;
use crate::ops::tree_ops::{self, NewTask, TreeError};

/// Date format used in documents
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Nested, serializable form of a task and (some of) its subtree.
///
/// This is the shape of the persisted TOML file:
///
/// ```toml
/// parent = ""
/// content = "Home"
/// due_date = ""
///
/// [[subnodes]]
/// parent = "Home"
/// content = "Buy milk"
/// due_date = "2024-01-01"
/// unique_id = "MILK"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDoc {
    /// Content of the parent, `""` for the root. Informational only: it is
    /// written out but never read back, parentage comes from nesting.
    #[serde(default)]
    pub parent: String,
    pub content: String,
    /// ISO date, or `""` for none
    #[serde(default)]
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnodes: Vec<NodeDoc>,
}

impl NodeDoc {
    /// Copy with every `parent` field blanked, for comparing trees by shape
    /// and content alone.
    pub fn without_parents(&self) -> NodeDoc {
        NodeDoc {
            parent: String::new(),
            content: self.content.clone(),
            due_date: self.due_date.clone(),
            unique_id: self.unique_id.clone(),
            subnodes: self.subnodes.iter().map(NodeDoc::without_parents).collect(),
        }
    }
}

/// Error type for building a tree from a document
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("invalid due date {value:?} on task {content:?}: expected YYYY-MM-DD")]
    InvalidDate { content: String, value: String },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

// ---------------------------------------------------------------------------
// Document → tree
// ---------------------------------------------------------------------------

/// Build a tree from a nested document. The `parent` fields are ignored.
///
/// Unique ids are registered as nodes are created; the first node to claim
/// an id keeps it and any later claim fails the whole build.
pub fn from_doc(doc: &NodeDoc) -> Result<TaskTree, DocumentError> {
    let mut tree = tree_ops::new_tree(new_task(doc)?)?;
    let root = tree.root();
    add_subnodes(&mut tree, root, &doc.subnodes)?;
    Ok(tree)
}

fn add_subnodes(tree: &mut TaskTree, parent: NodeId, docs: &[NodeDoc]) -> Result<(), DocumentError> {
    for sub in docs {
        let id = tree_ops::add_subnode(tree, parent, new_task(sub)?)?;
        add_subnodes(tree, id, &sub.subnodes)?;
    }
    Ok(())
}

fn new_task(doc: &NodeDoc) -> Result<NewTask, DocumentError> {
    Ok(NewTask {
        content: doc.content.clone(),
        due_date: parse_date(&doc.content, &doc.due_date)?,
        unique_id: doc.unique_id.clone(),
    })
}

fn parse_date(content: &str, value: &str) -> Result<Option<NaiveDate>, DocumentError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DocumentError::InvalidDate {
            content: content.to_string(),
            value: value.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tree → document
// ---------------------------------------------------------------------------

/// Nested form of `node`.
///
/// `depth` bounds how many levels of subnodes are included: `None` means the
/// whole subtree, `Some(0)` only the node itself, `Some(n)` n levels below.
/// A dead handle yields an empty document.
pub fn to_doc(tree: &TaskTree, node: NodeId, depth: Option<usize>) -> NodeDoc {
    let Some(task) = tree.get(node) else {
        return NodeDoc::default();
    };

    let parent = tree
        .parent(node)
        .and_then(|p| tree.get(p))
        .map(|p| p.content().to_string())
        .unwrap_or_default();

    let subnodes = match depth {
        Some(0) => Vec::new(),
        _ => {
            let next = depth.map(|d| d - 1);
            task.children()
                .iter()
                .map(|c| to_doc(tree, *c, next))
                .collect()
        }
    };

    NodeDoc {
        parent,
        content: task.content().to_string(),
        due_date: format_date(task),
        unique_id: task.unique_id().map(str::to_string),
        subnodes,
    }
}

fn format_date(task: &TaskNode) -> String {
    task.due_date()
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// TOML codec
// ---------------------------------------------------------------------------

pub fn parse_document(text: &str) -> Result<NodeDoc, toml::de::Error> {
    toml::from_str(text)
}

pub fn serialize_document(doc: &NodeDoc) -> Result<String, toml::ser::Error> {
    toml::to_string(doc)
}

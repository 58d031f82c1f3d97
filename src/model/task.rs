use std::fmt;

use chrono::NaiveDate;
use heck::ToKebabCase;

/// Handle to a node inside a `TaskTree` arena.
///
/// Handles are only meaningful for the tree that issued them. Slots are
/// never reused, so a handle to a detached node stays dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single task in the tree.
///
/// Structural fields (`parent`, `children`) are only changed by `TaskTree`,
/// which keeps both sides of every link in sync.
#[derive(Debug, Clone)]
pub struct TaskNode {
    /// Task text, never blank
    pub(crate) content: String,
    pub(crate) due_date: Option<NaiveDate>,
    /// Tree-wide unique identifier, registered with the owning tree
    pub(crate) unique_id: Option<String>,
    pub(crate) parent: Option<NodeId>,
    /// Children in display order
    pub(crate) children: Vec<NodeId>,
}

impl TaskNode {
    pub(crate) fn new(content: String, due_date: Option<NaiveDate>) -> Self {
        TaskNode {
            content,
            due_date,
            unique_id: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.unique_id.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Short path segment for this node: the unique id when set, otherwise
    /// the kebab-cased content (`"Buy milk"` → `buy-milk`). Siblings can
    /// share a slug; `TaskTree::child_slugs` tells them apart.
    pub fn slug(&self) -> String {
        match &self.unique_id {
            Some(id) => id.clone(),
            None => slugify(&self.content),
        }
    }
}

impl fmt::Display for TaskNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content)?;
        if let Some(date) = self.due_date {
            write!(f, " [{}]", date.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}

/// Kebab-case a task title for use as a path segment.
pub fn slugify(content: &str) -> String {
    let slug = content.to_kebab_case();
    if slug.is_empty() {
        // Titles made only of punctuation still need a segment
        content
            .trim()
            .chars()
            .map(|c| if is_path_char(c) || c == '.' { '-' } else { c })
            .collect()
    } else {
        slug
    }
}

/// Characters with a meaning inside a path: separators, the `#` anchor and
/// the `~n` sibling suffix.
pub(crate) fn is_path_char(c: char) -> bool {
    matches!(c, '/' | '#' | '~') || c.is_whitespace()
}

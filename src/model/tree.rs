use std::collections::HashMap;

use super::task::{NodeId, TaskNode};

/// An arena-backed task tree with exactly one root.
///
/// # Invariants
/// - Every live node except the root has a parent, and appears exactly once
///   in that parent's `children`.
/// - `ids` maps each set `unique_id` to the live node holding it.
/// - The parent chain of every node ends at the root (no cycles).
#[derive(Debug, Clone)]
pub struct TaskTree {
    nodes: Vec<Option<TaskNode>>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
}

impl TaskTree {
    /// Create a tree holding only `root`. Content validation is the caller's
    /// job (see `ops::tree_ops::new_tree`).
    pub(crate) fn with_root(root: TaskNode) -> Self {
        let mut tree = TaskTree {
            nodes: Vec::new(),
            root: NodeId(0),
            ids: HashMap::new(),
        };
        let id = tree.alloc(root);
        tree.root = id;
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&TaskNode> {
        self.nodes.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut TaskNode> {
        self.nodes.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent())
    }

    pub fn find_by_unique_id(&self, unique_id: &str) -> Option<NodeId> {
        self.ids.get(unique_id).copied()
    }

    /// Nodes from the root down to `id`, inclusive. Empty for a dead handle.
    pub fn full_path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.get(id).map(|_| id);
        while let Some(node_id) = cursor {
            path.push(node_id);
            cursor = self.parent(node_id);
        }
        path.reverse();
        path
    }

    /// `content` of each node on the full path, joined with `/`.
    ///
    /// Display only: two different nodes can share this string.
    pub fn full_path_str(&self, id: NodeId) -> String {
        self.full_path(id)
            .into_iter()
            .filter_map(|n| self.get(n))
            .map(|n| n.content())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Path segments of every node on the full path below the root, joined
    /// with `/`. Feeding this back to `resolve_path` from the root finds `id`
    /// again.
    pub fn slug_path(&self, id: NodeId) -> String {
        self.full_path(id)
            .into_iter()
            .skip(1)
            .filter_map(|n| self.slug_of(n))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// True if `ancestor` is `node` itself or lies on `node`'s parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.parent(id);
        }
        false
    }

    /// Path segment of every child of `id`, in child order.
    ///
    /// A child whose slug is already taken by an earlier sibling gets `~2`,
    /// `~3`, ... appended, so every child has a segment of its own.
    pub fn child_slugs(&self, id: NodeId) -> Vec<(NodeId, String)> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        self.children(id)
            .iter()
            .filter_map(|c| self.get(*c).map(|n| (*c, n.slug())))
            .map(|(c, slug)| {
                let count = seen.entry(slug.clone()).or_insert(0);
                *count += 1;
                match *count {
                    1 => (c, slug),
                    n => (c, format!("{slug}~{n}")),
                }
            })
            .collect()
    }

    /// Path segment of `id` among its siblings. The root has no siblings and
    /// gets its plain slug.
    pub fn slug_of(&self, id: NodeId) -> Option<String> {
        match self.parent(id) {
            Some(parent) => self
                .child_slugs(parent)
                .into_iter()
                .find(|(c, _)| *c == id)
                .map(|(_, slug)| slug),
            None => self.get(id).map(|n| n.slug()),
        }
    }

    pub fn child_by_slug(&self, id: NodeId, slug: &str) -> Option<NodeId> {
        self.child_slugs(id)
            .into_iter()
            .find(|(_, s)| s == slug)
            .map(|(c, _)| c)
    }

    /// Resolve a `/`-separated slug path starting at `from`.
    ///
    /// An optional leading `#` is ignored. A leading `/` starts at the root,
    /// `..` moves to the parent (staying at the root if already there) and
    /// `.` or empty segments are skipped.
    pub fn resolve_path(&self, from: NodeId, path: &str) -> Option<NodeId> {
        let path = path.strip_prefix('#').unwrap_or(path);
        let mut cursor = if path.starts_with('/') { self.root } else { from };
        if !self.contains(cursor) {
            return None;
        }
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => cursor = self.parent(cursor).unwrap_or(cursor),
                slug => cursor = self.child_by_slug(cursor, slug)?,
            }
        }
        Some(cursor)
    }

    /// Depth-first, pre-order walk of the subtree rooted at `id`.
    pub fn walk(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            for child in self.children(next).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Structural primitives (validated by ops::tree_ops)
    // -----------------------------------------------------------------------

    fn alloc(&mut self, node: TaskNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    /// Allocate `node` and link it as the last child of `parent`.
    /// Parent pointer and child list are written together.
    pub(crate) fn insert_child(&mut self, parent: NodeId, mut node: TaskNode) -> NodeId {
        node.parent = Some(parent);
        let id = self.alloc(node);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Move `node` under `new_parent`, updating the old parent's child list,
    /// the new parent's child list and `node.parent` in one step.
    pub(crate) fn relink(&mut self, node: NodeId, new_parent: NodeId) {
        if let Some(old) = self.parent(node)
            && let Some(p) = self.get_mut(old)
        {
            p.children.retain(|c| *c != node);
        }
        if let Some(n) = self.get_mut(node) {
            n.parent = Some(new_parent);
        }
        if let Some(p) = self.get_mut(new_parent) {
            p.children.push(node);
        }
    }

    /// Unlink `node` from its parent and free its whole subtree, dropping the
    /// freed nodes' ids from the registry.
    pub(crate) fn remove_subtree(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node)
            && let Some(p) = self.get_mut(parent)
        {
            p.children.retain(|c| *c != node);
        }
        for id in self.walk(node) {
            if let Some(freed) = self.nodes.get_mut(id.0).and_then(Option::take)
                && let Some(uid) = freed.unique_id
            {
                self.ids.remove(&uid);
            }
        }
    }

    /// Point `uid` at `node`, replacing whatever id `node` held before.
    /// Uniqueness is checked by the caller.
    pub(crate) fn register_id(&mut self, node: NodeId, uid: Option<String>) {
        let Some(n) = self.get_mut(node) else {
            return;
        };
        let old = std::mem::replace(&mut n.unique_id, uid.clone());
        if let Some(old) = old {
            self.ids.remove(&old);
        }
        if let Some(uid) = uid {
            self.ids.insert(uid, node);
        }
    }
}

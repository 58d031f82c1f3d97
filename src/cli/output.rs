use serde::Serialize;

use crate::model::task::NodeId;
use crate::model::tree::TaskTree;
use crate::parse::document::DATE_FORMAT;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub content: String,
    pub slug: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subnodes: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct CompletionJson {
    pub fallback: bool,
    pub fragment: String,
    pub candidates: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// JSON view of `node`, descending `depth` levels (`None` = all).
pub fn task_to_json(tree: &TaskTree, node: NodeId, depth: Option<usize>) -> Option<TaskJson> {
    let task = tree.get(node)?;
    let subnodes = match depth {
        Some(0) => Vec::new(),
        _ => tree
            .children(node)
            .iter()
            .filter_map(|c| task_to_json(tree, *c, depth.map(|d| d - 1)))
            .collect(),
    };
    Some(TaskJson {
        content: task.content().to_string(),
        slug: tree.slug_of(node).unwrap_or_default(),
        path: tree.full_path_str(node),
        due_date: task.due_date().map(|d| d.format(DATE_FORMAT).to_string()),
        unique_id: task.unique_id().map(str::to_string),
        subnodes,
    })
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// Indented outline of `node`'s subtree, two spaces per level:
///
/// ```text
/// Home
///   Kitchen (kitchen)
///     Buy milk [2024-01-01] (MILK)
/// ```
///
/// Each non-root line ends with the slug used to address it.
pub fn format_tree(tree: &TaskTree, node: NodeId, depth: Option<usize>) -> String {
    let mut out = String::new();
    format_node(tree, node, depth, 0, &mut out);
    out
}

fn format_node(tree: &TaskTree, node: NodeId, depth: Option<usize>, indent: usize, out: &mut String) {
    let Some(task) = tree.get(node) else {
        return;
    };
    out.push_str(&"  ".repeat(indent));
    out.push_str(&task.to_string());
    if !task.is_root()
        && let Some(slug) = tree.slug_of(node)
    {
        out.push_str(&format!(" ({})", slug));
    }
    out.push('\n');

    if depth == Some(0) {
        return;
    }
    for child in tree.children(node) {
        format_node(tree, *child, depth.map(|d| d - 1), indent + 1, out);
    }
}

/// One line per child: `slug  content [date]`, with a trailing `/` on the
/// slug when the child has children of its own.
pub fn format_listing(tree: &TaskTree, node: NodeId) -> String {
    let mut out = String::new();
    for (child, slug) in tree.child_slugs(node) {
        if let Some(task) = tree.get(child) {
            let marker = if task.has_children() { "/" } else { "" };
            out.push_str(&format!("{}{}  {}\n", slug, marker, task));
        }
    }
    out
}

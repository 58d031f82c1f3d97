//! Path completion over a task tree.
//!
//! Completion reads the tree and never changes it. The front-end asks for
//! candidates on each keystroke and gets back either a list of child slugs
//! or `Fallback`, meaning "offer nothing of ours".

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::model::task::NodeId;
use crate::model::tree::TaskTree;

/// Optional `#` anchor, optional leading `/`, then `/`-separated segments.
static PATH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?/?(?:[^\s#/]+/)*[^\s#/]*$").unwrap());

/// Result of a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Nothing to suggest; the front-end should use its default behaviour
    Fallback,
    /// One slug per child of the completion base, in child order
    Candidates {
        /// Partial segment under the cursor
        fragment: String,
        slugs: Vec<String>,
    },
}

impl Completion {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Completion::Fallback)
    }

    /// Every candidate slug (empty for `Fallback`).
    pub fn suggestions(&self) -> &[String] {
        match self {
            Completion::Fallback => &[],
            Completion::Candidates { slugs, .. } => slugs,
        }
    }

    /// Candidates that start with the partial segment being typed.
    pub fn matching(&self) -> Vec<&str> {
        match self {
            Completion::Fallback => Vec::new(),
            Completion::Candidates { fragment, slugs } => slugs
                .iter()
                .filter(|s| s.starts_with(fragment.as_str()))
                .map(String::as_str)
                .collect(),
        }
    }
}

/// Completion state held by a front-end across keystrokes.
#[derive(Debug)]
pub struct PathCompleter<'a> {
    tree: &'a TaskTree,
    base: NodeId,
    mid_path: bool,
}

impl<'a> PathCompleter<'a> {
    pub fn new(tree: &'a TaskTree, base: NodeId) -> Self {
        PathCompleter {
            tree,
            base,
            mid_path: false,
        }
    }

    pub fn base(&self) -> NodeId {
        self.base
    }

    /// Whether the last request was part-way through a multi-segment path.
    pub fn mid_path(&self) -> bool {
        self.mid_path
    }

    pub fn complete(&mut self, text: &str, cursor: usize) -> Completion {
        let token = path_token(text, cursor);
        self.mid_path = token.contains('/');
        complete(self.tree, self.base, text, cursor)
    }
}

/// Candidate next segments for `text` with the cursor at char offset
/// `cursor`, relative to `base`.
///
/// - `base` without children → `Fallback`, whatever the text.
/// - The token before the cursor is not path-like → `Fallback`.
/// - Completed segments (`kitchen/`, `../`, `/garden/`) are resolved the
///   way navigation resolves them; an unknown segment or a childless
///   target → `Fallback`.
pub fn complete(tree: &TaskTree, base: NodeId, text: &str, cursor: usize) -> Completion {
    if tree.children(base).is_empty() {
        return Completion::Fallback;
    }

    let token = path_token(text, cursor);
    if !PATH_TOKEN.is_match(token) {
        return Completion::Fallback;
    }

    let path = token.strip_prefix('#').unwrap_or(token);
    let (parents, fragment) = match path.rfind('/') {
        Some(i) => (&path[..=i], &path[i + 1..]),
        None => ("", path),
    };

    let Some(target) = tree.resolve_path(base, parents) else {
        return Completion::Fallback;
    };
    let slugs: Vec<String> = tree
        .child_slugs(target)
        .into_iter()
        .map(|(_, slug)| slug)
        .collect();
    if slugs.is_empty() {
        return Completion::Fallback;
    }

    trace!(base = %target, count = slugs.len(), "completion candidates");
    Completion::Candidates {
        fragment: fragment.to_string(),
        slugs,
    }
}

/// Text between the last whitespace before the cursor and the cursor.
fn path_token(text: &str, cursor: usize) -> &str {
    let end = text
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let before = &text[..end];
    match before.rfind(char::is_whitespace) {
        Some(i) => {
            let ws_len = before[i..].chars().next().map_or(1, char::len_utf8);
            &before[i + ws_len..]
        }
        None => before,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tree_ops::{NewTask, add_subnode, new_tree};

    /// Home
    ///   Kitchen
    ///     Buy milk
    ///     Wash up (WASH)
    ///   Garden
    fn sample() -> (TaskTree, NodeId, NodeId, NodeId) {
        let mut tree = new_tree(NewTask::new("Home")).unwrap();
        let root = tree.root();
        let kitchen = add_subnode(&mut tree, root, NewTask::new("Kitchen")).unwrap();
        add_subnode(&mut tree, kitchen, NewTask::new("Buy milk")).unwrap();
        add_subnode(&mut tree, kitchen, NewTask::new("Wash up").with_id("WASH")).unwrap();
        let garden = add_subnode(&mut tree, root, NewTask::new("Garden")).unwrap();
        (tree, root, kitchen, garden)
    }

    fn slugs(c: &Completion) -> Vec<&str> {
        c.suggestions().iter().map(String::as_str).collect()
    }

    #[test]
    fn childless_base_falls_back_for_any_text() {
        let (tree, _, _, garden) = sample();
        for text in ["", "#", "kitchen/", "hello world", "#kit"] {
            let c = complete(&tree, garden, text, text.chars().count());
            assert!(c.is_fallback(), "text {text:?}");
            assert!(c.suggestions().is_empty());
        }
    }

    #[test]
    fn lists_children_of_base() {
        let (tree, root, ..) = sample();
        let c = complete(&tree, root, "", 0);
        assert_eq!(slugs(&c), vec!["kitchen", "garden"]);
    }

    #[test]
    fn anchor_is_optional() {
        let (tree, root, ..) = sample();
        let c = complete(&tree, root, "cd #", 4);
        assert_eq!(slugs(&c), vec!["kitchen", "garden"]);
    }

    #[test]
    fn mid_path_completes_against_resolved_node() {
        let (tree, root, ..) = sample();
        let text = "mv kitchen/";
        let c = complete(&tree, root, text, text.len());
        assert_eq!(slugs(&c), vec!["buy-milk", "WASH"]);
    }

    #[test]
    fn fragment_filters_matching() {
        let (tree, root, ..) = sample();
        let c = complete(&tree, root, "kitchen/bu", 10);
        assert_eq!(
            c,
            Completion::Candidates {
                fragment: "bu".into(),
                slugs: vec!["buy-milk".into(), "WASH".into()],
            }
        );
        assert_eq!(c.matching(), vec!["buy-milk"]);
    }

    #[test]
    fn unknown_segment_falls_back() {
        let (tree, root, ..) = sample();
        assert!(complete(&tree, root, "attic/", 6).is_fallback());
    }

    #[test]
    fn childless_target_falls_back() {
        let (tree, root, ..) = sample();
        assert!(complete(&tree, root, "garden/", 7).is_fallback());
    }

    #[test]
    fn absolute_and_parent_segments_resolve_like_navigation() {
        let (tree, root, kitchen, _) = sample();
        let c = complete(&tree, kitchen, "cd /gar", 7);
        assert_eq!(c.matching(), vec!["garden"]);
        let c = complete(&tree, kitchen, "cd ../", 6);
        assert_eq!(slugs(&c), vec!["kitchen", "garden"]);
        let c = complete(&tree, root, "#/kitchen/", 10);
        assert_eq!(slugs(&c), vec!["buy-milk", "WASH"]);
    }

    #[test]
    fn clashing_siblings_are_offered_separately() {
        let (mut tree, root, ..) = sample();
        add_subnode(&mut tree, root, NewTask::new("garden")).unwrap();
        let c = complete(&tree, root, "gar", 3);
        assert_eq!(c.matching(), vec!["garden", "garden~2"]);
    }

    #[test]
    fn non_path_token_falls_back() {
        let (tree, root, ..) = sample();
        assert!(complete(&tree, root, "a#b", 3).is_fallback());
        assert!(complete(&tree, root, "##", 2).is_fallback());
    }

    #[test]
    fn cursor_limits_the_token() {
        let (tree, root, ..) = sample();
        // Cursor right after "kitchen/", text beyond it is ignored
        let c = complete(&tree, root, "kitchen/ trailing", 8);
        assert_eq!(slugs(&c), vec!["buy-milk", "WASH"]);
        // Cursor past the end clamps
        let c = complete(&tree, root, "gar", 99);
        assert_eq!(c.matching(), vec!["garden"]);
    }

    #[test]
    fn completer_tracks_mid_path() {
        let (tree, root, kitchen, _) = sample();
        let mut completer = PathCompleter::new(&tree, root);
        completer.complete("kit", 3);
        assert!(!completer.mid_path());
        completer.complete("kitchen/w", 9);
        assert!(completer.mid_path());

        let mut at_kitchen = PathCompleter::new(&tree, kitchen);
        assert_eq!(at_kitchen.base(), kitchen);
        assert_eq!(at_kitchen.complete("", 0).matching(), vec!["buy-milk", "WASH"]);
    }
}

//! Reversible highlight surgery.
//!
//! A [`Replacement`] swaps one original text node for a run of new nodes
//! (plain text for unmatched spans, wrapper elements for matched spans)
//! under the same parent. [`Replacement::undo_swap`] is the exact inverse
//! of [`Replacement::do_swap`]: the original node, with its identity, goes
//! back where it was and the new nodes are detached.

use crate::dom::{Document, NodeId};
use crate::find::scan::Match;
use crate::find::{HIGHLIGHT_TAG, MATCH_CLASS};

/// A planned piece of a rewritten text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    /// Owning match for highlighted spans, `None` for plain text.
    pub match_id: Option<usize>,
}

impl Fragment {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            match_id: None,
        }
    }

    pub fn highlight(match_id: usize, text: &str) -> Self {
        Self {
            text: text.to_string(),
            match_id: Some(match_id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Replacement {
    old_node: NodeId,
    fragments: Vec<Fragment>,
    new_nodes: Vec<NodeId>,
}

impl Replacement {
    pub fn new(old_node: NodeId, fragments: Vec<Fragment>) -> Self {
        Self {
            old_node,
            fragments,
            new_nodes: Vec::new(),
        }
    }

    pub fn old_node(&self) -> NodeId {
        self.old_node
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn new_nodes(&self) -> &[NodeId] {
        &self.new_nodes
    }

    pub fn is_materialized(&self) -> bool {
        !self.new_nodes.is_empty()
    }

    /// Create the (detached) replacement nodes. Each highlight wrapper is
    /// recorded on its match. Calling this twice is a no-op.
    pub fn materialize(&mut self, doc: &mut Document, matches: &mut [Match]) {
        if self.is_materialized() {
            return;
        }
        for fragment in &self.fragments {
            let node = match fragment.match_id {
                Some(id) => {
                    let wrapper = doc.create_element(HIGHLIGHT_TAG);
                    doc.set_attr(wrapper, "class", MATCH_CLASS);
                    let text = doc.create_text(fragment.text.as_str());
                    doc.append_child(wrapper, text);
                    if let Some(m) = matches.get_mut(id) {
                        m.nodes.push(wrapper);
                    }
                    wrapper
                }
                None => doc.create_text(fragment.text.as_str()),
            };
            self.new_nodes.push(node);
        }
    }

    /// Put the new nodes in place of the old one. No-op when the old node
    /// is detached or nothing was materialized.
    pub fn do_swap(&self, doc: &mut Document) {
        if self.new_nodes.is_empty() {
            return;
        }
        let Some(parent) = doc.parent(self.old_node) else {
            return;
        };
        if !doc.replace_child_with(parent, self.old_node, &self.new_nodes) {
            log::debug!("{:?} could not be swapped for its highlights", self.old_node);
        }
    }

    /// Put the old node back before the first new node and detach all new
    /// nodes. No-op when nothing was materialized or the new nodes are
    /// detached.
    pub fn undo_swap(&self, doc: &mut Document) {
        let Some(&first) = self.new_nodes.first() else {
            return;
        };
        let Some(parent) = doc.parent(first) else {
            return;
        };
        if doc.restore_child(parent, &self.new_nodes, self.old_node) {
            return;
        }

        // The run was split up after the swap; undo node by node.
        doc.insert_before(parent, self.old_node, Some(first));
        for &node in &self.new_nodes {
            if let Some(p) = doc.parent(node) {
                doc.remove_child(p, node);
            }
        }
    }
}

//! Document text flattening.
//!
//! Walks the tree with an explicit stack so the walk can stop at any node
//! and pick up again later. Every text node contributes one [`Section`]:
//! its half-open byte range in the case-folded buffer.

use crate::dom::{Document, NodeId, NodeKind};
use crate::find::{Progress, Timer};

/// Elements whose subtrees are never searched.
pub const IGNORED_TAGS: &[&str] = &[
    "script", "style", "embed", "object", "select", "textarea", "iframe", "noscript",
];

/// One text node's slice `[begin, end)` of the flattened buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub begin: usize,
    pub end: usize,
    pub node: NodeId,
}

impl Section {
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

/// Lowercase `text` char by char, keeping any char whose lowercase form
/// would change the UTF-8 length. Byte offsets into the result are byte
/// offsets into `text`.
pub fn fold_case(text: &str) -> String {
    text.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
                _ => c,
            }
        })
        .collect()
}

/// Flattened, case-folded document text and its section list.
#[derive(Debug, Default)]
pub struct TextIndex {
    all_text: String,
    sections: Vec<Section>,
    pending: Vec<NodeId>,
}

impl TextIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a walk at `root`.
    pub fn seed(&mut self, root: NodeId) {
        self.pending.push(root);
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn all_text(&self) -> &str {
        &self.all_text
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn clear(&mut self) {
        self.all_text.clear();
        self.sections.clear();
        self.pending.clear();
    }

    /// Continue the walk until it finishes or `timer` runs out. At least
    /// one node is processed per call.
    pub fn build(&mut self, doc: &Document, timer: &Timer) -> Progress {
        while let Some(node) = self.pending.pop() {
            match doc.kind(node) {
                NodeKind::Text(text) => {
                    let begin = self.all_text.len();
                    self.all_text.push_str(&fold_case(text));
                    self.sections.push(Section {
                        begin,
                        end: self.all_text.len(),
                        node,
                    });
                }
                NodeKind::Element(_) | NodeKind::Document => {
                    // Reverse so pops come out in document order.
                    self.pending.extend(
                        doc.children(node)
                            .iter()
                            .rev()
                            .copied()
                            .filter(|&c| is_searchable(doc, c)),
                    );
                }
                NodeKind::Comment(_) => {}
            }
            if timer.overtime() {
                log::debug!(
                    "indexing paused: {} sections, {} nodes pending",
                    self.sections.len(),
                    self.pending.len()
                );
                return Progress::TimedOut;
            }
        }
        Progress::Complete
    }
}

fn is_searchable(doc: &Document, id: NodeId) -> bool {
    match doc.kind(id) {
        NodeKind::Text(_) => true,
        NodeKind::Element(el) => !IGNORED_TAGS.contains(&el.tag.as_str()),
        NodeKind::Document | NodeKind::Comment(_) => false,
    }
}

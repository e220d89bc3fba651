//! Arena-backed mutable DOM.
//!
//! Every node lives in a single `Vec` owned by [`Document`] and is addressed
//! by a [`NodeId`]. Removing a node only detaches it: the id stays valid, so
//! callers holding on to it (highlight bookkeeping, selections) can insert it
//! again later with its identity intact.

pub mod css;
pub mod parser;

use crate::render::layout::compute_layout;
use crate::render::Rect;
use css::{ComputedStyle, Position, Stylesheet};

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element tag and attributes. Tags are stored lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub tag: String,
    /// Attributes in source order.
    pub attributes: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Elements that never have children or a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text is serialized verbatim.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// A mutable document plus the rendering state derived from it
/// (stylesheet, layout boxes, viewport and scroll offset).
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    viewport: (f32, f32),
    scroll: (f32, f32),
    stylesheet: Stylesheet,
    layout: Vec<Rect>,
    dirty: bool,
}

impl Document {
    /// An empty document (root node only) with the given viewport size.
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            viewport: (viewport_width, viewport_height),
            scroll: (0.0, 0.0),
            stylesheet: Stylesheet::default(),
            layout: Vec::new(),
            dirty: true,
        }
    }

    /// A document with the usual `html > (head, body)` skeleton.
    pub fn with_skeleton(viewport_width: f32, viewport_height: f32) -> Self {
        let mut doc = Self::new(viewport_width, viewport_height);
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        let root = doc.root();
        doc.append_child(root, html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    // ----------------------------------------------------------------
    // Tree queries
    // ----------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    fn position_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let pos = self.children(parent).iter().position(|&c| c == id)?;
        Some((parent, pos))
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position_in_parent(id)?;
        pos.checked_sub(1).map(|p| self.children(parent)[p])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position_in_parent(id)?;
        self.children(parent).get(pos + 1).copied()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Text(_))
    }

    /// Data of a text node; `None` for any other kind of node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Replace the data of a text node. Returns `false` for non-text nodes.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(t) => {
                *t = text.into();
                self.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Text node or comment data, or the concatenated text of every
    /// descendant text node for elements and the document.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(t) | NodeKind::Comment(t) => t.clone(),
            NodeKind::Element(_) | NodeKind::Document => {
                let mut buf = String::new();
                self.collect_text(id, &mut buf);
                buf
            }
        }
    }

    fn collect_text(&self, id: NodeId, buf: &mut String) {
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Text(t) => buf.push_str(t),
                NodeKind::Element(_) => self.collect_text(child, buf),
                _ => {}
            }
        }
    }

    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&c| self.is_element(c))
    }

    fn html_child(&self, tag: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&c| self.tag_name(c) == Some(tag))
    }

    pub fn head(&self) -> Option<NodeId> {
        self.html_child("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.html_child("body")
    }

    /// Pre-order list of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    /// Connected elements with the given tag, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&n| self.tag_name(n).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    pub fn element_by_id(&self, id_attr: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id_attr))
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// Whether the node is reachable from the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == self.root || self.is_ancestor(self.root, id)
    }

    // ----------------------------------------------------------------
    // Tree mutation
    // ----------------------------------------------------------------

    fn detach(&mut self, child: NodeId) {
        if let Some((parent, pos)) = self.position_in_parent(child) {
            self.nodes[parent.0].children.remove(pos);
        }
        self.nodes[child.0].parent = None;
    }

    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        child != self.root
            && child != parent
            && !self.is_ancestor(child, parent)
            && matches!(self.kind(parent), NodeKind::Document | NodeKind::Element(_))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference` (or at the end).
    /// An attached `child` is moved. Returns `false` and leaves the tree
    /// untouched when `reference` is not a child of `parent` or the
    /// insertion would create a cycle.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> bool {
        if !self.can_adopt(parent, child) {
            return false;
        }
        if let Some(r) = reference {
            if r == child {
                return self.parent(child) == Some(parent);
            }
            if self.parent(r) != Some(parent) {
                return false;
            }
        }

        self.detach(child);
        let pos = match reference {
            Some(r) => match self.children(parent).iter().position(|&c| c == r) {
                Some(p) => p,
                None => return false,
            },
            None => self.children(parent).len(),
        };
        self.nodes[parent.0].children.insert(pos, child);
        self.nodes[child.0].parent = Some(parent);
        self.dirty = true;
        true
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        self.dirty = true;
        true
    }

    /// Replace `old` with the run `nodes` in a single splice. Every node in
    /// `nodes` must be detached. Returns `false` and leaves the tree
    /// untouched otherwise, or when `old` is not a child of `parent`.
    pub fn replace_child_with(&mut self, parent: NodeId, old: NodeId, nodes: &[NodeId]) -> bool {
        if self.parent(old) != Some(parent) {
            return false;
        }
        let adoptable = nodes
            .iter()
            .all(|&n| self.parent(n).is_none() && self.can_adopt(parent, n));
        if !adoptable {
            return false;
        }
        let Some(pos) = self.children(parent).iter().position(|&c| c == old) else {
            return false;
        };

        self.nodes[parent.0]
            .children
            .splice(pos..=pos, nodes.iter().copied());
        for &n in nodes {
            self.nodes[n.0].parent = Some(parent);
        }
        self.nodes[old.0].parent = None;
        self.dirty = true;
        true
    }

    /// Inverse of [`replace_child_with`](Self::replace_child_with): put
    /// `old` back where the run `nodes` starts and detach the run. Returns
    /// `false` and leaves the tree untouched unless `nodes` is a non-empty
    /// contiguous run of `parent`'s children.
    pub fn restore_child(&mut self, parent: NodeId, nodes: &[NodeId], old: NodeId) -> bool {
        let Some(&first) = nodes.first() else {
            return false;
        };
        if self.parent(first) != Some(parent) || !self.can_adopt(parent, old) {
            return false;
        }
        let Some(pos) = self.children(parent).iter().position(|&c| c == first) else {
            return false;
        };
        let end = pos + nodes.len();
        if self.children(parent).get(pos..end) != Some(nodes) {
            return false;
        }

        if self.parent(old).is_some() {
            self.detach(old);
        }
        // Detaching `old` may have shifted the run.
        let pos = match self.children(parent).iter().position(|&c| c == first) {
            Some(p) => p,
            None => return false,
        };
        self.nodes[parent.0]
            .children
            .splice(pos..pos + nodes.len(), std::iter::once(old));
        for &n in nodes {
            self.nodes[n.0].parent = None;
        }
        self.nodes[old.0].parent = Some(parent);
        self.dirty = true;
        true
    }

    // ----------------------------------------------------------------
    // Attributes
    // ----------------------------------------------------------------

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        match el
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => el.attributes.push((name.to_ascii_lowercase(), value)),
        }
        self.dirty = true;
        true
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let before = el.attributes.len();
        el.attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        let removed = el.attributes.len() != before;
        self.dirty |= removed;
        removed
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if el.has_class(class) {
            return true;
        }
        let mut classes: Vec<&str> = el.classes().collect();
        classes.push(class);
        let joined = classes.join(" ");
        self.set_attr(id, "class", joined)
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if !el.has_class(class) {
            return false;
        }
        let joined = el
            .classes()
            .filter(|&c| c != class)
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.remove_attr(id, "class")
        } else {
            self.set_attr(id, "class", joined)
        }
    }

    // ----------------------------------------------------------------
    // Serialization
    // ----------------------------------------------------------------

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.serialize(id, false, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let raw = self
            .tag_name(id)
            .is_some_and(|t| RAW_TEXT_TAGS.contains(&t));
        let mut out = String::new();
        for &child in self.children(id) {
            self.serialize(child, raw, &mut out);
        }
        out
    }

    fn serialize(&self, id: NodeId, raw_text: bool, out: &mut String) {
        match self.kind(id) {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.serialize(child, false, out);
                }
            }
            NodeKind::Text(t) if raw_text => out.push_str(t),
            NodeKind::Text(t) => out.push_str(&escape_html(t)),
            NodeKind::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (k, v) in &el.attributes {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape_html(v).replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                out.push_str(&self.inner_html(id));
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    // ----------------------------------------------------------------
    // Rendering state
    // ----------------------------------------------------------------

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
        self.dirty = true;
    }

    pub fn needs_rendering_update(&self) -> bool {
        self.dirty
    }

    /// Re-collect `<style>` rules and recompute layout if anything changed
    /// since the last update.
    pub fn update_rendering(&mut self) {
        if !self.dirty {
            return;
        }
        self.stylesheet = Stylesheet::collect(self);
        self.layout = compute_layout(self);
        self.dirty = false;
    }

    /// Cascaded style of an element. Text and other non-element nodes
    /// report their parent element's style.
    pub fn computed_style(&self, id: NodeId) -> ComputedStyle {
        match self.kind(id) {
            NodeKind::Element(el) => self.stylesheet.cascade(el),
            _ => match self.parent(id) {
                Some(p) => self.computed_style(p),
                None => ComputedStyle::default(),
            },
        }
    }

    /// Layout box in document coordinates as of the last
    /// [`update_rendering`](Self::update_rendering). Nodes created since
    /// then report an empty box.
    pub fn bounding_rect(&self, id: NodeId) -> Rect {
        self.layout.get(id.0).copied().unwrap_or_default()
    }

    /// Nearest positioned ancestor element, falling back to `<body>`.
    /// `None` for the body, the root element and detached nodes.
    pub fn offset_parent(&self, id: NodeId) -> Option<NodeId> {
        let body = self.body();
        if Some(id) == body || Some(id) == self.document_element() {
            return None;
        }
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if Some(p) == body {
                return body;
            }
            if self.is_element(p) && self.computed_style(p).position != Position::Static {
                return Some(p);
            }
            cur = self.parent(p);
        }
        None
    }

    /// Total scrollable extent: the largest of the body and root element
    /// boxes, the laid-out content and the viewport.
    pub fn scroll_size(&self) -> (f32, f32) {
        let (mut width, mut height) = self.viewport;
        for el in [self.body(), self.document_element()].into_iter().flatten() {
            let r = self.bounding_rect(el);
            width = width.max(r.right());
            height = height.max(r.bottom());
        }
        for r in &self.layout {
            width = width.max(r.right());
            height = height.max(r.bottom());
        }
        (width, height)
    }

    pub fn scroll_offset(&self) -> (f32, f32) {
        self.scroll
    }

    pub fn scroll_to(&mut self, x: f32, y: f32) {
        let (doc_w, doc_h) = self.scroll_size();
        let (vw, vh) = self.viewport;
        self.scroll = (
            x.clamp(0.0, (doc_w - vw).max(0.0)),
            y.clamp(0.0, (doc_h - vh).max(0.0)),
        );
    }

    /// Scroll so the node's box is centered in the viewport on both axes.
    pub fn scroll_into_view(&mut self, id: NodeId) {
        let r = self.bounding_rect(id);
        let (vw, vh) = self.viewport;
        self.scroll_to(r.center_x() - vw * 0.5, r.center_y() - vh * 0.5);
    }
}

/// Escape `&`, `<` and `>` for HTML text content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(doc: &mut Document, texts: &[&str]) -> (NodeId, Vec<NodeId>) {
        let body = doc.body().unwrap();
        let p = doc.create_element("p");
        doc.append_child(body, p);
        let nodes = texts
            .iter()
            .map(|t| {
                let n = doc.create_text(*t);
                doc.append_child(p, n);
                n
            })
            .collect();
        (p, nodes)
    }

    #[test]
    fn skeleton_has_head_and_body() {
        let doc = Document::with_skeleton(800.0, 600.0);
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert_eq!(doc.tag_name(doc.document_element().unwrap()), Some("html"));
    }

    #[test]
    fn insert_before_and_siblings() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, nodes) = paragraph(&mut doc, &["a", "c"]);
        let b = doc.create_text("b");
        assert!(doc.insert_before(p, b, Some(nodes[1])));
        assert_eq!(doc.children(p), &[nodes[0], b, nodes[1]]);
        assert_eq!(doc.previous_sibling(b), Some(nodes[0]));
        assert_eq!(doc.next_sibling(b), Some(nodes[1]));
        assert_eq!(doc.previous_sibling(nodes[0]), None);
        assert_eq!(doc.text_content(p), "abc");
    }

    #[test]
    fn insert_before_foreign_reference_is_rejected() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, _) = paragraph(&mut doc, &["a"]);
        let (_, other) = paragraph(&mut doc, &["x"]);
        let n = doc.create_text("n");
        assert!(!doc.insert_before(p, n, Some(other[0])));
        assert_eq!(doc.parent(n), None);
    }

    #[test]
    fn moving_a_node_detaches_it_first() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p1, nodes) = paragraph(&mut doc, &["a", "b"]);
        let (p2, _) = paragraph(&mut doc, &[]);
        doc.append_child(p2, nodes[0]);
        assert_eq!(doc.children(p1), &[nodes[1]]);
        assert_eq!(doc.parent(nodes[0]), Some(p2));
    }

    #[test]
    fn removed_nodes_keep_identity() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, nodes) = paragraph(&mut doc, &["a", "b"]);
        assert!(doc.remove_child(p, nodes[0]));
        assert!(!doc.remove_child(p, nodes[0]));
        assert!(!doc.is_connected(nodes[0]));
        assert_eq!(doc.text(nodes[0]), Some("a"));
        doc.insert_before(p, nodes[0], Some(nodes[1]));
        assert_eq!(doc.children(p), &[nodes[0], nodes[1]]);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, _) = paragraph(&mut doc, &[]);
        let body = doc.body().unwrap();
        assert!(!doc.append_child(p, body));
        assert_eq!(doc.parent(p), Some(body));
    }

    #[test]
    fn class_helpers() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, _) = paragraph(&mut doc, &[]);
        doc.add_class(p, "one");
        doc.add_class(p, "two");
        doc.add_class(p, "two");
        assert_eq!(doc.attr(p, "class"), Some("one two"));
        doc.remove_class(p, "one");
        assert_eq!(doc.attr(p, "class"), Some("two"));
        doc.remove_class(p, "two");
        assert_eq!(doc.attr(p, "class"), None);
    }

    #[test]
    fn serialization_escapes_text() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, _) = paragraph(&mut doc, &["a < b & c"]);
        doc.set_attr(p, "title", "say \"hi\"");
        assert_eq!(
            doc.outer_html(p),
            "<p title=\"say &quot;hi&quot;\">a &lt; b &amp; c</p>"
        );
    }

    #[test]
    fn scroll_is_clamped() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        doc.update_rendering();
        doc.scroll_to(500.0, 500.0);
        assert_eq!(doc.scroll_offset(), (0.0, 0.0));
    }

    #[test]
    fn replace_child_with_splices_a_run() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, nodes) = paragraph(&mut doc, &["a", "b", "c"]);
        let run: Vec<NodeId> = ["x", "y"].iter().map(|t| doc.create_text(*t)).collect();

        assert!(doc.replace_child_with(p, nodes[1], &run));
        assert_eq!(doc.children(p), &[nodes[0], run[0], run[1], nodes[2]]);
        assert_eq!(doc.parent(nodes[1]), None);
        assert_eq!(doc.parent(run[1]), Some(p));
        assert_eq!(doc.last_child(p), Some(nodes[2]));

        assert!(doc.restore_child(p, &run, nodes[1]));
        assert_eq!(doc.children(p), nodes.as_slice());
        assert!(run.iter().all(|&n| doc.parent(n).is_none()));
    }

    #[test]
    fn replace_child_with_rejects_attached_nodes() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, nodes) = paragraph(&mut doc, &["a", "b"]);
        let (_, other) = paragraph(&mut doc, &["x"]);
        assert!(!doc.replace_child_with(p, nodes[0], &other));
        assert!(!doc.replace_child_with(p, other[0], &[]));
        assert_eq!(doc.children(p), nodes.as_slice());
    }

    #[test]
    fn restore_child_needs_a_contiguous_run() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, nodes) = paragraph(&mut doc, &["a", "b", "c"]);
        let old = doc.create_text("old");
        assert!(!doc.restore_child(p, &[nodes[0], nodes[2]], old));
        assert!(!doc.restore_child(p, &[], old));
        assert_eq!(doc.children(p), nodes.as_slice());
        assert_eq!(doc.parent(old), None);
    }

    #[test]
    fn element_lookup_by_id() {
        let mut doc = Document::with_skeleton(800.0, 600.0);
        let (p, _) = paragraph(&mut doc, &["a"]);
        doc.set_attr(p, "id", "intro");
        assert_eq!(doc.element_by_id("intro"), Some(p));
        assert_eq!(doc.element_by_id("missing"), None);
    }
}

//! Block/inline flow layout over the arena DOM.
//!
//! Block elements stack vertically with per-tag margins and padding.
//! Text and inline elements flow along line boxes and wrap at the
//! containing block's width, one fixed advance per character. The result
//! is one [`Rect`] per node, indexed by `NodeId::index`.

use crate::dom::css::Display;
use crate::dom::{Document, NodeId, NodeKind};
use crate::render::Rect;

const ROOT_FONT_SIZE: f32 = 16.0;
const LINE_HEIGHT_FACTOR: f32 = 1.4;
const ADVANCE_FACTOR: f32 = 0.5;

/// Per-tag vertical margins (top, bottom) in pixels.
fn tag_margins(tag: &str) -> (f32, f32) {
    match tag {
        "h1" => (24.0, 16.0),
        "h2" => (20.0, 12.0),
        "h3" | "h4" => (16.0, 10.0),
        "h5" | "h6" => (12.0, 8.0),
        "p" => (4.0, 10.0),
        "ul" | "ol" => (8.0, 8.0),
        "li" => (2.0, 2.0),
        "section" | "article" | "main" => (16.0, 16.0),
        "nav" | "header" | "footer" => (12.0, 12.0),
        "blockquote" => (12.0, 12.0),
        "pre" => (8.0, 8.0),
        "hr" => (8.0, 8.0),
        _ => (0.0, 0.0),
    }
}

/// Per-tag padding in pixels.
fn tag_padding(tag: &str) -> f32 {
    match tag {
        "section" | "article" | "main" | "aside" => 16.0,
        "nav" | "header" | "footer" => 12.0,
        "blockquote" => 20.0,
        _ => 4.0,
    }
}

fn tag_font_size(tag: &str, parent_font_size: f32) -> f32 {
    match tag {
        "h1" => 32.0,
        "h2" => 24.0,
        "h3" => 20.0,
        "h4" => 18.0,
        "h5" | "h6" => 16.0,
        "small" => 12.0,
        _ => parent_font_size,
    }
}

/// Current line box state.
struct Flow {
    y: f32,
    line_x: f32,
    line_height: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            y: 0.0,
            line_x: 0.0,
            line_height: 0.0,
        }
    }

    /// Close the current line if anything was placed on it.
    fn break_line(&mut self) {
        if self.line_x > 0.0 || self.line_height > 0.0 {
            self.y += self.line_height;
        }
        self.line_x = 0.0;
        self.line_height = 0.0;
    }

    fn new_line(&mut self, line_height: f32) {
        self.y += self.line_height.max(line_height);
        self.line_x = 0.0;
        self.line_height = line_height;
    }

    /// Box spanning from a recorded start point to the current pen position.
    fn span_from(&self, start: (f32, f32), x: f32, width: f32, line_height: f32) -> Rect {
        let (start_x, start_y) = start;
        if self.y == start_y {
            Rect::new(
                x + start_x,
                start_y,
                self.line_x - start_x,
                self.line_height.max(line_height),
            )
        } else {
            Rect::new(
                x,
                start_y,
                width,
                self.y + self.line_height.max(line_height) - start_y,
            )
        }
    }
}

/// Compute layout boxes for every node in the document.
pub fn compute_layout(doc: &Document) -> Vec<Rect> {
    let mut rects = vec![Rect::default(); doc.node_count()];
    let (viewport_width, _) = doc.viewport();
    let mut flow = Flow::new();
    let root = doc.root();
    for &child in doc.children(root) {
        layout_node(doc, child, 0.0, viewport_width, ROOT_FONT_SIZE, &mut flow, &mut rects);
    }
    flow.break_line();
    rects[root.index()] = Rect::new(0.0, 0.0, viewport_width, flow.y);
    rects
}

fn layout_node(
    doc: &Document,
    id: NodeId,
    x: f32,
    width: f32,
    font_size: f32,
    flow: &mut Flow,
    rects: &mut [Rect],
) {
    match doc.kind(id) {
        NodeKind::Text(text) => {
            rects[id.index()] = layout_text(text, x, width, font_size, flow);
        }
        NodeKind::Comment(_) => {
            rects[id.index()] = Rect::new(x + flow.line_x, flow.y, 0.0, 0.0);
        }
        NodeKind::Document => {
            for &child in doc.children(id) {
                layout_node(doc, child, x, width, font_size, flow, rects);
            }
        }
        NodeKind::Element(el) => {
            let style = doc.computed_style(id);
            let font_size = style
                .font_size
                .unwrap_or_else(|| tag_font_size(&el.tag, font_size));
            match style.display {
                Display::None => {
                    let at = Rect::new(x + flow.line_x, flow.y, 0.0, 0.0);
                    for n in doc.descendants(id) {
                        rects[n.index()] = at;
                    }
                }
                Display::Block => {
                    let (margin_top, margin_bottom) = tag_margins(&el.tag);
                    let padding = tag_padding(&el.tag);

                    flow.break_line();
                    flow.y += margin_top;
                    let start_y = flow.y;
                    flow.y += padding;

                    let box_width = style.width.unwrap_or(width);
                    let child_x = x + padding;
                    let child_width = (box_width - padding * 2.0).max(0.0);
                    for &child in doc.children(id) {
                        layout_node(doc, child, child_x, child_width, font_size, flow, rects);
                    }
                    flow.break_line();
                    flow.y += padding;

                    let height = style.height.unwrap_or(flow.y - start_y);
                    rects[id.index()] = Rect::new(x, start_y, box_width, height);
                    flow.y = start_y + height + margin_bottom;
                }
                Display::Inline | Display::InlineBlock => {
                    let start = (flow.line_x, flow.y);
                    for &child in doc.children(id) {
                        layout_node(doc, child, x, width, font_size, flow, rects);
                    }
                    let line_height = font_size * LINE_HEIGHT_FACTOR;
                    rects[id.index()] = flow.span_from(start, x, width, line_height);
                }
            }
        }
    }
}

fn layout_text(text: &str, x: f32, width: f32, font_size: f32, flow: &mut Flow) -> Rect {
    // Whitespace at the start of a line collapses away.
    if flow.line_x == 0.0 && text.trim().is_empty() {
        return Rect::new(x, flow.y, 0.0, 0.0);
    }

    let advance = font_size * ADVANCE_FACTOR;
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    flow.line_height = flow.line_height.max(line_height);
    let start = (flow.line_x, flow.y);

    for _ in text.chars() {
        if flow.line_x + advance > width && flow.line_x > 0.0 {
            flow.new_line(line_height);
        }
        flow.line_x += advance;
    }
    flow.span_from(start, x, width, line_height)
}

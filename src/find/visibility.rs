use crate::dom::css::{Display, Visibility};
use crate::dom::{Document, NodeId};
use crate::render::Rect;

/// Whether a highlight node can be seen.
///
/// Two checks, both against the state of the last rendering update:
/// - no ancestor up to `<body>` is `display:none`, `visibility:hidden` or
///   fully transparent;
/// - the node's box, cut down by every box along its offset-parent chain,
///   is non-empty and lies inside the document's scroll extent.
pub fn is_element_visible(doc: &Document, node: NodeId) -> bool {
    if !is_rendered(doc, node) {
        return false;
    }

    let mut visible = doc.bounding_rect(node);
    if visible.is_empty() {
        return false;
    }

    let mut parent = doc.offset_parent(node);
    while let Some(p) = parent {
        visible = visible.intersect(&doc.bounding_rect(p));
        if visible.is_empty() {
            return false;
        }
        parent = doc.offset_parent(p);
    }

    within_document(&visible, doc.scroll_size())
}

/// Slack for float drift from repeated intersection.
const EDGE_TOLERANCE: f32 = 0.01;

/// `rect` starts at or after the origin and ends inside `size`.
fn within_document(rect: &Rect, size: (f32, f32)) -> bool {
    let (doc_width, doc_height) = size;
    rect.x >= 0.0
        && rect.y >= 0.0
        && rect.right() <= doc_width + EDGE_TOLERANCE
        && rect.bottom() <= doc_height + EDGE_TOLERANCE
}

/// Style half of the check. Detached nodes never reach `<body>` and are
/// reported as not rendered.
fn is_rendered(doc: &Document, node: NodeId) -> bool {
    let body = doc.body();
    let mut cur = Some(node);
    while let Some(id) = cur {
        if Some(id) == body {
            return true;
        }
        if doc.is_element(id) {
            let style = doc.computed_style(id);
            if style.display == Display::None
                || style.visibility == Visibility::Hidden
                || style.opacity <= 0.0
            {
                return false;
            }
        }
        cur = doc.parent(id);
    }
    false
}

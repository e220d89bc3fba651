use crate::dom::{Document, NodeId};
use scraper::{ElementRef, Html, Node};

/// Parsed page: the live document plus metadata from the source.
#[derive(Debug, Clone)]
pub struct DomTree {
    pub document: Document,
    pub url: String,
    pub title: String,
}

/// Parse raw HTML into an arena document sized for the given viewport.
///
/// Every element, text and comment node is kept. Whitespace-only text
/// nodes are real DOM nodes here and take part in find-in-page.
pub fn parse_html(html: &str, url: &str, viewport: (f32, f32)) -> DomTree {
    let parsed = Html::parse_document(html);

    // Extract <title>
    let title = scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| parsed.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let mut document = Document::new(viewport.0, viewport.1);
    let root = document.root();
    convert_element(parsed.root_element(), &mut document, root);

    log::debug!(
        "parsed {} ({} nodes, title {:?})",
        url,
        document.node_count(),
        title.trim()
    );

    DomTree {
        document,
        url: url.to_string(),
        title: title.trim().to_string(),
    }
}

fn convert_element(el: ElementRef<'_>, doc: &mut Document, parent: NodeId) {
    let node = doc.create_element(el.value().name());
    for (k, v) in el.value().attrs() {
        doc.set_attr(node, k, v);
    }
    doc.append_child(parent, node);

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    convert_element(child_el, doc, node);
                }
            }
            Node::Text(t) => {
                let text = doc.create_text(t.text.to_string());
                doc.append_child(node, text);
            }
            Node::Comment(c) => {
                let comment = doc.create_comment(c.comment.to_string());
                doc.append_child(node, comment);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: (f32, f32) = (1280.0, 800.0);

    #[test]
    fn parse_simple_html() {
        let html = r#"
        <html>
            <head><title>Test Page</title></head>
            <body>
                <h1>Hello, ALICE</h1>
                <p>Content paragraph</p>
            </body>
        </html>
        "#;

        let tree = parse_html(html, "https://example.com", VIEWPORT);
        assert_eq!(tree.title, "Test Page");
        assert!(tree.document.body().is_some());
        assert_eq!(tree.document.elements_by_tag("p").len(), 1);
    }

    #[test]
    fn keeps_text_nodes_split_by_markup() {
        let tree = parse_html("<p>c<b>at</b></p>", "about:blank", VIEWPORT);
        let doc = &tree.document;
        let p = doc.elements_by_tag("p")[0];
        assert_eq!(doc.children(p).len(), 2);
        assert!(doc.is_text(doc.children(p)[0]));
        assert_eq!(doc.text_content(p), "cat");
    }

    #[test]
    fn keeps_script_and_attributes() {
        let html = r#"<body><p class="a b">Visible</p><script>alert("hidden");</script></body>"#;
        let tree = parse_html(html, "about:blank", VIEWPORT);
        let doc = &tree.document;
        let p = doc.elements_by_tag("p")[0];
        assert!(doc.has_class(p, "b"));
        assert_eq!(doc.elements_by_tag("script").len(), 1);
        assert_eq!(doc.outer_html(p), r#"<p class="a b">Visible</p>"#);
    }
}

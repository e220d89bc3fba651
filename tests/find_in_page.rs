use std::time::Duration;

use alice_find::dom::css::parse_css_color;
use alice_find::engine::pipeline::{FindEngine, Page};
use alice_find::find::{FindStatus, HIGHLIGHT_TAG, MATCH_CLASS, SELECTED_CLASS};

const BIG: Duration = Duration::from_secs(10);

fn load(html: &str) -> Page {
    FindEngine::new(800.0)
        .with_viewport_height(600.0)
        .with_timeout(BIG)
        .process_html(html, "about:blank", 200)
        .unwrap()
}

fn search(page: &mut Page, phrase: &str) -> FindStatus {
    let first = page.find_string(phrase);
    page.finish_search(first).0
}

#[test]
fn three_matches_in_one_text_node() {
    let mut page = load("<p>the cat sat on the mat</p>");
    assert_eq!(search(&mut page, "at"), FindStatus::Complete(3));
    let matches = page.find().matches();
    assert_eq!(matches.len(), 3);
    assert!(matches.iter().all(|m| m.nodes.len() == 1));
    let texts: Vec<String> = matches.iter().map(|m| m.text(page.document())).collect();
    assert_eq!(texts, ["at", "at", "at"]);
}

#[test]
fn match_across_split_text_nodes() {
    let mut page = load("<p>c<b>at</b></p>");
    assert_eq!(search(&mut page, "cat"), FindStatus::Complete(1));
    let m = &page.find().matches()[0];
    assert_eq!(m.nodes.len(), 2);
    assert_eq!(m.text(page.document()), "cat");
}

#[test]
fn empty_phrase_leaves_page_untouched() {
    let mut page = load("<p>the cat</p>");
    let before = page.html();
    assert_eq!(page.find_string(""), FindStatus::Complete(0));
    assert!(page.find().sections().is_empty());
    assert!(page.find().replacements().is_empty());
    assert_eq!(page.html(), before);
}

#[test]
fn hidden_matches_count_toward_total_only() {
    let mut page = load(r#"<p>cat</p><div style="display:none"><p>cat</p></div>"#);
    assert_eq!(search(&mut page, "cat"), FindStatus::Complete(1));
    assert_eq!(page.find().match_count(), 2);
}

#[test]
fn stylesheet_hidden_matches_are_not_visible() {
    let mut page = load(
        "<html><head><style>.gone { visibility: hidden; }</style></head>\
         <body><p>cat</p><p class=\"gone\">cat</p></body></html>",
    );
    assert_eq!(search(&mut page, "cat"), FindStatus::Complete(1));
    assert_eq!(page.find().match_count(), 2);
}

#[test]
fn stop_removes_style_and_wrappers() {
    let mut page = load("<p>the cat sat</p>");
    search(&mut page, "cat");
    assert_eq!(page.document().elements_by_tag("style").len(), 1);

    page.stop();
    let doc = page.document();
    assert!(doc.elements_by_tag("style").is_empty());
    assert!(doc.elements_by_tag(HIGHLIGHT_TAG).is_empty());
}

#[test]
fn stop_restores_original_nodes_in_order() {
    let mut page = load("<div><p>Cat one</p>two <i>CAT</i> three<p>ca</p>t</div>");
    let before = page.html();
    let body = page.document().body().unwrap();
    let nodes_before = page.document().descendants(body);

    search(&mut page, "cat");
    assert_ne!(page.html(), before);

    page.stop();
    assert_eq!(page.html(), before);
    assert_eq!(page.document().descendants(body), nodes_before);
}

#[test]
fn wrappers_cover_exactly_the_phrase() {
    let mut page = load("<p>Tomato TOMATO toMAto</p><p>tom<em>ato</em></p>");
    assert_eq!(search(&mut page, "tomato"), FindStatus::Complete(4));
    let doc = page.document();
    for m in page.find().matches() {
        assert_eq!(m.text(doc).to_lowercase(), "tomato");
        for &node in &m.nodes {
            assert_eq!(doc.tag_name(node), Some(HIGHLIGHT_TAG));
            assert!(doc.has_class(node, MATCH_CLASS));
        }
    }
}

#[test]
fn sections_tile_the_buffer() {
    let mut page = load("<p>one</p><p>two <b>three</b></p><script>var x = 1;</script>");
    search(&mut page, "o");
    let sections = page.find().sections();
    assert!(!sections.is_empty());
    assert_eq!(sections[0].begin, 0);
    for pair in sections.windows(2) {
        assert_eq!(pair[0].end, pair[1].begin);
    }
    let last = sections[sections.len() - 1];
    assert_eq!(last.end, page.find().all_text().len());
    assert!(!page.find().all_text().contains("var x"));
}

#[test]
fn sliced_search_matches_single_pass() {
    let html = "<p>cat one</p><p>c<b>a</b>t two</p><div><p>the cat, the CAT</p></div>";

    let mut whole = load(html);
    let whole_status = whole.find_string_with_timeout("cat", BIG);

    let mut sliced = load(html);
    let mut status = sliced.find_string_with_timeout("cat", Duration::ZERO);
    let mut pumps = 0;
    while status.is_pending() {
        pumps += 1;
        assert!(pumps < 10_000);
        status = sliced.pump_search_with_timeout(Duration::ZERO);
    }

    assert!(pumps > 0);
    assert_eq!(status, whole_status);
    assert_eq!(status, FindStatus::Complete(4));
    assert_eq!(sliced.html(), whole.html());
    assert_eq!(sliced.find().match_count(), whole.find().match_count());
}

#[test]
fn regex_metacharacters_are_literal() {
    let mut page = load("<p>a.b (c) [d]</p><p>axb c d</p>");
    assert_eq!(search(&mut page, "a.b (c) [d]"), FindStatus::Complete(1));
    assert_eq!(search(&mut page, "$"), FindStatus::Complete(0));
    assert_eq!(search(&mut page, "(c)"), FindStatus::Complete(1));
}

#[test]
fn selecting_far_match_scrolls_to_it() {
    let filler = "<p>filler line</p>".repeat(200);
    let mut page = load(&format!("<p>needle</p>{}<p>needle</p>", filler));
    assert_eq!(search(&mut page, "needle"), FindStatus::Complete(2));

    let sel = page.select_and_scroll_to_visible_match(1);
    assert_eq!(sel.index, Some(1));
    assert_eq!(sel.matches, 2);
    assert!(page.document().scroll_offset().1 > 0.0);

    page.select_and_scroll_to_visible_match(0);
    assert_eq!(page.document().scroll_offset().1, 0.0);
}

#[test]
fn selected_wrapper_uses_selected_color() {
    let mut page = load("<p>cat and cat</p>");
    search(&mut page, "cat");
    page.select_and_scroll_to_visible_match(1);

    let doc = page.document();
    let matches = page.find().matches();
    let selected = matches[1].nodes[0];
    let other = matches[0].nodes[0];
    assert!(doc.has_class(selected, SELECTED_CLASS));
    assert_eq!(
        doc.computed_style(selected).background_color,
        parse_css_color("#ff9632")
    );
    assert_eq!(
        doc.computed_style(other).background_color,
        parse_css_color("#ffff00")
    );
}

#[test]
fn status_converts_to_raw_values() {
    let mut page = load("<p>cat</p>");
    let status = page.find_string_with_timeout("cat", Duration::ZERO);
    assert_eq!(i32::from(status), -1);
    let (done, _) = page.finish_search(status);
    assert_eq!(i32::from(done), 1);
}

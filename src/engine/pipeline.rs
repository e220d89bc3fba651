use std::time::Duration;

use crate::dom::parser::{parse_html, DomTree};
use crate::dom::Document;
use crate::find::{FindInPageSession, FindOptions, FindStatus, MatchSelection};
use crate::net::fetch::load_source;

/// A loaded page and the find-in-page session bound to it.
#[derive(Debug)]
pub struct Page {
    pub dom: DomTree,
    pub fetch_status: u16,
    find: FindInPageSession,
}

impl Page {
    pub fn document(&self) -> &Document {
        &self.dom.document
    }

    /// Mutable access for callers that change the page between pumps.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.dom.document
    }

    pub fn find(&self) -> &FindInPageSession {
        &self.find
    }

    /// Start a search with the engine's default time budget.
    pub fn find_string(&mut self, phrase: &str) -> FindStatus {
        let timeout = self.find.options().timeout;
        self.find_string_with_timeout(phrase, timeout)
    }

    pub fn find_string_with_timeout(&mut self, phrase: &str, timeout: Duration) -> FindStatus {
        self.find
            .find_string(&mut self.dom.document, phrase, timeout)
    }

    pub fn pump_search(&mut self) -> FindStatus {
        let timeout = self.find.options().timeout;
        self.pump_search_with_timeout(timeout)
    }

    pub fn pump_search_with_timeout(&mut self, timeout: Duration) -> FindStatus {
        self.find.pump_search(&mut self.dom.document, timeout)
    }

    /// Keep pumping until the search finishes. Returns the final status
    /// and how many extra pumps it took.
    pub fn finish_search(&mut self, first: FindStatus) -> (FindStatus, usize) {
        let mut status = first;
        let mut pumps = 0;
        while status.is_pending() {
            status = self.pump_search();
            pumps += 1;
        }
        (status, pumps)
    }

    pub fn select_and_scroll_to_visible_match(&mut self, index: isize) -> MatchSelection {
        self.find
            .select_and_scroll_to_visible_match(&mut self.dom.document, index)
    }

    pub fn stop(&mut self) {
        self.find.stop(&mut self.dom.document);
    }

    /// Serialized document, highlights included.
    pub fn html(&self) -> String {
        let doc = &self.dom.document;
        doc.outer_html(doc.root())
    }
}

/// Error during page loading
#[derive(Debug)]
pub struct PageError {
    pub message: String,
    pub phase: &'static str,
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for PageError {}

/// Page pipeline: Fetch → Parse → Layout, then find-in-page on demand.
pub struct FindEngine {
    viewport_width: f32,
    viewport_height: f32,
    options: FindOptions,
}

impl FindEngine {
    pub fn new(viewport_width: f32) -> Self {
        Self {
            viewport_width,
            viewport_height: 800.0,
            options: FindOptions::default(),
        }
    }

    pub fn with_viewport_height(mut self, height: f32) -> Self {
        self.viewport_height = height;
        self
    }

    /// Time budget per `find_string` / `pump_search` call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    pub fn with_max_visible(mut self, max_visible: usize) -> Self {
        self.options.max_visible = max_visible;
        self
    }

    /// Load a local file or URL through the full pipeline
    pub fn load_page(&self, source: &str) -> Result<Page, PageError> {
        let fetch_result = load_source(source).map_err(|e| PageError {
            message: e.message,
            phase: "fetch",
        })?;

        if !(200..300).contains(&fetch_result.status) {
            log::warn!("{} answered {}", fetch_result.url, fetch_result.status);
        }

        self.process_html(&fetch_result.html, &fetch_result.url, fetch_result.status)
    }

    /// Process raw HTML through the pipeline (for testing)
    pub fn process_html(&self, html: &str, url: &str, status: u16) -> Result<Page, PageError> {
        // Phase 1: Parse
        let mut dom = parse_html(html, url, (self.viewport_width, self.viewport_height));
        if dom.document.body().is_none() {
            return Err(PageError {
                message: format!("{} has no <body>", url),
                phase: "parse",
            });
        }

        // Phase 2: Style + Layout
        dom.document.update_rendering();

        Ok(Page {
            dom,
            fetch_status: status,
            find: FindInPageSession::new(self.options.clone()),
        })
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_html_lays_out_the_page() {
        let engine = FindEngine::new(1024.0).with_viewport_height(700.0);
        let page = engine
            .process_html("<p>hello</p>", "about:blank", 200)
            .unwrap();
        let doc = page.document();
        assert_eq!(doc.viewport(), (1024.0, 700.0));
        assert!(!doc.needs_rendering_update());
        let p = doc.elements_by_tag("p")[0];
        assert!(!doc.bounding_rect(p).is_empty());
    }

    #[test]
    fn page_search_round_trip() {
        let engine = FindEngine::new(1024.0).with_timeout(Duration::from_secs(5));
        let mut page = engine
            .process_html("<p>Alpha beta ALPHA</p>", "about:blank", 200)
            .unwrap();
        let original = page.html();

        let first = page.find_string("alpha");
        let (status, _) = page.finish_search(first);
        assert_eq!(status, FindStatus::Complete(2));
        assert_ne!(page.html(), original);

        page.stop();
        assert_eq!(page.html(), original);
    }

    #[test]
    fn max_visible_caps_the_count() {
        let engine = FindEngine::new(1024.0)
            .with_timeout(Duration::from_secs(5))
            .with_max_visible(2);
        let mut page = engine
            .process_html("<p>cat cat cat cat cat</p>", "about:blank", 200)
            .unwrap();
        let first = page.find_string("cat");
        let (status, _) = page.finish_search(first);
        assert_eq!(status, FindStatus::Complete(3));
        assert_eq!(page.find().match_count(), 5);
    }

    #[test]
    fn viewport_width_applies_to_later_pages() {
        let mut engine = FindEngine::new(1024.0);
        engine.set_viewport_width(640.0);
        let page = engine
            .process_html("<p>hello</p>", "about:blank", 200)
            .unwrap();
        assert_eq!(page.document().viewport(), (640.0, 800.0));
    }

    #[test]
    fn invalid_source_is_a_fetch_error() {
        let engine = FindEngine::new(800.0);
        let err = engine.load_page("not a url at all ::").unwrap_err();
        assert_eq!(err.phase, "fetch");
    }
}

//! Find-in-page session: the resumable search state machine plus match
//! selection.
//!
//! One session belongs to one document. All state from a search (buffer,
//! sections, matches, planned and applied replacements, cursors) lives
//! here and is dropped by [`FindInPageSession::clean_up`], which also
//! undoes every highlight.

use std::time::Duration;

use crate::dom::{Document, NodeId};
use crate::find::index::{Section, TextIndex};
use crate::find::pattern::literal_pattern;
use crate::find::replace::Replacement;
use crate::find::scan::{Match, Scanner};
use crate::find::{Progress, Timer, HIGHLIGHT_CSS, MAX_VISIBLE_ELEMENTS, TIMEOUT};

/// Result of `find_string` / `pump_search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindStatus {
    /// The time budget ran out; call `pump_search` again.
    Pending,
    /// Search finished with this many visible matches.
    Complete(usize),
}

impl FindStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, FindStatus::Pending)
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            FindStatus::Pending => None,
            FindStatus::Complete(n) => Some(*n),
        }
    }
}

impl From<FindStatus> for i32 {
    fn from(status: FindStatus) -> i32 {
        match status {
            FindStatus::Pending => TIMEOUT,
            FindStatus::Complete(n) => i32::try_from(n).unwrap_or(i32::MAX),
        }
    }
}

/// Result of selecting a visible match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSelection {
    /// Visible match count after the selection.
    pub matches: usize,
    /// Selected visible match, if any.
    pub index: Option<usize>,
    /// Text before, inside and after the selected match, for announcing
    /// the selection. Only set when a match was actually selected.
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing highlighted, nothing to undo.
    Clean,
    /// A search is in progress and needs pumping.
    Searching,
    /// Search finished; highlights are in the document.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Index,
    Scan,
    Highlight,
    Count,
}

#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Budget used by callers that do not pass one explicitly.
    pub timeout: Duration,
    /// Visible-count cap; counting stops increasing past this.
    pub max_visible: usize,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(100),
            max_visible: MAX_VISIBLE_ELEMENTS,
        }
    }
}

#[derive(Debug)]
pub struct FindInPageSession {
    options: FindOptions,
    state: SessionState,
    phase: Phase,
    index: TextIndex,
    scanner: Option<Scanner>,
    matches: Vec<Match>,
    replacements: Vec<Replacement>,
    replacements_index: usize,
    visible_index: usize,
    visible_count: usize,
    selected_match: Option<usize>,
    selected_visible: Option<usize>,
    style_element: Option<NodeId>,
}

impl Default for FindInPageSession {
    fn default() -> Self {
        Self::new(FindOptions::default())
    }
}

impl FindInPageSession {
    pub fn new(options: FindOptions) -> Self {
        Self {
            options,
            state: SessionState::Clean,
            phase: Phase::Index,
            index: TextIndex::new(),
            scanner: None,
            matches: Vec::new(),
            replacements: Vec::new(),
            replacements_index: 0,
            visible_index: 0,
            visible_count: 0,
            selected_match: None,
            selected_visible: None,
            style_element: None,
        }
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_searching(&self) -> bool {
        self.state == SessionState::Searching
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn visible_match_count(&self) -> usize {
        self.visible_count
    }

    pub fn selected_visible_index(&self) -> Option<usize> {
        self.selected_visible
    }

    pub fn sections(&self) -> &[Section] {
        self.index.sections()
    }

    pub fn all_text(&self) -> &str {
        self.index.all_text()
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    pub fn highlight_style(&self) -> Option<NodeId> {
        self.style_element
    }

    /// Start searching for `phrase`, undoing any previous search first.
    /// An empty phrase completes immediately with no matches.
    pub fn find_string(&mut self, doc: &mut Document, phrase: &str, timeout: Duration) -> FindStatus {
        if self.state != SessionState::Clean {
            self.clean_up(doc);
        }
        let Some(pattern) = literal_pattern(phrase) else {
            return FindStatus::Complete(0);
        };

        self.enable_highlight_style(doc);
        let start = doc.body().unwrap_or_else(|| doc.root());
        self.index.seed(start);
        self.scanner = Some(Scanner::new(pattern));
        self.phase = Phase::Index;
        self.state = SessionState::Searching;
        log::info!("find started ({} chars)", phrase.chars().count());

        self.pump_search(doc, timeout)
    }

    /// Continue the current search for at most `timeout`. Returns
    /// `Complete(0)` when no search is running.
    pub fn pump_search(&mut self, doc: &mut Document, timeout: Duration) -> FindStatus {
        if self.state != SessionState::Searching {
            return FindStatus::Complete(0);
        }
        let timer = Timer::new(timeout);

        loop {
            match self.phase {
                Phase::Index => {
                    if self.index.build(doc, &timer) == Progress::TimedOut {
                        return FindStatus::Pending;
                    }
                    log::debug!(
                        "indexed {} sections, {} bytes",
                        self.index.sections().len(),
                        self.index.all_text().len()
                    );
                    self.phase = Phase::Scan;
                }
                Phase::Scan => {
                    let Some(scanner) = self.scanner.as_mut() else {
                        self.phase = Phase::Highlight;
                        continue;
                    };
                    let progress = scanner.scan(
                        doc,
                        &self.index,
                        &mut self.matches,
                        &mut self.replacements,
                        &timer,
                    );
                    if progress == Progress::TimedOut {
                        return FindStatus::Pending;
                    }
                    log::debug!(
                        "{} matches across {} text nodes",
                        self.matches.len(),
                        self.replacements.len()
                    );
                    self.phase = Phase::Highlight;
                }
                Phase::Highlight => {
                    if self.apply_replacements(doc, &timer) == Progress::TimedOut {
                        return FindStatus::Pending;
                    }
                    self.visible_index = 0;
                    self.visible_count = 0;
                    self.phase = Phase::Count;
                }
                Phase::Count => {
                    doc.update_rendering();
                    if self.count_visible_matches(doc, &timer) == Progress::TimedOut {
                        return FindStatus::Pending;
                    }
                    self.state = SessionState::Idle;
                    log::info!(
                        "find complete: {} matches, {} visible",
                        self.matches.len(),
                        self.visible_count
                    );
                    return FindStatus::Complete(self.visible_count);
                }
            }
        }
    }

    fn apply_replacements(&mut self, doc: &mut Document, timer: &Timer) -> Progress {
        while let Some(replacement) = self.replacements.get_mut(self.replacements_index) {
            replacement.materialize(doc, &mut self.matches);
            replacement.do_swap(doc);
            self.replacements_index += 1;
            if timer.overtime() {
                log::debug!(
                    "highlighting paused at {}/{}",
                    self.replacements_index,
                    self.replacements.len()
                );
                return Progress::TimedOut;
            }
        }
        Progress::Complete
    }

    /// Count visible matches from the saved cursor. The count stops
    /// increasing once it exceeds `max_visible`, but the walk still runs
    /// to the end of the match list.
    fn count_visible_matches(&mut self, doc: &Document, timer: &Timer) -> Progress {
        while let Some(m) = self.matches.get(self.visible_index) {
            if self.visible_count <= self.options.max_visible && m.is_visible(doc) {
                self.visible_count += 1;
            }
            self.visible_index += 1;
            if timer.overtime() {
                return Progress::TimedOut;
            }
        }
        Progress::Complete
    }

    fn recount_visible_matches(&mut self, doc: &mut Document) {
        doc.update_rendering();
        self.visible_index = 0;
        self.visible_count = 0;
        self.count_visible_matches(doc, &Timer::unbounded());
    }

    /// Select the `index`-th visible match, highlight it as selected and
    /// scroll it into view.
    ///
    /// An `index` outside the last known visible count changes nothing.
    /// If the page changed and `index` no longer exists after recounting,
    /// selection wraps to the first visible match when moving forward and
    /// to the last when moving backward.
    pub fn select_and_scroll_to_visible_match(
        &mut self,
        doc: &mut Document,
        index: isize,
    ) -> MatchSelection {
        let unchanged = MatchSelection {
            matches: self.visible_count,
            index: self.selected_visible,
            context: None,
        };
        let Ok(mut index) = usize::try_from(index) else {
            return unchanged;
        };
        if index >= self.visible_count {
            return unchanged;
        }

        if let Some(prev) = self.selected_match.and_then(|i| self.matches.get(i)) {
            prev.remove_select_highlight(doc);
        }
        self.recount_visible_matches(doc);

        if self.visible_count == 0 {
            self.selected_match = None;
            self.selected_visible = None;
            return MatchSelection {
                matches: 0,
                index: None,
                context: None,
            };
        }
        if index >= self.visible_count {
            let forward = self.selected_visible.map_or(true, |prev| index > prev);
            index = if forward { 0 } else { self.visible_count - 1 };
        }

        let view: &Document = doc;
        let target = self
            .matches
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_visible(view))
            .nth(index)
            .map(|(i, _)| i);

        let Some(match_index) = target else {
            return MatchSelection {
                matches: self.visible_count,
                index: self.selected_visible,
                context: None,
            };
        };

        let selected = &self.matches[match_index];
        selected.add_select_highlight(doc);
        if let Some(first) = selected.first_node() {
            doc.scroll_into_view(first);
        }
        let context = context_string(doc, selected);
        self.selected_match = Some(match_index);
        self.selected_visible = Some(index);
        log::debug!("selected visible match {} (match {})", index, match_index);

        MatchSelection {
            matches: self.visible_count,
            index: Some(index),
            context: Some(context),
        }
    }

    /// Undo every highlight and forget the search. The injected stylesheet
    /// stays until [`stop`](Self::stop).
    pub fn clean_up(&mut self, doc: &mut Document) {
        for replacement in &self.replacements {
            replacement.undo_swap(doc);
        }
        log::debug!("cleaned up {} replacements", self.replacements.len());

        self.index.clear();
        self.scanner = None;
        self.matches.clear();
        self.replacements.clear();
        self.replacements_index = 0;
        self.visible_index = 0;
        self.visible_count = 0;
        self.selected_match = None;
        self.selected_visible = None;
        self.phase = Phase::Index;
        self.state = SessionState::Clean;
    }

    /// Cancel any search, undo all highlights and remove the injected
    /// stylesheet.
    pub fn stop(&mut self, doc: &mut Document) {
        self.clean_up(doc);
        if let Some(style) = self.style_element.take() {
            if let Some(parent) = doc.parent(style) {
                doc.remove_child(parent, style);
            }
        }
    }

    fn enable_highlight_style(&mut self, doc: &mut Document) {
        if self.style_element.is_some_and(|s| doc.is_connected(s)) {
            return;
        }
        let Some(parent) = doc
            .head()
            .or_else(|| doc.body())
            .or_else(|| doc.document_element())
        else {
            return;
        };
        let style = doc.create_element("style");
        let css = doc.create_text(HIGHLIGHT_CSS);
        doc.append_child(style, css);
        doc.append_child(parent, style);
        self.style_element = Some(style);
    }
}

/// Sibling text before the match, the match's own text, sibling text after.
fn context_string(doc: &Document, m: &Match) -> String {
    let mut context = String::new();
    if let Some(prev) = m.first_node().and_then(|n| doc.previous_sibling(n)) {
        context.push_str(&doc.text_content(prev));
    }
    context.push_str(&m.text(doc));
    if let Some(next) = m.last_node().and_then(|n| doc.next_sibling(n)) {
        context.push_str(&doc.text_content(next));
    }
    context
}

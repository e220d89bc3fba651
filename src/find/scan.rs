//! Pattern scan over the flattened buffer.
//!
//! Matches are found in increasing buffer order, so the section cursor
//! only ever moves forward. Each match is cut into [`PartialMatch`]es, one
//! per section it touches; when the cursor leaves a section its pending
//! partial matches are resolved into a planned [`Replacement`].

use regex::Regex;

use crate::dom::{Document, NodeId};
use crate::find::index::{Section, TextIndex};
use crate::find::replace::{Fragment, Replacement};
use crate::find::visibility::is_element_visible;
use crate::find::{Progress, Timer, SELECTED_CLASS};

/// One occurrence of the phrase. `nodes` holds its highlight wrappers, in
/// document order, once the highlight phase has created them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    pub nodes: Vec<NodeId>,
}

impl Match {
    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Visible only when every wrapper is.
    pub fn is_visible(&self, doc: &Document) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().all(|&n| is_element_visible(doc, n))
    }

    pub fn add_select_highlight(&self, doc: &mut Document) {
        for &n in &self.nodes {
            doc.add_class(n, SELECTED_CLASS);
        }
    }

    pub fn remove_select_highlight(&self, doc: &mut Document) {
        for &n in &self.nodes {
            doc.remove_class(n, SELECTED_CLASS);
        }
    }

    /// Text currently under the match's wrappers.
    pub fn text(&self, doc: &Document) -> String {
        self.nodes.iter().map(|&n| doc.text_content(n)).collect()
    }
}

/// The part of match `match_id` inside a single section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialMatch {
    pub match_id: usize,
    pub begin: usize,
    pub end: usize,
}

/// Resumable scan state for one search phrase.
#[derive(Debug)]
pub struct Scanner {
    pattern: Regex,
    last_index: usize,
    sections_index: usize,
    partial_matches: Vec<PartialMatch>,
}

impl Scanner {
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            last_index: 0,
            sections_index: 0,
            partial_matches: Vec::new(),
        }
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Scan from where the previous call stopped. Every match found is
    /// appended to `matches`; every section it touches ends up as one
    /// entry in `replacements`.
    pub fn scan(
        &mut self,
        doc: &Document,
        index: &TextIndex,
        matches: &mut Vec<Match>,
        replacements: &mut Vec<Replacement>,
        timer: &Timer,
    ) -> Progress {
        let text = index.all_text();
        let sections = index.sections();

        while let Some(found) = self.pattern.find_at(text, self.last_index) {
            if found.is_empty() {
                break;
            }
            self.last_index = found.end();

            let match_id = matches.len();
            matches.push(Match::default());
            log::trace!("match {} at {}..{}", match_id, found.start(), found.end());
            self.place(doc, sections, match_id, found.start(), found.end(), replacements);

            if timer.overtime() {
                log::debug!("scan paused after {} matches", matches.len());
                return Progress::TimedOut;
            }
        }

        self.last_index = text.len();
        self.flush(doc, sections, replacements);
        Progress::Complete
    }

    fn place(
        &mut self,
        doc: &Document,
        sections: &[Section],
        match_id: usize,
        begin: usize,
        end: usize,
        replacements: &mut Vec<Replacement>,
    ) {
        let first = first_section_ending_after(sections, self.sections_index, begin);
        if first != self.sections_index {
            self.flush(doc, sections, replacements);
            self.sections_index = first;
        }

        while let Some(section) = sections.get(self.sections_index) {
            let b = begin.max(section.begin);
            let e = end.min(section.end);
            if b < e {
                self.partial_matches.push(PartialMatch {
                    match_id,
                    begin: b,
                    end: e,
                });
            }
            if end > section.end {
                self.flush(doc, sections, replacements);
                self.sections_index += 1;
            } else {
                break;
            }
        }
    }

    fn flush(&mut self, doc: &Document, sections: &[Section], replacements: &mut Vec<Replacement>) {
        if self.partial_matches.is_empty() {
            return;
        }
        let partials = std::mem::take(&mut self.partial_matches);
        let Some(section) = sections.get(self.sections_index) else {
            return;
        };
        match resolve_section(doc, section, &partials) {
            Some(replacement) => replacements.push(replacement),
            None => log::warn!(
                "text node {:?} changed during search; {} partial matches dropped",
                section.node,
                partials.len()
            ),
        }
    }
}

/// Index of the first section at or after `from` whose end lies past
/// `offset`. Sections are sorted, so this is a binary search.
pub fn first_section_ending_after(sections: &[Section], from: usize, offset: usize) -> usize {
    let from = from.min(sections.len());
    from + sections[from..].partition_point(|s| s.end <= offset)
}

/// Plan the rewrite of one section's text node: plain text between and
/// around the partial matches, one highlight fragment per partial match.
/// Text is taken from the node itself so the original case survives.
/// Returns `None` when the node no longer holds the indexed text.
pub fn resolve_section(
    doc: &Document,
    section: &Section,
    partials: &[PartialMatch],
) -> Option<Replacement> {
    let text = doc.text(section.node)?;
    if text.len() != section.len() {
        return None;
    }
    let slice = |b: usize, e: usize| text.get(b - section.begin..e - section.begin);

    let mut fragments = Vec::with_capacity(partials.len() * 2 + 1);
    let mut cursor = section.begin;
    for pm in partials {
        if pm.begin > cursor {
            fragments.push(Fragment::plain(slice(cursor, pm.begin)?));
        }
        fragments.push(Fragment::highlight(pm.match_id, slice(pm.begin, pm.end)?));
        cursor = pm.end;
    }
    if cursor < section.end {
        fragments.push(Fragment::plain(slice(cursor, section.end)?));
    }
    Some(Replacement::new(section.node, fragments))
}

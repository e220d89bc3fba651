//! Incremental find-in-page.
//!
//! A search runs in four resumable phases over a live [`Document`]:
//!
//! 1. **Index**: flatten text nodes into one case-folded buffer with a
//!    [`Section`] per node ([`index`]).
//! 2. **Scan**: run the literal pattern over the buffer and plan one
//!    [`Replacement`] per touched text node ([`scan`]). Read-only.
//! 3. **Highlight**: materialize the planned nodes and swap them into the
//!    tree ([`replace`]). The only phase that mutates the document.
//! 4. **Count**: count matches whose highlight nodes are all visible
//!    ([`visibility`]).
//!
//! Each phase checks a [`Timer`] after every unit of work and hands back
//! [`FindStatus::Pending`] when the budget is spent; the host calls
//! [`FindInPageSession::pump_search`] again to continue.
//!
//! [`Document`]: crate::dom::Document

pub mod index;
pub mod pattern;
pub mod replace;
pub mod scan;
pub mod session;
pub mod timer;
pub mod visibility;

pub use index::{Section, TextIndex, IGNORED_TAGS};
pub use pattern::escape_regex_metachars;
pub use replace::{Fragment, Replacement};
pub use scan::{Match, PartialMatch, Scanner};
pub use session::{FindInPageSession, FindOptions, FindStatus, MatchSelection, SessionState};
pub use timer::Timer;

/// Raw status value meaning "budget exhausted, pump again".
pub const TIMEOUT: i32 = -1;

/// Visible matches counted before the counter stops increasing.
pub const MAX_VISIBLE_ELEMENTS: usize = 100;

/// Tag of the wrapper element inserted around every highlighted span.
pub const HIGHLIGHT_TAG: &str = "alice-find";

/// Class carried by every highlight wrapper.
pub const MATCH_CLASS: &str = "alice-find-match";

/// Class added to the wrappers of the currently selected match.
pub const SELECTED_CLASS: &str = "alice-find-selected";

/// Stylesheet injected while a session is active.
pub const HIGHLIGHT_CSS: &str = "\
alice-find.alice-find-match { background-color: #ffff00 !important; color: #000000 !important; display: inline; }
alice-find.alice-find-selected { background-color: #ff9632 !important; }
";

/// Outcome of one bounded slice of phase work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Complete,
    TimedOut,
}

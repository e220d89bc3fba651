//! Literal phrase matching.
//!
//! User input is always searched for literally: every regex metacharacter
//! is escaped before the pattern is compiled case-insensitively.

use regex::{Regex, RegexBuilder};

/// Backslash-escape every regex metacharacter in `phrase`.
pub fn escape_regex_metachars(phrase: &str) -> String {
    regex::escape(phrase)
}

/// Case-insensitive regex matching `phrase` literally. `None` for an empty
/// phrase or one too large to compile.
pub fn literal_pattern(phrase: &str) -> Option<Regex> {
    if phrase.is_empty() {
        return None;
    }
    match RegexBuilder::new(&escape_regex_metachars(phrase))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("cannot compile search phrase ({} bytes): {}", phrase.len(), e);
            None
        }
    }
}

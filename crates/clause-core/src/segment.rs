//! Clause classification and splitting for a single text leaf.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that end a clause.
pub const CLAUSE_DELIMITERS: [char; 6] = [':', ';', '!', ',', '?', '.'];

// A delimiter, the whitespace run after it, and the letter that anchors the
// break. Only the whitespace run is dropped when splitting.
static RE_CLAUSE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.?!;:,](\s+)[A-Za-z]").expect("clause break pattern"));

/// How a leaf's text is to be tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafClass {
    /// Letters but no delimiter: wrapped whole, possibly sharing a tag with
    /// consecutive leaves of the same class.
    DelimiterFree,
    /// Letters and at least one delimiter: split into clauses.
    Splittable,
    /// No ASCII letter at all: left alone.
    NoLetters,
}

pub fn has_delimiter(text: &str) -> bool {
    text.contains(CLAUSE_DELIMITERS)
}

pub fn has_letter(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_alphabetic())
}

pub fn classify(text: &str) -> LeafClass {
    if !has_letter(text) {
        LeafClass::NoLetters
    } else if has_delimiter(text) {
        LeafClass::Splittable
    } else {
        LeafClass::DelimiterFree
    }
}

/// Split `text` after every delimiter that is followed by whitespace and then
/// a letter. The whitespace run between two clauses is dropped; everything
/// else is kept verbatim.
pub fn split_clauses(text: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut start = 0usize;
    for caps in RE_CLAUSE_BREAK.captures_iter(text) {
        let Some(gap) = caps.get(1) else {
            continue;
        };
        clauses.push(&text[start..gap.start()]);
        start = gap.end();
    }
    clauses.push(&text[start..]);
    clauses
}

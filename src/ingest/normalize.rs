//! Collapse extraction artifacts into a single-line representation.

use regex::Regex;
use std::sync::LazyLock;

static NEWLINE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("static regex compile"));

/// Text with interior newline runs collapsed to single spaces and outer whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Borrow the normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when extraction produced nothing worth summarizing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of whitespace-delimited words.
    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

/// Normalize raw extracted text.
///
/// Every run of one or more newline characters becomes a single space, then leading and
/// trailing whitespace is removed. Other whitespace is left untouched.
pub fn normalize(raw: &str) -> NormalizedText {
    let collapsed = NEWLINE_RUNS.replace_all(raw, " ");
    NormalizedText(collapsed.trim().to_string())
}

//! Sentence boundary detection.
//!
//! The pipeline only depends on [`SentenceSegmenter`]; it never inspects how boundaries were
//! chosen, only the order of the returned sentences. [`RuleBasedSegmenter`] is the default
//! implementation: a punctuation-driven splitter that knows about common abbreviations and
//! single-letter initials.

/// Splits normalized text into an ordered sequence of sentences.
pub trait SentenceSegmenter: Send + Sync {
    /// Return the sentences of `text` in order. Must be deterministic for identical input.
    fn segment(&self, text: &str) -> Vec<String>;
}

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "e.g", "i.e", "cf",
    "art", "arts", "sec", "secs", "cl", "para", "paras", "ch", "fig", "vol", "pp",
    "ed", "eds", "co", "corp", "inc", "ltd", "dept", "govt", "hon", "approx", "est", "u.s",
    "u.k", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Punctuation-driven sentence splitter.
///
/// A boundary follows `.`, `!`, or `?` (plus any trailing closing quotes or brackets) when the
/// next non-space character starts a sentence: an uppercase letter, a digit, or an opening
/// quote or bracket. A period after a known abbreviation does not end a sentence, nor does one
/// after an uppercase initial that opens the sentence or follows a capitalized word or another
/// initial ("J. R. Doe", "John F. Kennedy"). "No." is only an abbreviation before a number.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedSegmenter;

impl RuleBasedSegmenter {
    /// Create the default segmenter.
    pub const fn new() -> Self {
        Self
    }
}

impl SentenceSegmenter for RuleBasedSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let offset_at = |idx: usize| chars.get(idx).map_or(text.len(), |(offset, _)| *offset);

        let mut sentences = Vec::new();
        let mut start = 0usize;
        let mut idx = 0usize;

        while idx < chars.len() {
            let (position, ch) = chars[idx];
            if !is_terminator(ch) {
                idx += 1;
                continue;
            }

            let mut after = idx + 1;
            while after < chars.len()
                && (is_terminator(chars[after].1) || is_closer(chars[after].1))
            {
                after += 1;
            }

            if after < chars.len() && !chars[after].1.is_whitespace() {
                idx = after;
                continue;
            }

            let mut next = after;
            while next < chars.len() && chars[next].1.is_whitespace() {
                next += 1;
            }

            let opens_next = next >= chars.len() || opens_sentence(chars[next].1);
            let following = chars.get(next).map(|(_, ch)| *ch);
            let abbreviated =
                ch == '.' && ends_with_abbreviation(&text[start..position], following);
            if opens_next && !abbreviated {
                push_sentence(&mut sentences, &text[start..offset_at(after)]);
                start = offset_at(next);
            }
            idx = after;
        }

        push_sentence(&mut sentences, &text[start..]);
        sentences
    }
}

fn push_sentence(sentences: &mut Vec<String>, candidate: &str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

fn is_closer(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}

fn opens_sentence(ch: char) -> bool {
    ch.is_uppercase()
        || ch.is_ascii_digit()
        || matches!(ch, '"' | '\'' | '(' | '[' | '\u{201C}' | '\u{2018}')
}

const OPENERS: [char; 6] = ['(', '[', '"', '\'', '\u{201C}', '\u{2018}'];

/// Numbering abbreviations only count as such before a number ("No. 5").
const NUMBERING: &[&str] = &["no", "nos"];

fn ends_with_abbreviation(preceding: &str, following: Option<char>) -> bool {
    let mut words = preceding.split_whitespace().rev();
    let Some(last) = words.next() else {
        return false;
    };
    let raw = last.trim_start_matches(OPENERS);
    let token = raw.to_lowercase();

    if is_initial(raw) {
        return match words.next() {
            None => true,
            Some(previous) => {
                let previous = previous.trim_start_matches(OPENERS);
                is_initial(previous.trim_end_matches('.'))
                    || previous.chars().next().is_some_and(char::is_uppercase)
            }
        };
    }
    if NUMBERING.contains(&token.as_str()) {
        return following.is_some_and(|ch| ch.is_ascii_digit());
    }
    ABBREVIATIONS.contains(&token.as_str())
}

fn is_initial(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if ch.is_uppercase())
}

//! ROUGE-1 and ROUGE-L over lowercased alphanumeric tokens with English stemming.
//!
//! Tokens longer than three characters are reduced with the Snowball English stemmer, so
//! "dismissed" and "dismisses" match. [`tokenize`] itself never stems; BLEU uses it as is.

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("token regex"));

/// Lowercase `text` and split it into runs of ASCII letters and digits.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|token| token.as_str().to_string())
        .collect()
}

static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

fn stemmed_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .map(|token| {
            if token.len() > 3 {
                STEMMER.stem(&token).into_owned()
            } else {
                token
            }
        })
        .collect()
}

/// Precision, recall, and balanced F-measure for one comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RougeScore {
    /// Matched tokens over candidate length.
    pub precision: f64,
    /// Matched tokens over reference length.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f_measure: f64,
}

impl RougeScore {
    fn from_counts(matched: usize, candidate_len: usize, reference_len: usize) -> Self {
        if matched == 0 || candidate_len == 0 || reference_len == 0 {
            return Self::default();
        }
        let precision = matched as f64 / candidate_len as f64;
        let recall = matched as f64 / reference_len as f64;
        Self {
            precision,
            recall,
            f_measure: 2.0 * precision * recall / (precision + recall),
        }
    }
}

fn counts(tokens: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Unigram overlap with clipped counts.
pub fn rouge_1(reference: &str, candidate: &str) -> RougeScore {
    let reference = stemmed_tokens(reference);
    let candidate = stemmed_tokens(candidate);
    let reference_counts = counts(&reference);
    let matched = counts(&candidate)
        .into_iter()
        .map(|(token, count)| count.min(reference_counts.get(token).copied().unwrap_or(0)))
        .sum();
    RougeScore::from_counts(matched, candidate.len(), reference.len())
}

/// Longest-common-subsequence overlap.
pub fn rouge_l(reference: &str, candidate: &str) -> RougeScore {
    let reference = stemmed_tokens(reference);
    let candidate = stemmed_tokens(candidate);
    let matched = lcs_len(&reference, &candidate);
    RougeScore::from_counts(matched, candidate.len(), reference.len())
}

fn lcs_len(left: &[String], right: &[String]) -> usize {
    if left.is_empty() || right.is_empty() {
        return 0;
    }
    let mut previous = vec![0usize; right.len() + 1];
    let mut current = vec![0usize; right.len() + 1];
    for l in left {
        for (j, r) in right.iter().enumerate() {
            current[j + 1] = if l == r {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[right.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[test]
    fn tokenizer_lowercases_and_drops_punctuation() {
        assert_eq!(
            tokenize("The Court's order, dated 12-03."),
            vec!["the", "court", "s", "order", "dated", "12", "03"]
        );
    }

    #[test]
    fn identical_texts_score_one() {
        let text = "the appeal is dismissed with costs";
        assert!(close(rouge_1(text, text).f_measure, 1.0));
        assert!(close(rouge_l(text, text).f_measure, 1.0));
    }

    #[test]
    fn rouge_1_clips_repeated_tokens() {
        let score = rouge_1("the cat sat", "the the the");
        assert!(close(score.precision, 1.0 / 3.0));
        assert!(close(score.recall, 1.0 / 3.0));
    }

    #[test]
    fn rouge_l_rewards_order() {
        let reference = "police killed the gunman";
        let in_order = rouge_l(reference, "police kill the gunman");
        let shuffled = rouge_l(reference, "the gunman kill police");
        assert!(close(in_order.recall, 1.0));
        assert!(close(shuffled.recall, 0.5));
        assert!(in_order.f_measure > shuffled.f_measure);
    }

    #[test]
    fn inflected_forms_match_after_stemming() {
        let score = rouge_1("the court dismissed the appeals", "the court dismisses the appeal");
        assert!(close(score.f_measure, 1.0));
        assert_eq!(
            tokenize("dismissed appeals"),
            vec!["dismissed", "appeals"],
            "plain tokens stay unstemmed"
        );
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert_eq!(rouge_1("", "anything"), RougeScore::default());
        assert_eq!(rouge_l("something", ""), RougeScore::default());
    }
}

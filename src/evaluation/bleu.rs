//! Sentence-level BLEU against a single reference.
//!
//! Uniform weights over 1- to 4-grams, the standard brevity penalty, and epsilon smoothing
//! (`0.1 / total`) for orders with no matches.

use super::rouge::tokenize;
use std::collections::HashMap;

const MAX_ORDER: usize = 4;
const EPSILON: f64 = 0.1;

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Clipped n-gram matches and the candidate n-gram total (at least 1).
fn modified_precision(reference: &[String], candidate: &[String], n: usize) -> (usize, usize) {
    let reference_counts = ngram_counts(reference, n);
    let candidate_counts = ngram_counts(candidate, n);
    let matched = candidate_counts
        .iter()
        .map(|(ngram, count)| (*count).min(reference_counts.get(ngram).copied().unwrap_or(0)))
        .sum();
    let total = candidate_counts.values().sum::<usize>().max(1);
    (matched, total)
}

fn brevity_penalty(reference_len: usize, candidate_len: usize) -> f64 {
    if candidate_len == 0 {
        0.0
    } else if candidate_len > reference_len {
        1.0
    } else {
        (1.0 - reference_len as f64 / candidate_len as f64).exp()
    }
}

/// Score `candidate` against `reference`, in `0.0..=1.0`.
///
/// Returns zero when no unigram matches.
pub fn sentence_bleu(reference: &str, candidate: &str) -> f64 {
    let reference = tokenize(reference);
    let candidate = tokenize(candidate);

    let mut log_sum = 0.0;
    for n in 1..=MAX_ORDER {
        let (matched, total) = modified_precision(&reference, &candidate, n);
        if n == 1 && matched == 0 {
            return 0.0;
        }
        let precision = if matched == 0 {
            EPSILON / total as f64
        } else {
            matched as f64 / total as f64
        };
        log_sum += precision.ln() / MAX_ORDER as f64;
    }

    brevity_penalty(reference.len(), candidate.len()) * log_sum.exp()
}

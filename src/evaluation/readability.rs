//! Readability indices computed over a summary alone.

use crate::processing::segment::{RuleBasedSegmenter, SentenceSegmenter};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+(?:['’][A-Za-z]+)?").expect("word regex"));

/// Flesch Reading Ease, Flesch-Kincaid Grade, and Gunning Fog for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Readability {
    /// Higher is easier; plain English sits around 60-70.
    pub flesch_reading_ease: f64,
    /// Approximate US school grade.
    pub flesch_kincaid_grade: f64,
    /// Years of schooling needed on first reading.
    pub gunning_fog: f64,
}

/// Score `text`. Text without words scores zero on every index.
pub fn readability(text: &str) -> Readability {
    let words: Vec<&str> = WORD.find_iter(text).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return Readability::default();
    }
    let sentences = RuleBasedSegmenter::new().segment(text).len().max(1) as f64;
    let word_count = words.len() as f64;

    let syllables: Vec<usize> = words.iter().map(|word| count_syllables(word)).collect();
    let total_syllables = syllables.iter().sum::<usize>() as f64;
    let complex_words = syllables.iter().filter(|&&count| count >= 3).count() as f64;

    let words_per_sentence = word_count / sentences;
    let syllables_per_word = total_syllables / word_count;

    Readability {
        flesch_reading_ease: 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word,
        flesch_kincaid_grade: 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59,
        gunning_fog: 0.4 * (words_per_sentence + 100.0 * complex_words / word_count),
    }
}

/// Vowel-group syllable estimate with a silent trailing `e`, never below one.
pub fn count_syllables(word: &str) -> usize {
    let word = word.to_ascii_lowercase();
    let letters: Vec<char> = word.chars().filter(char::is_ascii_alphabetic).collect();
    if letters.is_empty() {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    let len = letters.len();
    let silent_e = len > 2
        && letters[len - 1] == 'e'
        && !is_vowel(letters[len - 2])
        && !(letters[len - 2] == 'l' && !is_vowel(letters[len - 3]));
    if silent_e && count > 1 {
        count -= 1;
    }
    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_common_syllable_patterns() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("judgement"), 3);
        assert_eq!(count_syllables("jurisdiction"), 4);
        assert_eq!(count_syllables("42"), 1);
    }

    #[test]
    fn simple_prose_reads_easier_than_legal_prose() {
        let simple = readability("The cat sat on the mat. The dog ran to the cat.");
        let legal = readability(
            "Notwithstanding the aforementioned jurisdictional considerations, the appellate \
             tribunal determined that the administrative authority exceeded its statutory competence.",
        );
        assert!(simple.flesch_reading_ease > legal.flesch_reading_ease);
        assert!(simple.flesch_kincaid_grade < legal.flesch_kincaid_grade);
        assert!(simple.gunning_fog < legal.gunning_fog);
    }

    #[test]
    fn one_syllable_sentence_matches_formula() {
        // 6 words, 1 sentence, 6 syllables, no complex words.
        let score = readability("The cat sat on the mat.");
        assert!((score.flesch_reading_ease - (206.835 - 1.015 * 6.0 - 84.6)).abs() < 1e-9);
        assert!((score.gunning_fog - 0.4 * 6.0).abs() < 1e-9);
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(readability("  ... "), Readability::default());
    }
}

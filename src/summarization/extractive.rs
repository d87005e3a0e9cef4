use async_trait::async_trait;

use super::{SummarizationClient, SummarizationClientError, SummarizationRequest};
use crate::processing::segment::{RuleBasedSegmenter, SentenceSegmenter};

/// Deterministic lead-sentence summaries bounded by the word budget.
///
/// Takes leading sentences until `min_length` words are collected, never exceeding
/// `max_length`. A first sentence longer than `max_length` is cut at the word limit.
#[derive(Debug, Default)]
pub struct ExtractiveSummarizationClient {
    segmenter: RuleBasedSegmenter,
}

impl ExtractiveSummarizationClient {
    /// Create an extractive client.
    pub fn new() -> Self {
        Self::default()
    }

    fn summarize(&self, text: &str, min_words: usize, max_words: usize) -> String {
        let mut selected: Vec<String> = Vec::new();
        let mut used = 0usize;

        for sentence in self.segmenter.segment(text) {
            let words = sentence.split_whitespace().count();
            if words == 0 {
                continue;
            }
            if used + words > max_words {
                if selected.is_empty() {
                    selected.push(truncate_words(&sentence, max_words));
                }
                break;
            }
            used += words;
            selected.push(sentence);
            if used >= min_words {
                break;
            }
        }

        selected.join(" ")
    }
}

fn truncate_words(sentence: &str, max_words: usize) -> String {
    let mut words: Vec<&str> = sentence.split_whitespace().take(max_words).collect();
    if let Some(last) = words.last_mut() {
        *last = last.trim_end_matches([',', ';', ':']);
    }
    format!("{}…", words.join(" "))
}

#[async_trait]
impl SummarizationClient for ExtractiveSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest<'_>,
    ) -> Result<String, SummarizationClientError> {
        let settings = request.settings;
        let summary = self.summarize(request.text, settings.min_length, settings.max_length);
        if summary.is_empty() {
            return Err(SummarizationClientError::InvalidResponse(
                "chunk contains no sentences".into(),
            ));
        }
        Ok(summary)
    }

    fn supports_concurrent_calls(&self) -> bool {
        true
    }
}

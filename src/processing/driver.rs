//! Sequential per-chunk summarization with failure isolation.

use async_stream::stream;
use futures_core::Stream;

use super::chunking::Chunk;
use super::types::{ChunkOutcome, ChunkResult};
use crate::summarization::{GenerationSettings, Summarizer};

/// Summarize `chunks` one at a time, yielding each result as soon as it is known.
///
/// A failed invocation becomes a [`ChunkOutcome::Failed`] result and the loop moves on, so
/// the stream always yields exactly one result per chunk, in index order. Nothing is retried.
pub fn drive_summarization<'a>(
    chunks: &'a [Chunk],
    summarizer: &'a Summarizer,
    settings: GenerationSettings,
) -> impl Stream<Item = ChunkResult> + 'a {
    stream! {
        for chunk in chunks {
            let text = chunk.text();
            let outcome = match summarizer.summarize(&text, settings).await {
                Ok(summary) => {
                    tracing::debug!(
                        chunk = chunk.index(),
                        words = chunk.word_count(),
                        summary_words = summary.split_whitespace().count(),
                        "Chunk summarized"
                    );
                    ChunkOutcome::Summary(summary)
                }
                Err(error) => {
                    tracing::warn!(
                        chunk = chunk.index(),
                        error = %error,
                        "Chunk summarization failed; recording placeholder"
                    );
                    ChunkOutcome::Failed {
                        reason: error.to_string(),
                    }
                }
            };
            yield ChunkResult {
                index: chunk.index(),
                outcome,
            };
        }
    }
}

//! Core data types and error definitions for the summarization pipeline.

use crate::ingest::IngestError;
use std::path::PathBuf;
use thiserror::Error;

/// Placeholder recorded in place of a summary when a chunk fails.
pub const ERROR_PLACEHOLDER: &str = "[Error in chunk]";

/// Errors produced while packing sentences into chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    /// The pipeline was configured with an impossible word budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors that stop a document before its chunk loop starts.
///
/// Anything that goes wrong after chunking is isolated per chunk and never surfaces here.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The upload was rejected (missing file or unsupported type).
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Extraction produced no usable text.
    #[error("No text found in the file '{document}'.")]
    NoText {
        /// Name of the offending document.
        document: String,
    },
    /// Chunking step failed to pack the document.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Filesystem write failed while storing an upload or artifact.
    #[error("Failed to write {path}: {source}")]
    Storage {
        /// Path we attempted to write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// What happened when a single chunk was summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The summarization capability returned text.
    Summary(String),
    /// The invocation failed; the reason is kept for diagnostics only.
    Failed {
        /// Display form of the underlying error.
        reason: String,
    },
}

/// Result for one chunk, paired with the chunk by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    /// Index of the originating chunk.
    pub index: usize,
    /// Summary text or failure marker.
    pub outcome: ChunkOutcome,
}

impl ChunkResult {
    /// Text contributed to the aggregate: the summary, or [`ERROR_PLACEHOLDER`] on failure.
    pub fn text(&self) -> &str {
        match &self.outcome {
            ChunkOutcome::Summary(summary) => summary,
            ChunkOutcome::Failed { .. } => ERROR_PLACEHOLDER,
        }
    }

    /// Whether this chunk ended with the error placeholder.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, ChunkOutcome::Failed { .. })
    }
}

/// Ordered, space-joined concatenation of every chunk result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSummary {
    text: String,
    chunk_count: usize,
    failed_chunks: usize,
}

impl AggregateSummary {
    /// Join chunk results in index order, keeping placeholders verbatim.
    pub fn from_results(results: &[ChunkResult]) -> Self {
        debug_assert!(
            results
                .iter()
                .enumerate()
                .all(|(position, result)| result.index == position),
            "chunk results must arrive in index order"
        );
        let text = results
            .iter()
            .map(ChunkResult::text)
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            chunk_count: results.len(),
            failed_chunks: results.iter().filter(|result| result.is_failure()).count(),
        }
    }

    /// Full summary text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of chunk results that contributed.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Number of contributions that are error placeholders.
    pub fn failed_chunks(&self) -> usize {
        self.failed_chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(index: usize, text: &str) -> ChunkResult {
        ChunkResult {
            index,
            outcome: ChunkOutcome::Summary(text.into()),
        }
    }

    #[test]
    fn aggregate_keeps_placeholders_in_position() {
        let results = vec![
            summary(0, "First part."),
            ChunkResult {
                index: 1,
                outcome: ChunkOutcome::Failed {
                    reason: "timeout".into(),
                },
            },
            summary(2, "Last part."),
        ];
        let aggregate = AggregateSummary::from_results(&results);
        assert_eq!(
            aggregate.text(),
            "First part. [Error in chunk] Last part."
        );
        assert_eq!(aggregate.chunk_count(), 3);
        assert_eq!(aggregate.failed_chunks(), 1);
    }

    #[test]
    fn aggregate_of_nothing_is_empty() {
        let aggregate = AggregateSummary::from_results(&[]);
        assert_eq!(aggregate.text(), "");
        assert_eq!(aggregate.chunk_count(), 0);
    }
}

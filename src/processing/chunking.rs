//! Sentence-aligned chunking under a word budget.
//!
//! Chunks are built by a single greedy pass over the sentences:
//!
//! - A sentence is never split. One that alone exceeds the budget gets a chunk of its own.
//! - Before a sentence is added, the current chunk is closed if the addition would push it
//!   past the budget and it already holds something.
//! - Words are whitespace-delimited tokens, not linguistic words.
//!
//! The resulting [`ChunkPlan`] also carries diagnostics: a model-token estimate per chunk
//! (via `tiktoken-rs`, falling back to a whitespace counter) used to warn about chunks that
//! will overflow the model window, and a fingerprint identifying the partition.

use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use tiktoken_rs::{CoreBPE, cl100k_base};

use super::types::ChunkingError;

/// Ordered run of consecutive sentences submitted to the summarizer as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: usize,
    sentences: Vec<String>,
    word_count: usize,
}

impl Chunk {
    /// Position of the chunk within the document; the ordering key for reassembly.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sentences in document order.
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Sum of the sentences' whitespace token counts.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Sentences joined by single spaces.
    pub fn text(&self) -> String {
        self.sentences.join(" ")
    }
}

/// Number of whitespace-delimited tokens in `sentence`.
pub fn word_count(sentence: &str) -> usize {
    sentence.split_whitespace().count()
}

/// Greedily pack sentences into chunks of at most `max_words` words.
///
/// Returns an empty vector for empty input.
pub fn chunk_sentences(
    sentences: Vec<String>,
    max_words: usize,
) -> Result<Vec<Chunk>, ChunkingError> {
    if max_words == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }

    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_words = 0usize;

    for sentence in sentences {
        let words = word_count(&sentence);
        if current_words + words > max_words && !current.is_empty() {
            let index = chunks.len();
            chunks.push(Chunk {
                index,
                sentences: std::mem::take(&mut current),
                word_count: current_words,
            });
            current_words = 0;
        }
        current.push(sentence);
        current_words += words;
    }

    if !current.is_empty() {
        let index = chunks.len();
        chunks.push(Chunk {
            index,
            sentences: current,
            word_count: current_words,
        });
    }

    Ok(chunks)
}

/// Chunks for one document plus partition diagnostics.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    chunks: Vec<Chunk>,
    max_words: usize,
    fingerprint: String,
}

impl ChunkPlan {
    /// Chunk `sentences` and warn about chunks whose token estimate exceeds `context_tokens`.
    pub fn build(
        sentences: Vec<String>,
        max_words: usize,
        context_tokens: usize,
    ) -> Result<Self, ChunkingError> {
        let chunks = chunk_sentences(sentences, max_words)?;

        for chunk in &chunks {
            if chunk.word_count() > max_words {
                tracing::debug!(
                    chunk = chunk.index(),
                    words = chunk.word_count(),
                    max_words,
                    "Oversized sentence kept whole in its own chunk"
                );
            }
            let tokens = estimate_tokens(&chunk.text());
            if tokens > context_tokens {
                tracing::warn!(
                    chunk = chunk.index(),
                    tokens,
                    context_tokens,
                    "Chunk likely exceeds the model input window"
                );
            }
        }

        let fingerprint = fingerprint(&chunks);
        Ok(Self {
            chunks,
            max_words,
            fingerprint,
        })
    }

    /// Chunks in document order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when the document produced no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Word budget the plan was built with.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Hex SHA-256 over the ordered chunk texts; equal for equal partitions.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn fingerprint(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        for sentence in chunk.sentences() {
            hasher.update(sentence.as_bytes());
            hasher.update(b"\x1f");
        }
        hasher.update(b"\x1e");
    }
    hex::encode(hasher.finalize())
}

/// Approximate model tokens in `text`.
///
/// Uses the `cl100k_base` encoding when it can be loaded and a whitespace counter otherwise.
pub fn estimate_tokens(text: &str) -> usize {
    static ENCODING: OnceLock<Option<CoreBPE>> = OnceLock::new();
    let encoding = ENCODING.get_or_init(|| match cl100k_base() {
        Ok(encoding) => Some(encoding),
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Tokenizer unavailable; falling back to whitespace counter"
            );
            None
        }
    });

    match encoding {
        Some(encoding) => encoding.encode_ordinary(text).len(),
        None => {
            let tokens = word_count(text);
            if tokens == 0 && !text.is_empty() {
                1
            } else {
                tokens
            }
        }
    }
}

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct SummaryMetrics {
    documents_summarized: AtomicU64,
    chunks_summarized: AtomicU64,
    chunks_failed: AtomicU64,
    last_chunk_count: AtomicU64,
    last_completed_at: Mutex<Option<String>>,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished document along with its chunk and failure counts.
    pub fn record_document(&self, chunk_count: u64, failed_chunks: u64) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
        self.chunks_failed
            .fetch_add(failed_chunks, Ordering::Relaxed);
        self.last_chunk_count.store(chunk_count, Ordering::Relaxed);

        let stamp = OffsetDateTime::now_utc().format(&Rfc3339).ok();
        if let Ok(mut guard) = self.last_completed_at.lock() {
            *guard = stamp;
        }
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let documents_summarized = self.documents_summarized.load(Ordering::Relaxed);
        MetricsSnapshot {
            documents_summarized,
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            chunks_failed: self.chunks_failed.load(Ordering::Relaxed),
            last_chunk_count: (documents_summarized > 0)
                .then(|| self.last_chunk_count.load(Ordering::Relaxed)),
            last_completed_at: self
                .last_completed_at
                .lock()
                .ok()
                .and_then(|guard| guard.clone()),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents whose chunk loop ran to completion since startup.
    pub documents_summarized: u64,
    /// Total chunks processed across all documents, failures included.
    pub chunks_summarized: u64,
    /// Chunks that ended with the error placeholder.
    pub chunks_failed: u64,
    /// Chunk count of the most recent document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_chunk_count: Option<u64>,
    /// RFC3339 timestamp of the most recent completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completed_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_chunks() {
        let metrics = SummaryMetrics::new();
        metrics.record_document(2, 0);
        metrics.record_document(3, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 2);
        assert_eq!(snapshot.chunks_summarized, 5);
        assert_eq!(snapshot.chunks_failed, 1);
        assert_eq!(snapshot.last_chunk_count, Some(3));
        assert!(snapshot.last_completed_at.is_some());
    }

    #[test]
    fn empty_snapshot_omits_last_values() {
        let snapshot = SummaryMetrics::new().snapshot();
        assert_eq!(snapshot.documents_summarized, 0);
        assert_eq!(snapshot.chunks_summarized, 0);
        assert!(snapshot.last_chunk_count.is_none());
        assert!(snapshot.last_completed_at.is_none());
    }
}

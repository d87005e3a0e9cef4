//! Processing service coordinating ingestion, chunking, summarization, and progress streaming.

use crate::{
    config::{Config, get_config},
    ingest::{Document, extract_text},
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::{
        chunking::ChunkPlan,
        driver::drive_summarization,
        progress::{EventSink, ProgressEmitter, ProgressEvent, relay_progress},
        segment::{RuleBasedSegmenter, SentenceSegmenter},
        storage::{persist_summary, store_upload},
        types::{AggregateSummary, ProcessingError},
    },
    summarization::{GenerationSettings, Summarizer},
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Per-document knobs resolved once at startup.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Word budget for each chunk.
    pub max_words: usize,
    /// Decoding constraints passed with every chunk.
    pub generation: GenerationSettings,
    /// Model input window used for oversize warnings.
    pub model_context_tokens: usize,
    /// Where uploads are kept.
    pub upload_dir: PathBuf,
    /// Where aggregate summaries are written.
    pub summary_dir: PathBuf,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl PipelineSettings {
    /// Derive settings from runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_words: config.chunk_max_words,
            generation: GenerationSettings::from_config(config),
            model_context_tokens: config.model_context_tokens,
            upload_dir: config.upload_dir.clone(),
            summary_dir: config.summary_output_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// A document whose chunk loop has been started.
///
/// `events` yields one percentage per chunk, then the completion marker, then the aggregate.
/// Dropping the receiver does not stop the run; `completion` resolves once the artifact has
/// been persisted and metrics recorded.
pub struct SummaryJob {
    /// Sanitized document name, also the artifact name.
    pub document: String,
    /// Number of chunks the document was split into.
    pub chunk_count: usize,
    /// Progress notifications in emission order.
    pub events: mpsc::Receiver<ProgressEvent>,
    /// Background run producing the aggregate summary.
    pub completion: JoinHandle<AggregateSummary>,
}

/// Coordinates the summarization pipeline from upload to persisted artifact.
///
/// The service owns the process-wide [`Summarizer`] so every request shares one model handle.
/// Construct it once near process start and share it through an `Arc`.
pub struct ProcessingService {
    summarizer: Arc<Summarizer>,
    segmenter: Arc<dyn SentenceSegmenter>,
    metrics: Arc<SummaryMetrics>,
    settings: Arc<PipelineSettings>,
}

/// Abstraction over the processing pipeline used by the HTTP surface.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Validate and prepare an upload, then start its chunk loop in the background.
    async fn start_summary(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<SummaryJob, ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;

    /// Largest accepted request body, in bytes.
    fn upload_limit(&self) -> usize;
}

impl ProcessingService {
    /// Build the service from the global configuration.
    pub fn new() -> Self {
        let config = get_config();
        tracing::info!(
            provider = ?config.summarization_provider,
            model = %config.summarization_model,
            timeout_secs = config.chunk_timeout_secs,
            "Initializing summarizer"
        );
        let summarizer = Summarizer::from_config(config);
        tracing::info!(serialized = summarizer.is_serialized(), "Summarizer ready");
        Self::with_components(
            summarizer,
            Arc::new(RuleBasedSegmenter::new()),
            PipelineSettings::from_config(config),
        )
    }

    /// Assemble a service from explicit parts.
    pub fn with_components(
        summarizer: Summarizer,
        segmenter: Arc<dyn SentenceSegmenter>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            summarizer: Arc::new(summarizer),
            segmenter,
            metrics: Arc::new(SummaryMetrics::new()),
            settings: Arc::new(settings),
        }
    }

    /// Store, extract, segment, and chunk a document.
    ///
    /// Fails with [`ProcessingError::NoText`] before any summarization when extraction yields
    /// nothing.
    pub async fn prepare(&self, document: &Document) -> Result<ChunkPlan, ProcessingError> {
        let stored = store_upload(&self.settings.upload_dir, document).await?;
        tracing::debug!(path = %stored.display(), "Upload stored");

        let text = extract_text(document).await;
        if text.is_empty() {
            tracing::info!(document = document.name(), "No text found; aborting");
            return Err(ProcessingError::NoText {
                document: document.name().to_string(),
            });
        }

        let sentences = self.segmenter.segment(text.as_str());
        let sentence_count = sentences.len();
        let plan = ChunkPlan::build(
            sentences,
            self.settings.max_words,
            self.settings.model_context_tokens,
        )?;
        if plan.is_empty() {
            return Err(ProcessingError::NoText {
                document: document.name().to_string(),
            });
        }

        tracing::info!(
            document = document.name(),
            format = %document.format(),
            words = text.word_count(),
            sentences = sentence_count,
            chunks = plan.len(),
            max_words = plan.max_words(),
            fingerprint = plan.fingerprint(),
            "Document chunked"
        );
        Ok(plan)
    }

    /// Validate an upload and start summarizing it.
    pub async fn start_summary(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<SummaryJob, ProcessingError> {
        let document = Document::from_upload(file_name, bytes)?;
        tracing::info!(document = document.name(), "Processing document");
        let plan = self.prepare(&document).await?;

        let chunk_count = plan.len();
        // Room for every event so the run never waits on a slow consumer.
        let (sender, events) = mpsc::channel(chunk_count + 2);
        let name = document.name().to_string();
        let completion = tokio::spawn(run_summary(
            Arc::clone(&self.summarizer),
            Arc::clone(&self.metrics),
            Arc::clone(&self.settings),
            name.clone(),
            plan,
            sender,
        ));

        Ok(SummaryJob {
            document: name,
            chunk_count,
            events,
            completion,
        })
    }

    /// Return the current summarization metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for ProcessingService {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_summary(
    summarizer: Arc<Summarizer>,
    metrics: Arc<SummaryMetrics>,
    settings: Arc<PipelineSettings>,
    document: String,
    plan: ChunkPlan,
    sender: mpsc::Sender<ProgressEvent>,
) -> AggregateSummary {
    let mut emitter = ProgressEmitter::new(plan.len());
    let mut sink = EventSink::new(sender, document.clone());

    let results = relay_progress(
        drive_summarization(plan.chunks(), &summarizer, settings.generation),
        &mut emitter,
        &mut sink,
    )
    .await;
    debug_assert_eq!(results.len(), plan.len());

    let aggregate = AggregateSummary::from_results(&results);
    match persist_summary(&settings.summary_dir, &document, &aggregate).await {
        Ok(path) => tracing::info!(path = %path.display(), "Summary persisted"),
        Err(error) => {
            tracing::error!(document = %document, error = %error, "Failed to persist summary")
        }
    }

    metrics.record_document(
        aggregate.chunk_count() as u64,
        aggregate.failed_chunks() as u64,
    );
    tracing::info!(
        document = %document,
        chunks = aggregate.chunk_count(),
        failed_chunks = aggregate.failed_chunks(),
        streamed = sink.is_connected(),
        "Document summarized"
    );

    for event in emitter.finish(&aggregate) {
        sink.send(event).await;
    }
    aggregate
}

#[async_trait]
impl SummaryApi for ProcessingService {
    async fn start_summary(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<SummaryJob, ProcessingError> {
        ProcessingService::start_summary(self, file_name, bytes).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        ProcessingService::metrics_snapshot(self)
    }

    fn upload_limit(&self) -> usize {
        self.settings.max_upload_bytes
    }
}

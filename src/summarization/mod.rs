//! Abstractive summarization capability and the shared handle used by the pipeline.
//!
//! Providers implement [`SummarizationClient`]. The process owns exactly one [`Summarizer`],
//! built at startup and shared through an `Arc`; it applies the per-chunk timeout and, when the
//! provider cannot take concurrent calls, serializes invocations behind a mutex.

mod extractive;
mod ollama;

pub use extractive::ExtractiveSummarizationClient;
pub use ollama::OllamaSummarizationClient;

use crate::config::{Config, SummarizationProvider};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors surfaced while attempting to summarize a chunk.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable or missing.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or was empty.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// The invocation did not finish within the per-chunk timeout.
    #[error("Summarization timed out after {0:?}")]
    TimedOut(Duration),
}

/// Decoding constraints applied to every chunk.
///
/// Lengths are measured in words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Upper bound on summary length.
    pub max_length: usize,
    /// Lower bound on summary length.
    pub min_length: usize,
    /// Disable sampling so identical input yields identical output where the provider allows.
    pub deterministic: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 50,
            deterministic: true,
        }
    }
}

impl GenerationSettings {
    /// Derive settings from runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_length: config.summary_max_length,
            min_length: config.summary_min_length,
            deterministic: true,
        }
    }
}

/// Request payload passed to a summarization provider.
#[derive(Debug, Clone, Copy)]
pub struct SummarizationRequest<'a> {
    /// Chunk text to summarize.
    pub text: &'a str,
    /// Decoding constraints.
    pub settings: GenerationSettings,
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Produce a shorter paraphrase of `request.text`.
    async fn generate_summary(
        &self,
        request: SummarizationRequest<'_>,
    ) -> Result<String, SummarizationClientError>;

    /// Whether overlapping calls from different documents are allowed.
    fn supports_concurrent_calls(&self) -> bool {
        false
    }
}

/// Process-wide summarization handle.
pub struct Summarizer {
    client: Box<dyn SummarizationClient>,
    gate: Option<Mutex<()>>,
    timeout: Duration,
}

impl Summarizer {
    /// Wrap a client, adding a mutex when it cannot accept concurrent calls.
    pub fn new(client: Box<dyn SummarizationClient>, timeout: Duration) -> Self {
        let gate = (!client.supports_concurrent_calls()).then(|| Mutex::new(()));
        Self {
            client,
            gate,
            timeout,
        }
    }

    /// Build the summarizer selected by configuration.
    pub fn from_config(config: &Config) -> Self {
        let client: Box<dyn SummarizationClient> = match config.summarization_provider {
            SummarizationProvider::Ollama => Box::new(OllamaSummarizationClient::new(
                config.ollama_url.clone(),
                config.summarization_model.clone(),
            )),
            SummarizationProvider::Extractive => Box::new(ExtractiveSummarizationClient::new()),
        };
        Self::new(client, Duration::from_secs(config.chunk_timeout_secs))
    }

    /// Whether invocations are serialized.
    pub fn is_serialized(&self) -> bool {
        self.gate.is_some()
    }

    /// Summarize one chunk.
    ///
    /// Waiting for the gate does not count against the timeout; only the provider call does.
    pub async fn summarize(
        &self,
        text: &str,
        settings: GenerationSettings,
    ) -> Result<String, SummarizationClientError> {
        let _guard = match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };
        let request = SummarizationRequest { text, settings };
        match tokio::time::timeout(self.timeout, self.client.generate_summary(request)).await {
            Ok(result) => result,
            Err(_) => Err(SummarizationClientError::TimedOut(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowClient {
        delay: Duration,
        concurrent: bool,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowClient {
        fn new(delay: Duration, concurrent: bool) -> Self {
            Self {
                delay,
                concurrent,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SummarizationClient for Arc<SlowClient> {
        async fn generate_summary(
            &self,
            request: SummarizationRequest<'_>,
        ) -> Result<String, SummarizationClientError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("summary of {}", request.text))
        }

        fn supports_concurrent_calls(&self) -> bool {
            self.concurrent
        }
    }

    #[tokio::test]
    async fn times_out_hung_invocations() {
        let client = Arc::new(SlowClient::new(Duration::from_secs(5), true));
        let summarizer = Summarizer::new(Box::new(client), Duration::from_millis(20));
        let error = summarizer
            .summarize("text", GenerationSettings::default())
            .await
            .expect_err("timeout");
        assert!(matches!(error, SummarizationClientError::TimedOut(_)));
    }

    #[tokio::test]
    async fn serializes_clients_that_reject_concurrency() {
        let client = Arc::new(SlowClient::new(Duration::from_millis(20), false));
        let summarizer = Arc::new(Summarizer::new(
            Box::new(client.clone()),
            Duration::from_secs(5),
        ));
        assert!(summarizer.is_serialized());

        let mut handles = Vec::new();
        for i in 0..4 {
            let summarizer = summarizer.clone();
            handles.push(tokio::spawn(async move {
                summarizer
                    .summarize(&format!("doc {i}"), GenerationSettings::default())
                    .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("summary");
        }
        assert_eq!(client.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_clients_are_not_gated() {
        let client = Arc::new(SlowClient::new(Duration::from_millis(50), true));
        let summarizer = Arc::new(Summarizer::new(
            Box::new(client.clone()),
            Duration::from_secs(5),
        ));
        assert!(!summarizer.is_serialized());

        let first = summarizer.summarize("a", GenerationSettings::default());
        let second = summarizer.summarize("b", GenerationSettings::default());
        let (first, second) = tokio::join!(first, second);
        assert_eq!(first.expect("first"), "summary of a");
        assert_eq!(second.expect("second"), "summary of b");
        assert_eq!(client.peak.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn settings_follow_configuration() {
        let config = Config {
            summary_max_length: 90,
            summary_min_length: 30,
            ..Config::default()
        };
        let settings = GenerationSettings::from_config(&config);
        assert_eq!(settings.max_length, 90);
        assert_eq!(settings.min_length, 30);
        assert!(settings.deterministic);
    }
}

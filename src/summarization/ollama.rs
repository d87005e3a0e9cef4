use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{SummarizationClient, SummarizationClientError, SummarizationRequest};

/// Summarization backed by a local Ollama runtime (`/api/generate`).
pub struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaSummarizationClient {
    /// Create a client for `model` served at `base_url`.
    pub fn new(base_url: String, model: String) -> Self {
        let http = Client::builder()
            .user_agent("docsum/summary")
            .build()
            .unwrap_or_else(|error| {
                tracing::warn!(error = %error, "Falling back to default reqwest client");
                Client::new()
            });
        Self {
            http,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

fn build_prompt(request: &SummarizationRequest<'_>) -> String {
    let settings = request.settings;
    format!(
        "Summarize the following passage in {min} to {max} words. Keep names, dates, and \
         figures exact. Reply with the summary only, as a single paragraph.\n\n{text}",
        min = settings.min_length,
        max = settings.max_length,
        text = request.text.trim(),
    )
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest<'_>,
    ) -> Result<String, SummarizationClientError> {
        if request.text.trim().is_empty() {
            return Err(SummarizationClientError::InvalidResponse(
                "refusing to summarize an empty chunk".into(),
            ));
        }

        let mut options = json!({
            // Token ceiling with headroom over the word budget.
            "num_predict": request.settings.max_length * 2,
        });
        if request.settings.deterministic {
            options["temperature"] = json!(0.0);
            options["top_k"] = json!(1);
            options["seed"] = json!(0);
        }

        let payload = json!({
            "model": self.model,
            "prompt": build_prompt(&request),
            "stream": false,
            "options": options,
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404 (is model '{}' pulled?)",
                self.endpoint(),
                self.model
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        let summary = body.response.trim();
        if summary.is_empty() {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama returned an empty summary".into(),
            ));
        }

        Ok(summary.to_string())
    }

    fn supports_concurrent_calls(&self) -> bool {
        true
    }
}

//! HTTP surface for Docsum.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /summarize` – Upload a PDF or TXT file as multipart field `document`. The response is
//!   a server-sent event stream: one integer percentage per completed chunk, then the literal
//!   `DONE`, then the combined summary text.
//! - `GET /metrics` – Observe summarization counters and the last document's chunk count.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Uploads are validated before anything is stored; an unsupported extension, a missing file, or
//! a document without extractable text is answered with `400` and no stream.

use crate::ingest::IngestError;
use crate::processing::{ProcessingError, SummaryApi, SummaryJob};
use async_stream::stream;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use futures_core::Stream;
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "document";

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummaryApi + 'static,
{
    let upload_limit = service.upload_limit();
    Router::new()
        .route("/summarize", post(summarize_document::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(service)
}

/// Accept an upload and stream summarization progress.
///
/// The chunk loop runs in the background; if the client disconnects mid-stream the run still
/// completes and the summary artifact is still written.
async fn summarize_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError>
where
    S: SummaryApi,
{
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }
    let (file_name, bytes) = upload.ok_or(ProcessingError::Ingest(IngestError::MissingFile))?;

    let SummaryJob {
        document,
        chunk_count,
        mut events,
        ..
    } = service.start_summary(&file_name, bytes).await?;
    tracing::info!(document = %document, chunks = chunk_count, "Streaming summary");

    let stream = stream! {
        while let Some(event) = events.recv().await {
            let payload = event.payload().replace('\r', "");
            yield Ok::<_, Infallible>(Event::default().data(payload));
        }
    };
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Return a concise metrics snapshot with document/chunk counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: SummaryApi,
{
    let snapshot = service.metrics_snapshot();
    Json(MetricsResponse {
        documents_summarized: snapshot.documents_summarized,
        chunks_summarized: snapshot.chunks_summarized,
        chunks_failed: snapshot.chunks_failed,
        last_chunk_count: snapshot.last_chunk_count,
        last_completed_at: snapshot.last_completed_at,
    })
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    documents_summarized: u64,
    chunks_summarized: u64,
    chunks_failed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_chunk_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_completed_at: Option<String>,
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Upload a PDF or TXT file (multipart field `document`) and receive a text/event-stream of chunk percentages, then `DONE`, then the combined summary.",
                request_example: Some(json!({
                    "content_type": "multipart/form-data",
                    "fields": { "document": "judgement.pdf" }
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return summarization counters useful for observability dashboards.",
                request_example: None,
            },
            CommandDescriptor {
                name: "commands",
                method: "GET",
                path: "/commands",
                description: "List the commands exposed by this server.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    Processing(ProcessingError),
    Upload(MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Processing(error) => {
                let status = match error {
                    ProcessingError::Ingest(_) | ProcessingError::NoText { .. } => {
                        StatusCode::BAD_REQUEST
                    }
                    ProcessingError::Chunking(_) | ProcessingError::Storage { .. } => {
                        tracing::error!(error = %error, "Summarize request failed");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, error.to_string()).into_response()
            }
            Self::Upload(error) => (error.status(), error.body_text()).into_response(),
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}

impl From<MultipartError> for AppError {
    fn from(inner: MultipartError) -> Self {
        Self::Upload(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::ingest::Document;
    use crate::metrics::MetricsSnapshot;
    use crate::processing::{
        AggregateSummary, ProcessingError, ProgressEvent, SummaryApi, SummaryJob,
    };
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use std::sync::Arc;
    use tokio::sync::{Mutex, mpsc};
    use tower::ServiceExt;

    const BOUNDARY: &str = "docsum-test-boundary";

    #[tokio::test]
    async fn commands_catalog_exposes_summarize_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let summarize = commands
            .iter()
            .find(|cmd| cmd.name == "summarize")
            .expect("summarize command present");

        assert_eq!(summarize.method, "POST");
        assert_eq!(summarize.path, "/summarize");
        assert!(summarize.description.contains("DONE"));
        assert!(commands.len() >= 2);
    }

    #[tokio::test]
    async fn summarize_streams_progress_marker_and_summary() {
        let service = Arc::new(StubSummaryService::new(vec![
            ProgressEvent::Progress(50),
            ProgressEvent::Progress(100),
            ProgressEvent::Complete,
            ProgressEvent::Summary("First half. Second half.".into()),
        ]));
        let app = create_router(service.clone());

        let response = app
            .oneshot(upload_request("document", "case.TXT", "Body text."))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/event-stream"));

        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(
            String::from_utf8(body.to_vec()).expect("utf8"),
            "data: 50\n\ndata: 100\n\ndata: DONE\n\ndata: First half. Second half.\n\n"
        );

        let calls = service.recorded_calls().await;
        assert_eq!(calls, vec![("case.TXT".to_string(), b"Body text.".to_vec())]);
    }

    #[tokio::test]
    async fn summarize_rejects_unsupported_extension() {
        let service = Arc::new(StubSummaryService::new(Vec::new()));
        let app = create_router(service);

        let response = app
            .oneshot(upload_request("document", "notes.docx", "irrelevant"))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let message = String::from_utf8(body.to_vec()).expect("utf8");
        assert!(message.contains("Only PDF and TXT files are allowed"));
    }

    #[tokio::test]
    async fn summarize_requires_document_field() {
        let service = Arc::new(StubSummaryService::new(Vec::new()));
        let app = create_router(service.clone());

        let response = app
            .oneshot(upload_request("attachment", "case.txt", "Body text."))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(body.as_ref(), b"No file selected.");
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn summarize_reports_documents_without_text() {
        let service = Arc::new(StubSummaryService::new(Vec::new()));
        let app = create_router(service);

        let response = app
            .oneshot(upload_request("document", "blank.txt", ""))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(body.as_ref(), b"No text found in the file 'blank.txt'.");
    }

    #[tokio::test]
    async fn metrics_route_returns_counters() {
        let service = Arc::new(StubSummaryService::new(Vec::new()));
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["documents_summarized"], 3);
        assert_eq!(json["chunks_failed"], 1);
        assert_eq!(json["last_chunk_count"], 4);
        assert!(json.get("last_completed_at").is_none());
    }

    fn upload_request(field: &str, file_name: &str, contents: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {contents}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method(Method::POST)
            .uri("/summarize")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    struct StubSummaryService {
        calls: Mutex<Vec<(String, Vec<u8>)>>,
        events: Vec<ProgressEvent>,
    }

    impl StubSummaryService {
        fn new(events: Vec<ProgressEvent>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                events,
            }
        }

        async fn recorded_calls(&self) -> Vec<(String, Vec<u8>)> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl SummaryApi for StubSummaryService {
        async fn start_summary(
            &self,
            file_name: &str,
            bytes: Vec<u8>,
        ) -> Result<SummaryJob, ProcessingError> {
            let document = Document::from_upload(file_name, bytes.clone())?;
            if bytes.is_empty() {
                return Err(ProcessingError::NoText {
                    document: document.name().to_string(),
                });
            }
            self.calls
                .lock()
                .await
                .push((file_name.to_string(), bytes));

            let (sender, receiver) = mpsc::channel(self.events.len().max(1));
            for event in &self.events {
                sender.send(event.clone()).await.expect("buffered send");
            }
            Ok(SummaryJob {
                document: document.name().to_string(),
                chunk_count: 2,
                events: receiver,
                completion: tokio::spawn(async { AggregateSummary::from_results(&[]) }),
            })
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_summarized: 3,
                chunks_summarized: 9,
                chunks_failed: 1,
                last_chunk_count: Some(4),
                last_completed_at: None,
            }
        }

        fn upload_limit(&self) -> usize {
            1024 * 1024
        }
    }
}

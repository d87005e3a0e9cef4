#![deny(missing_docs)]

//! Core library for the Docsum document summarization server.

/// HTTP routing and streaming handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Summary quality scoring against reference documents.
pub mod evaluation;
/// Upload validation, text extraction, and normalization.
pub mod ingest;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization metrics helpers.
pub mod metrics;
/// Document processing pipeline utilities.
pub mod processing;
/// Summarization providers and the shared summarizer handle.
pub mod summarization;

//! Document processing pipeline: segmentation, chunking, per-chunk summarization, and progress.

pub mod chunking;
pub mod driver;
pub mod progress;
pub mod segment;
mod service;
mod storage;
pub mod types;

pub use progress::{COMPLETION_MARKER, ProgressEvent};
pub use service::{PipelineSettings, ProcessingService, SummaryApi, SummaryJob};
pub use types::{
    AggregateSummary, ChunkOutcome, ChunkResult, ChunkingError, ERROR_PLACEHOLDER,
    ProcessingError,
};

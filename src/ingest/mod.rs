//! Document intake: format detection, text extraction, and normalization.

/// Upload validation and format detection.
pub mod document;
pub mod extract;
pub mod normalize;

pub use document::{Document, DocumentFormat, IngestError};
pub use extract::extract_text;
pub use normalize::{NormalizedText, normalize};

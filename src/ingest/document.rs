use std::fmt;
use thiserror::Error;

/// Reasons an upload is turned away before any processing starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    /// The request carried no file, or the file had no usable name.
    #[error("No file selected.")]
    MissingFile,
    /// The file extension is neither `pdf` nor `txt`.
    #[error("Only PDF and TXT files are allowed (got '{0}').")]
    UnsupportedFormat(String),
}

/// Formats accepted for summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format; text is read from the text layer page by page.
    Pdf,
    /// UTF-8 plain text.
    PlainText,
}

impl DocumentFormat {
    /// Detect the format from a file name's extension, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self, IngestError> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::PlainText),
            _ => Err(IngestError::UnsupportedFormat(extension)),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::PlainText => f.write_str("txt"),
        }
    }
}

/// An uploaded document. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    format: DocumentFormat,
    bytes: Vec<u8>,
}

impl Document {
    /// Validate an upload and wrap it as a document.
    ///
    /// The client-supplied name is reduced to its final path component so it can be used
    /// safely as a file name inside the upload and summary directories.
    pub fn from_upload(file_name: &str, bytes: Vec<u8>) -> Result<Self, IngestError> {
        let name = base_name(file_name).ok_or(IngestError::MissingFile)?;
        let format = DocumentFormat::from_file_name(&name)?;
        Ok(Self {
            name,
            format,
            bytes,
        })
    }

    /// Sanitized file name identifying the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detected document format.
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Raw uploaded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn base_name(file_name: &str) -> Option<String> {
    let candidate = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if candidate.is_empty() || candidate == "." || candidate == ".." {
        None
    } else {
        Some(candidate.to_string())
    }
}

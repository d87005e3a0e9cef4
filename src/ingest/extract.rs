//! Text extraction for PDF and plain-text uploads.
//!
//! Extraction never fails loudly: a corrupt file, a scanned PDF without a text layer, or
//! non-UTF-8 text all come back as empty text, which the service reports as "no text found".

use super::document::{Document, DocumentFormat};
use super::normalize::{NormalizedText, normalize};
use thiserror::Error;

const PAGE_BREAK: char = '\x0C';

#[derive(Debug, Error)]
enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    Pdf(String),
    #[error("text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("extraction task aborted: {0}")]
    Aborted(String),
}

/// Extract and normalize the text of a document.
///
/// PDF parsing runs on the blocking pool, so a parser panic surfaces as an aborted task
/// rather than taking down the worker.
pub async fn extract_text(document: &Document) -> NormalizedText {
    let outcome = match document.format() {
        DocumentFormat::Pdf => {
            let bytes = document.bytes().to_vec();
            tokio::task::spawn_blocking(move || extract_pdf(&bytes))
                .await
                .unwrap_or_else(|error| Err(ExtractionError::Aborted(error.to_string())))
        }
        DocumentFormat::PlainText => extract_plain_text(document.bytes()),
    };

    match outcome {
        Ok(text) => text,
        Err(error) => {
            tracing::warn!(
                document = document.name(),
                format = %document.format(),
                error = %error,
                "Text extraction failed; treating document as empty"
            );
            normalize("")
        }
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<NormalizedText, ExtractionError> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|error| ExtractionError::Pdf(error.to_string()))?;
    Ok(join_pages(&raw))
}

/// Normalize each form-feed separated page, skip pages without text, and join the rest.
fn join_pages(raw: &str) -> NormalizedText {
    let pages: Vec<NormalizedText> = raw
        .split(PAGE_BREAK)
        .map(normalize)
        .filter(|page| !page.is_empty())
        .collect();
    let joined = pages
        .iter()
        .map(NormalizedText::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&joined)
}

fn extract_plain_text(bytes: &[u8]) -> Result<NormalizedText, ExtractionError> {
    let text = String::from_utf8(bytes.to_vec())?;
    Ok(normalize(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_are_joined_in_order_and_blank_pages_skipped() {
        let raw = "Page one\nline two\x0C   \n\x0CPage three\n";
        let text = join_pages(raw);
        assert_eq!(text.as_str(), "Page one line two Page three");
    }

    #[test]
    fn plain_text_is_normalized() {
        let text = extract_plain_text("Alpha.\n\nBeta.".as_bytes()).expect("utf8");
        assert_eq!(text.as_str(), "Alpha. Beta.");
    }

    #[tokio::test]
    async fn invalid_utf8_yields_empty_text() {
        let document = Document::from_upload("broken.txt", vec![0xff, 0xfe, 0x00]).unwrap();
        assert!(extract_text(&document).await.is_empty());
    }

    /// A three-page PDF using the built-in Helvetica font; the middle page has no content.
    fn three_page_pdf() -> Vec<u8> {
        let streams = [
            "BT /F1 12 Tf 72 720 Td (First page) Tj ET",
            "",
            "BT /F1 12 Tf 72 720 Td (Third page) Tj ET",
        ];
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R 4 0 R 5 0 R] /Count 3 >>".to_string(),
        ];
        for content in 6..=8 {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 9 0 R >> >> /Contents {content} 0 R >>"
            ));
        }
        for stream in streams {
            objects.push(format!(
                "<< /Length {} >>\nstream\n{stream}\nendstream",
                stream.len()
            ));
        }
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", index + 1));
        }
        let xref = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    #[tokio::test]
    async fn multi_page_pdf_keeps_page_order_and_skips_blank_pages() {
        let document = Document::from_upload("case.pdf", three_page_pdf()).expect("doc");
        let text = extract_text(&document).await;
        let text = text.as_str();

        let first = text.find("First page").expect("page one text");
        let third = text.find("Third page").expect("page three text");
        assert!(first < third);
        assert!(!text.contains("  "), "double space in {text:?}");
        assert!(!text.contains(['\n', '\r', PAGE_BREAK]));
        assert_eq!(text, text.trim());
    }

    #[tokio::test]
    async fn corrupt_pdf_yields_empty_text() {
        let document =
            Document::from_upload("broken.pdf", b"definitely not a pdf".to_vec()).unwrap();
        assert!(extract_text(&document).await.is_empty());
    }
}

//! Filesystem side effects: the stored upload and the persisted summary artifact.

use std::path::{Path, PathBuf};

use tokio::fs;

use super::types::{AggregateSummary, ProcessingError};
use crate::ingest::Document;

async fn write_file(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf, ProcessingError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| ProcessingError::Storage {
            path: dir.to_path_buf(),
            source,
        })?;
    let path = dir.join(name);
    fs::write(&path, contents)
        .await
        .map_err(|source| ProcessingError::Storage {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Keep the original upload under `dir`, replacing any earlier file with the same name.
pub async fn store_upload(dir: &Path, document: &Document) -> Result<PathBuf, ProcessingError> {
    write_file(dir, document.name(), document.bytes()).await
}

/// Write the aggregate summary to `dir/<document>`; reruns overwrite the previous artifact.
pub async fn persist_summary(
    dir: &Path,
    document: &str,
    summary: &AggregateSummary,
) -> Result<PathBuf, ProcessingError> {
    write_file(dir, document, summary.text().as_bytes()).await
}

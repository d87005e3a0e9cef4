//! Offline scoring of persisted summaries against reference documents.
//!
//! Reference and summary files are paired by sorted file name, one pair per row. Each row holds
//! lexical overlap (ROUGE-1, ROUGE-L, BLEU) against the reference and readability of the
//! summary alone. Results feed a CSV report and an optional SVG bar chart.

mod bleu;
mod readability;
mod report;
mod rouge;

pub use bleu::sentence_bleu;
pub use readability::{Readability, count_syllables, readability};
pub use report::{render_chart, render_csv, write_chart, write_csv};
pub use rouge::{RougeScore, rouge_1, rouge_l, tokenize};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while reading inputs or writing reports.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// An input directory does not exist or is not a directory.
    #[error("Dataset directory not found: {0}")]
    MissingDirectory(PathBuf),
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Scores for one reference/summary pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRow {
    /// Reference file name identifying the row.
    pub file: String,
    /// Unigram overlap.
    pub rouge_1: RougeScore,
    /// Longest-common-subsequence overlap.
    pub rouge_l: RougeScore,
    /// Sentence BLEU.
    pub bleu: f64,
    /// Readability of the summary.
    pub readability: Readability,
}

/// Score one summary against its reference.
pub fn score_pair(file: impl Into<String>, reference: &str, summary: &str) -> EvaluationRow {
    EvaluationRow {
        file: file.into(),
        rouge_1: rouge_1(reference, summary),
        rouge_l: rouge_l(reference, summary),
        bleu: sentence_bleu(reference, summary),
        readability: readability(summary),
    }
}

/// Regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, EvaluationError> {
    if !dir.is_dir() {
        return Err(EvaluationError::MissingDirectory(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|error| EvaluationError::Io {
            path: error.path().unwrap_or(dir).to_path_buf(),
            source: error.into(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn read_text(path: &Path) -> Result<String, EvaluationError> {
    let bytes = fs::read(path).map_err(|source| EvaluationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Pair files from both directories by sorted name and score each pair.
///
/// Unpaired files on the longer side are skipped with a warning.
pub fn evaluate_dataset(
    references: &Path,
    summaries: &Path,
) -> Result<Vec<EvaluationRow>, EvaluationError> {
    let reference_files = list_files(references)?;
    let summary_files = list_files(summaries)?;
    if reference_files.len() != summary_files.len() {
        tracing::warn!(
            references = reference_files.len(),
            summaries = summary_files.len(),
            "File counts differ; unpaired files are ignored"
        );
    }

    let mut rows = Vec::new();
    for (reference_path, summary_path) in reference_files.iter().zip(&summary_files) {
        let reference = read_text(reference_path)?;
        let summary = read_text(summary_path)?;
        let file = reference_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let row = score_pair(file, &reference, &summary);
        tracing::debug!(
            file = %row.file,
            rouge_1 = row.rouge_1.f_measure,
            rouge_l = row.rouge_l.f_measure,
            bleu = row.bleu,
            "Scored summary"
        );
        rows.push(row);
    }
    Ok(rows)
}

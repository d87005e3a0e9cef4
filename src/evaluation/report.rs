//! CSV and SVG renderings of evaluation rows.

use super::{EvaluationError, EvaluationRow};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const CSV_HEADER: [&str; 11] = [
    "file",
    "rouge1_precision",
    "rouge1_recall",
    "rouge1_f",
    "rougeL_precision",
    "rougeL_recall",
    "rougeL_f",
    "bleu",
    "flesch_reading_ease",
    "flesch_kincaid_grade",
    "gunning_fog",
];

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render rows as CSV: one header line, then one line per row.
pub fn render_csv(rows: &[EvaluationRow]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for row in rows {
        let numbers = [
            row.rouge_1.precision,
            row.rouge_1.recall,
            row.rouge_1.f_measure,
            row.rouge_l.precision,
            row.rouge_l.recall,
            row.rouge_l.f_measure,
            row.bleu,
            row.readability.flesch_reading_ease,
            row.readability.flesch_kincaid_grade,
            row.readability.gunning_fog,
        ];
        out.push_str(&csv_field(&row.file));
        for value in numbers {
            let _ = write!(out, ",{value:.4}");
        }
        out.push('\n');
    }
    out
}

fn write_report(path: &Path, contents: &str) -> Result<(), EvaluationError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| EvaluationError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| EvaluationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the CSV report to `path`, replacing any existing file.
pub fn write_csv(rows: &[EvaluationRow], path: &Path) -> Result<(), EvaluationError> {
    write_report(path, &render_csv(rows))
}

const SERIES: [(&str, &str); 3] = [
    ("ROUGE-1", "#4c72b0"),
    ("ROUGE-L", "#dd8452"),
    ("BLEU", "#55a868"),
];
const BAR_WIDTH: f64 = 18.0;
const GROUP_GAP: f64 = 24.0;
const PLOT_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 140.0;
const LEGEND_WIDTH: f64 = 120.0;

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a grouped bar chart of ROUGE-1 F, ROUGE-L F, and BLEU per document as SVG.
pub fn render_chart(rows: &[EvaluationRow]) -> String {
    let group_width = BAR_WIDTH * SERIES.len() as f64 + GROUP_GAP;
    let plot_width = (group_width * rows.len() as f64).max(group_width);
    let width = MARGIN_LEFT + plot_width + LEGEND_WIDTH;
    let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + PLOT_HEIGHT;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" font-family="sans-serif" font-size="11">"#
    );
    let _ = writeln!(
        svg,
        r#"<text x="{x}" y="24" font-size="15" text-anchor="middle">Evaluation Metrics per Document</text>"#,
        x = width / 2.0
    );

    for step in 0..=4 {
        let value = step as f64 * 0.25;
        let y = baseline - value * PLOT_HEIGHT;
        let _ = writeln!(
            svg,
            r##"<line x1="{MARGIN_LEFT}" y1="{y}" x2="{x2}" y2="{y}" stroke="#dddddd"/>"##,
            x2 = MARGIN_LEFT + plot_width
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x}" y="{ty}" text-anchor="end">{value:.2}</text>"#,
            x = MARGIN_LEFT - 6.0,
            ty = y + 4.0
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="16" y="{y}" transform="rotate(-90 16 {y})" text-anchor="middle">Score</text>"#,
        y = MARGIN_TOP + PLOT_HEIGHT / 2.0
    );

    for (position, row) in rows.iter().enumerate() {
        let group_x = MARGIN_LEFT + GROUP_GAP / 2.0 + position as f64 * group_width;
        let values = [row.rouge_1.f_measure, row.rouge_l.f_measure, row.bleu];
        for (series, ((_, color), value)) in SERIES.iter().zip(values).enumerate() {
            let bar_height = value.clamp(0.0, 1.0) * PLOT_HEIGHT;
            let _ = writeln!(
                svg,
                r#"<rect x="{x}" y="{y}" width="{BAR_WIDTH}" height="{bar_height}" fill="{color}"/>"#,
                x = group_x + series as f64 * BAR_WIDTH,
                y = baseline - bar_height
            );
        }
        let label_x = group_x + BAR_WIDTH * SERIES.len() as f64 / 2.0;
        let label_y = baseline + 14.0;
        let _ = writeln!(
            svg,
            r#"<text x="{label_x}" y="{label_y}" transform="rotate(-45 {label_x} {label_y})" text-anchor="end">{}</text>"#,
            escape_xml(&row.file)
        );
    }

    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN_LEFT}" y1="{baseline}" x2="{x2}" y2="{baseline}" stroke="black"/>"#,
        x2 = MARGIN_LEFT + plot_width
    );

    let legend_x = MARGIN_LEFT + plot_width + 16.0;
    for (index, (label, color)) in SERIES.iter().enumerate() {
        let y = MARGIN_TOP + index as f64 * 18.0;
        let _ = writeln!(
            svg,
            r#"<rect x="{legend_x}" y="{y}" width="12" height="12" fill="{color}"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x}" y="{ty}">{label}</text>"#,
            x = legend_x + 18.0,
            ty = y + 10.0
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Write the SVG chart to `path`, replacing any existing file.
pub fn write_chart(rows: &[EvaluationRow], path: &Path) -> Result<(), EvaluationError> {
    write_report(path, &render_chart(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{Readability, RougeScore};

    fn row(file: &str, f: f64, bleu: f64) -> EvaluationRow {
        let score = RougeScore {
            precision: f,
            recall: f,
            f_measure: f,
        };
        EvaluationRow {
            file: file.to_string(),
            rouge_1: score,
            rouge_l: score,
            bleu,
            readability: Readability::default(),
        }
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let csv = render_csv(&[row("a.txt", 0.5, 0.25), row("b,c.txt", 1.0, 0.0)]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("file,rouge1_precision"));
        assert!(lines[1].starts_with("a.txt,0.5000,0.5000,0.5000"));
        assert!(lines[1].contains(",0.2500,"));
        assert!(lines[2].starts_with("\"b,c.txt\","));
    }

    #[test]
    fn csv_quotes_embedded_quotes() {
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn chart_draws_three_bars_per_document() {
        let svg = render_chart(&[row("one.txt", 0.4, 0.1), row("<two>.txt", 0.6, 0.2)]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        // Three bars per row plus three legend swatches.
        assert_eq!(svg.matches("<rect").count(), 2 * 3 + 3);
        assert!(svg.contains("&lt;two&gt;.txt"));
        assert!(svg.contains("Evaluation Metrics per Document"));
    }
}

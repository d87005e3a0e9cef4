//! Evaluation entrypoint.
//!
//! Scores every summary in the summary directory against the reference document with the same
//! sorted position, then writes a CSV report and, unless disabled, an SVG bar chart.
use anyhow::{Context, Result};
use clap::Parser;
use docsum::{evaluation, logging};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "docsum-eval", about = "Score generated summaries against reference documents")]
struct Args {
    /// Directory of reference documents.
    #[arg(long, default_value = "dataset/judgement")]
    references: PathBuf,
    /// Directory of generated summaries.
    #[arg(long, default_value = "dataset/summary")]
    summaries: PathBuf,
    /// CSV report destination.
    #[arg(long, default_value = "evaluation_results.csv")]
    output: PathBuf,
    /// SVG chart destination.
    #[arg(long, default_value = "evaluation_chart.svg")]
    chart: PathBuf,
    /// Skip the chart.
    #[arg(long)]
    no_chart: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing();

    let rows = evaluation::evaluate_dataset(&args.references, &args.summaries)
        .context("failed to evaluate dataset")?;
    evaluation::write_csv(&rows, &args.output).context("failed to write CSV report")?;
    tracing::info!(rows = rows.len(), path = %args.output.display(), "Evaluation report written");

    if !args.no_chart {
        evaluation::write_chart(&rows, &args.chart).context("failed to write chart")?;
        tracing::info!(path = %args.chart.display(), "Evaluation chart written");
    }
    Ok(())
}

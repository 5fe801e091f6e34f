//! Report rendering

use std::io::Write;

use anyhow::{Context, Result};
use clap::ValueEnum;
use kubetop_k8s::{PodMetricsRecord, PodUsageSummary};
use serde::Deserialize;

/// Report format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `name: ..., cpu: ...m, mem: ...Mi` line per pod
    #[default]
    Text,
    /// JSON array of per-pod totals
    Json,
}

/// Text line for one pod
pub fn format_line(summary: &PodUsageSummary) -> String {
    format!(
        "name: {}, cpu: {}m, mem: {}Mi",
        summary.name, summary.cpu_millis, summary.memory_mib
    )
}

/// Write the report for all records in the given format
pub fn write_report<W: Write>(
    out: &mut W,
    records: &[PodMetricsRecord],
    format: OutputFormat,
) -> Result<()> {
    let summaries: Vec<PodUsageSummary> = records.iter().map(PodMetricsRecord::summary).collect();

    match format {
        OutputFormat::Text => {
            for summary in &summaries {
                writeln!(out, "{}", format_line(summary)).context("Failed to write report")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &summaries)
                .context("Failed to serialize report")?;
            writeln!(out).context("Failed to write report")?;
        }
    }

    out.flush().context("Failed to write report")
}

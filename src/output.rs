//! Output formatting utilities

use crate::cli::OutputFormat;
use crate::error::{Result, ShpdiffError};
use crate::pipeline::{DatasetDiff, DatasetOutcome};
use crate::FORMAT_VERSION;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Batch summary file name; dataset discovery skips dot-files, so no stem maps here
pub const BATCH_SUMMARY_FILE: &str = ".summary.json";

/// One failed dataset in a batch
#[derive(Debug, Clone, Serialize)]
pub struct FailedDataset {
    pub stem: String,
    pub kind: &'static str,
    pub message: String,
}

/// Totals over a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub changed: Vec<String>,
    pub unchanged: usize,
    pub failed: Vec<FailedDataset>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[DatasetOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };

        for outcome in outcomes {
            match &outcome.result {
                Ok(diff) if diff.has_changes() => summary.changed.push(outcome.stem.clone()),
                Ok(_) => summary.unchanged += 1,
                Err(e) => summary.failed.push(FailedDataset {
                    stem: outcome.stem.clone(),
                    kind: e.kind(),
                    message: e.to_string(),
                }),
            }
        }

        summary
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Pretty printer for shpdiff output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print one dataset diff as a tree, listing at most `max_listed` records
    pub fn print_dataset_diff(diff: &DatasetDiff, max_listed: usize) {
        print!("{}", Self::render_dataset_diff(diff, max_listed));
    }

    pub fn render_dataset_diff(diff: &DatasetDiff, max_listed: usize) -> String {
        let mut out = String::new();
        out.push_str(&format!("🗺️  Dataset: {}\n", diff.stem));
        out.push_str(&format!(
            "├─ Features: {} → {}\n",
            diff.base_count, diff.head_count
        ));
        out.push_str(&format!("├─ Similarity: {:.1}%\n", diff.similarity * 100.0));

        if !diff.has_changes() {
            out.push_str("└─ ✅ No changes\n");
            return out;
        }

        let result = &diff.result;
        out.push_str(&format!(
            "├─ ❌ Changes: {} ({} added, {} removed)\n",
            result.change_count(),
            result.added.len(),
            result.removed.len()
        ));

        let listed: Vec<_> = result.records.iter().take(max_listed).collect();
        let hidden = result.records.len() - listed.len();
        let overlay_line = diff.overlay.is_some();
        for (i, record) in listed.iter().enumerate() {
            let is_last = i == listed.len() - 1 && hidden == 0;
            let marker = if is_last { "└─" } else { "├─" };
            out.push_str(&format!("│  {} {}\n", marker, record));
        }
        if hidden > 0 {
            out.push_str(&format!("│  └─ ... and {} more\n", hidden));
        }

        if overlay_line {
            out.push_str("└─ 🖼️  Overlay rendered\n");
        } else {
            out.push_str("└─ Overlay not rendered\n");
        }
        out
    }

    /// Print batch totals and every failed stem with its error kind
    pub fn print_batch_summary(summary: &BatchSummary) {
        println!("📊 shpdiff batch");
        println!("├─ Datasets: {}", summary.total);
        println!("├─ Unchanged: {}", summary.unchanged);
        if summary.changed.is_empty() {
            println!("├─ Changed: 0");
        } else {
            println!("├─ Changed: {}", summary.changed.len());
            println!("│  └─ {}", summary.changed.join(", "));
        }

        if summary.failed.is_empty() {
            println!("└─ ✅ Failed: 0");
            return;
        }

        println!("└─ ❌ Failed: {}", summary.failed.len());
        for (i, failure) in summary.failed.iter().enumerate() {
            let marker = if i == summary.failed.len() - 1 { "└─" } else { "├─" };
            println!("   {} {} [{}]: {}", marker, failure.stem, failure.kind, failure.message);
        }
    }

    /// Print the files a run produced
    pub fn print_written(paths: &[PathBuf]) {
        for path in paths {
            println!("📝 Wrote {}", path.display());
        }
    }
}

#[derive(Serialize)]
struct DatasetReport<'a> {
    generated_at: String,
    version: &'static str,
    stem: &'a str,
    base_count: usize,
    head_count: usize,
    change_count: usize,
    added_count: usize,
    removed_count: usize,
    similarity: f64,
    records: Vec<RecordEntry<'a>>,
    opcodes: &'a [crate::align::Opcode],
}

#[derive(Serialize)]
struct RecordEntry<'a> {
    #[serde(flatten)]
    record: &'a crate::classify::ChangeRecord,
    description: String,
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format a dataset diff report
    pub fn format_dataset_diff(diff: &DatasetDiff) -> Result<String> {
        let report = DatasetReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            version: FORMAT_VERSION,
            stem: &diff.stem,
            base_count: diff.base_count,
            head_count: diff.head_count,
            change_count: diff.result.change_count(),
            added_count: diff.result.added.len(),
            removed_count: diff.result.removed.len(),
            similarity: diff.similarity,
            records: diff
                .result
                .records
                .iter()
                .map(|record| RecordEntry {
                    record,
                    description: record.to_string(),
                })
                .collect(),
            opcodes: &diff.opcodes,
        };
        Self::format(&report)
    }

    pub fn format_batch_summary(summary: &BatchSummary) -> Result<String> {
        let json = serde_json::json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "version": FORMAT_VERSION,
            "summary": summary,
        });
        Self::format(&json)
    }
}

/// Writes per-dataset reports and overlays into an output directory
pub struct OutputManager {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl OutputManager {
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `<stem>.json` or `<stem>.txt`, plus `<stem>.svg` when an overlay exists
    pub fn write_dataset(&self, diff: &DatasetDiff) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let report_path = match self.format {
            OutputFormat::Json => self.path_for(&diff.stem, "json"),
            OutputFormat::Pretty => self.path_for(&diff.stem, "txt"),
        };
        if report_path == self.summary_path() {
            return Err(ShpdiffError::invalid_input(format!(
                "Dataset stem '{}' collides with the batch summary",
                diff.stem
            )));
        }
        let report = match self.format {
            OutputFormat::Json => Self::ensure_newline(JsonFormatter::format_dataset_diff(diff)?),
            OutputFormat::Pretty => format_record_lines(diff),
        };
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&report_path, report)?;
        written.push(report_path);

        if let Some(overlay) = &diff.overlay {
            let svg_path = self.path_for(&diff.stem, "svg");
            overlay.write_to(&svg_path)?;
            written.push(svg_path);
        }

        log::debug!("{}: wrote {} files", diff.stem, written.len());
        Ok(written)
    }

    /// Write the batch summary next to the dataset reports
    pub fn write_batch_summary(&self, summary: &BatchSummary) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.summary_path();
        fs::write(&path, Self::ensure_newline(JsonFormatter::format_batch_summary(summary)?))?;
        Ok(path)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(BATCH_SUMMARY_FILE)
    }

    fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        let mut path = self.output_dir.clone();
        for part in stem.split('/') {
            path.push(part);
        }
        let file_name = format!("{}.{}", stem.rsplit('/').next().unwrap_or(stem), extension);
        path.set_file_name(file_name);
        path
    }

    fn ensure_newline(mut text: String) -> String {
        text.push('\n');
        text
    }
}

/// Plain-text report: one change record per line
pub fn format_record_lines(diff: &DatasetDiff) -> String {
    diff.result
        .records
        .iter()
        .map(|record| format!("{}\n", record))
        .collect()
}

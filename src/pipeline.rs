//! Per-dataset diff pipeline: canonicalize, align, classify, render

use crate::align::{similarity, Opcode, SequenceMatcher};
use crate::classify::{classify_with, ClassifyOptions, DiffResult};
use crate::config::ShpdiffConfig;
use crate::dataset::DatasetPair;
use crate::error::{Result, ShpdiffError};
use crate::feature::{canonicalize_all, RawFeature};
use crate::hash::DigestStats;
use crate::progress::ProgressReporter;
use crate::render::{Overlay, OverlayRenderer};
use rayon::prelude::*;

/// Switches for one pipeline run
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub render: bool,
    pub include_unchanged: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            render: true,
            include_unchanged: false,
        }
    }
}

/// Everything produced for one dataset
#[derive(Debug, Clone)]
pub struct DatasetDiff {
    pub stem: String,
    pub base_count: usize,
    pub head_count: usize,
    pub opcodes: Vec<Opcode>,
    pub result: DiffResult,
    pub similarity: f64,
    pub overlay: Option<Overlay>,
}

impl DatasetDiff {
    pub fn has_changes(&self) -> bool {
        self.result.has_changes()
    }
}

/// Outcome for one dataset of a batch; failures do not stop the others
#[derive(Debug)]
pub struct DatasetOutcome {
    pub stem: String,
    pub result: Result<DatasetDiff>,
}

pub struct DiffPipeline {
    renderer: OverlayRenderer,
    options: PipelineOptions,
}

impl DiffPipeline {
    pub fn new(config: &ShpdiffConfig, options: PipelineOptions) -> Self {
        Self {
            renderer: OverlayRenderer::new(config.render.clone()),
            options,
        }
    }

    /// Diff two raw feature sequences
    pub fn diff_sequences(&self, stem: &str, base: &[RawFeature], head: &[RawFeature]) -> Result<DatasetDiff> {
        let base = canonicalize_all(base)?;
        let head = canonicalize_all(head)?;

        for (side, features) in [("base", &base), ("head", &head)] {
            let stats = DigestStats::from_digests(features.iter().map(|f| f.digest()));
            if stats.has_duplicates() {
                log::debug!(
                    "{} ({}): {} of {} features are repeats",
                    stem,
                    side,
                    stats.duplicates,
                    stats.total
                );
            }
        }

        let opcodes = SequenceMatcher::new(&base, &head).opcodes();
        let ratio = similarity(&opcodes, base.len(), head.len());
        let result = classify_with(
            &opcodes,
            &base,
            &head,
            ClassifyOptions {
                include_unchanged: self.options.include_unchanged,
            },
        );
        log::info!(
            "{}: {} changes ({} added, {} removed features)",
            stem,
            result.change_count(),
            result.added.len(),
            result.removed.len()
        );

        let overlay = if self.options.render && (!result.added.is_empty() || !result.removed.is_empty()) {
            Some(self.renderer.render(&result.added, &result.removed)?)
        } else {
            None
        };

        Ok(DatasetDiff {
            stem: stem.to_string(),
            base_count: base.len(),
            head_count: head.len(),
            opcodes,
            result,
            similarity: ratio,
            overlay,
        })
    }

    /// Load and diff one dataset pair; errors carry the stem
    pub fn run_pair(&self, pair: &DatasetPair) -> Result<DatasetDiff> {
        pair.load()
            .and_then(|(base, head)| self.diff_sequences(&pair.stem, &base, &head))
            .map_err(|e| ShpdiffError::dataset(&pair.stem, e))
    }

    /// Run every pair on the rayon pool; outcomes come back in input order
    pub fn run_batch(&self, pairs: &[DatasetPair], progress: &ProgressReporter) -> Vec<DatasetOutcome> {
        pairs
            .par_iter()
            .map(|pair| {
                let result = self.run_pair(pair);
                if let Err(e) = &result {
                    log::warn!("{}", e);
                }
                progress.inc(&pair.stem);
                DatasetOutcome {
                    stem: pair.stem.clone(),
                    result,
                }
            })
            .collect()
    }
}

//! Command implementations for shpdiff CLI

use crate::cli::{Commands, OutputFormat};
use crate::config::ShpdiffConfig;
use crate::dataset::{discover_pairs, DatasetPair};
use crate::error::{Result, ShpdiffError};
use crate::output::{BatchSummary, JsonFormatter, OutputManager, PrettyPrinter};
use crate::pipeline::{DiffPipeline, PipelineOptions};
use crate::progress::ProgressReporter;
use crate::render::OverlayRenderer;
use std::path::{Path, PathBuf};

/// Execute a command
pub fn execute_command(command: Commands, config: &ShpdiffConfig) -> Result<()> {
    match command {
        Commands::Diff {
            base,
            head,
            stem,
            output_dir,
            format,
            no_render,
            show_unchanged,
        } => diff_command(
            config,
            &base,
            &head,
            stem,
            output_dir.as_deref(),
            &format,
            no_render,
            show_unchanged,
        ),
        Commands::Batch {
            base_dir,
            head_dir,
            output_dir,
            format,
            no_render,
            jobs,
        } => batch_command(config, &base_dir, &head_dir, &output_dir, &format, no_render, jobs),
        Commands::Render {
            added,
            removed,
            output,
        } => render_command(config, &added, &removed, &output),
    }
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::parse(format).map_err(ShpdiffError::invalid_input)
}

/// Diff two versions of one dataset
#[allow(clippy::too_many_arguments)]
fn diff_command(
    config: &ShpdiffConfig,
    base: &Path,
    head: &Path,
    stem: Option<String>,
    output_dir: Option<&Path>,
    format: &str,
    no_render: bool,
    show_unchanged: bool,
) -> Result<()> {
    let output_format = parse_format(format)?;
    let stem = match stem {
        Some(stem) => stem,
        None => head
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| ShpdiffError::invalid_input(format!("Cannot derive a stem from {}", head.display())))?,
    };

    let options = PipelineOptions {
        render: !no_render && output_dir.is_some() && config.output.render_images,
        include_unchanged: show_unchanged,
    };
    let pipeline = DiffPipeline::new(config, options);
    let pair = DatasetPair::new(stem, Some(base.to_path_buf()), Some(head.to_path_buf()));
    let diff = pipeline.run_pair(&pair)?;

    match output_format {
        OutputFormat::Json => println!("{}", JsonFormatter::format_dataset_diff(&diff)?),
        OutputFormat::Pretty => PrettyPrinter::print_dataset_diff(&diff, config.output.max_listed_changes),
    }

    if let Some(dir) = output_dir {
        let written = OutputManager::new(dir, output_format).write_dataset(&diff)?;
        if output_format == OutputFormat::Pretty {
            PrettyPrinter::print_written(&written);
        }
    }

    Ok(())
}

/// Diff every dataset stem found under two directories
fn batch_command(
    config: &ShpdiffConfig,
    base_dir: &Path,
    head_dir: &Path,
    output_dir: &Path,
    format: &str,
    no_render: bool,
    jobs: usize,
) -> Result<()> {
    let output_format = parse_format(format)?;
    let pairs = discover_pairs(base_dir, head_dir)?;

    let options = PipelineOptions {
        render: !no_render && config.output.render_images,
        include_unchanged: false,
    };
    let pipeline = DiffPipeline::new(config, options);
    let progress = if output_format == OutputFormat::Pretty {
        ProgressReporter::new_for_batch(pairs.len() as u64)
    } else {
        ProgressReporter::new_minimal()
    };

    let mut outcomes = if jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| ShpdiffError::invalid_input(format!("Cannot start {} workers: {}", jobs, e)))?;
        pool.install(|| pipeline.run_batch(&pairs, &progress))
    } else {
        pipeline.run_batch(&pairs, &progress)
    };
    progress.finish("Done");

    let manager = OutputManager::new(output_dir, output_format);
    let mut written: Vec<PathBuf> = Vec::new();
    for outcome in &mut outcomes {
        let write = match &outcome.result {
            Ok(diff) => manager.write_dataset(diff),
            Err(_) => continue,
        };
        match write {
            Ok(paths) => written.extend(paths),
            Err(e) => {
                let e = ShpdiffError::dataset(&outcome.stem, e);
                log::warn!("{}", e);
                outcome.result = Err(e);
            }
        }
    }

    let summary = BatchSummary::from_outcomes(&outcomes);
    written.push(manager.write_batch_summary(&summary)?);

    match output_format {
        OutputFormat::Json => println!("{}", JsonFormatter::format_batch_summary(&summary)?),
        OutputFormat::Pretty => {
            for outcome in &outcomes {
                if let Ok(diff) = &outcome.result {
                    if diff.has_changes() {
                        PrettyPrinter::print_dataset_diff(diff, config.output.max_listed_changes);
                    }
                }
            }
            PrettyPrinter::print_batch_summary(&summary);
            log::info!("Wrote {} files to {}", written.len(), manager.output_dir().display());
        }
    }

    if summary.has_failures() {
        return Err(ShpdiffError::BatchFailed {
            failed: summary.failed.len(),
            total: summary.total,
        });
    }

    Ok(())
}

/// Render an overlay from two feature files
fn render_command(config: &ShpdiffConfig, added: &Path, removed: &Path, output: &Path) -> Result<()> {
    let added = crate::dataset::load_features(added)?;
    let removed = crate::dataset::load_features(removed)?;

    let renderer = OverlayRenderer::new(config.render.clone());
    let overlay = renderer.render_raw(&added, &removed)?;
    overlay.write_to(output)?;

    println!("🖼️  Wrote overlay to {}", output.display());
    Ok(())
}

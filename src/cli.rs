//! Command-line interface for shpdiff

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shpdiff")]
#[command(about = "Feature-level diffs and overlay images for versions of vector datasets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file (render and output settings)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Diff two versions of one dataset
    Diff {
        /// Base (old) feature collection
        base: PathBuf,

        /// Head (new) feature collection
        head: PathBuf,

        /// Dataset stem used to name outputs (defaults to the head file stem)
        #[arg(long)]
        stem: Option<String>,

        /// Directory for the report and overlay image
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Skip the overlay image
        #[arg(long)]
        no_render: bool,

        /// Also list features that are unchanged
        #[arg(long)]
        show_unchanged: bool,
    },

    /// Diff every dataset found under two directories
    Batch {
        /// Directory holding the base versions
        base_dir: PathBuf,

        /// Directory holding the head versions
        head_dir: PathBuf,

        /// Directory for reports and overlay images
        #[arg(long, default_value = "shpdiff-out")]
        output_dir: PathBuf,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Skip overlay images
        #[arg(long)]
        no_render: bool,

        /// Worker threads (0 = one per core)
        #[arg(long, default_value = "0", value_parser = validate_jobs)]
        jobs: usize,
    },

    /// Render an overlay from two feature files
    Render {
        /// Features drawn as added
        #[arg(long)]
        added: PathBuf,

        /// Features drawn as removed
        #[arg(long)]
        removed: PathBuf,

        /// SVG file to write
        #[arg(long)]
        output: PathBuf,
    },
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Validate the worker thread count
fn validate_jobs(s: &str) -> Result<usize, String> {
    let jobs: usize = s
        .parse()
        .map_err(|_| format!("Invalid job count: '{}'. Must be a non-negative integer.", s))?;

    if jobs > 1024 {
        return Err("Job count must not exceed 1024".to_string());
    }

    Ok(jobs)
}

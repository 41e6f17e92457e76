//! Reading feature sequences and pairing dataset versions by stem

use crate::error::{Result, ShpdiffError};
use crate::feature::RawFeature;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognised as feature collections
pub const DATASET_EXTENSIONS: &[&str] = &["geojson", "json"];

/// Base and head versions of one dataset; either side may be absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPair {
    pub stem: String,
    pub base: Option<PathBuf>,
    pub head: Option<PathBuf>,
}

impl DatasetPair {
    pub fn new(stem: impl Into<String>, base: Option<PathBuf>, head: Option<PathBuf>) -> Self {
        Self {
            stem: stem.into(),
            base,
            head,
        }
    }

    /// Load both sides; a missing side is an empty sequence
    pub fn load(&self) -> Result<(Vec<RawFeature>, Vec<RawFeature>)> {
        let base = load_optional(self.base.as_deref())?;
        let head = load_optional(self.head.as_deref())?;
        Ok((base, head))
    }
}

fn load_optional(path: Option<&Path>) -> Result<Vec<RawFeature>> {
    match path {
        Some(path) => load_features(path),
        None => Ok(Vec::new()),
    }
}

/// Read an ordered feature sequence from a `FeatureCollection` or a bare array
pub fn load_features(path: &Path) -> Result<Vec<RawFeature>> {
    if !path.is_file() {
        return Err(ShpdiffError::invalid_input(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&content)?;
    let features = match document {
        Value::Object(mut object) => match object.remove("features") {
            Some(features @ Value::Array(_)) => features,
            _ => return Err(ShpdiffError::InvalidDataset { path: path.to_path_buf() }),
        },
        array @ Value::Array(_) => array,
        _ => return Err(ShpdiffError::InvalidDataset { path: path.to_path_buf() }),
    };

    let features: Vec<RawFeature> = serde_json::from_value(features)?;
    log::debug!("Read {} features from {}", features.len(), path.display());
    Ok(features)
}

/// Stem of a dataset file relative to `root`, with `/` separators
pub fn stem_of(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let without_ext = relative.with_extension("");
    let parts: Vec<String> = without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn is_dataset_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DATASET_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_str().map(|n| n.starts_with('.')).unwrap_or(false)
}

/// Dataset files under `root` keyed by stem; dot-files and dot-directories are skipped
fn scan_dir(root: &Path) -> Result<BTreeMap<String, PathBuf>> {
    if !root.is_dir() {
        return Err(ShpdiffError::invalid_input(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let mut found = BTreeMap::new();
    let entries = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_dataset_file(path) {
            continue;
        }
        let Some(stem) = stem_of(root, path) else {
            continue;
        };
        if let Some(previous) = found.insert(stem.clone(), path.to_path_buf()) {
            return Err(ShpdiffError::invalid_input(format!(
                "Ambiguous dataset stem '{}': {} and {}",
                stem,
                previous.display(),
                path.display()
            )));
        }
    }

    Ok(found)
}

/// Pair every dataset stem found under either directory, sorted by stem
pub fn discover_pairs(base_dir: &Path, head_dir: &Path) -> Result<Vec<DatasetPair>> {
    let mut base = scan_dir(base_dir)?;
    let head = scan_dir(head_dir)?;

    let mut pairs = Vec::new();
    for (stem, head_path) in head {
        let base_path = base.remove(&stem);
        pairs.push(DatasetPair::new(stem, base_path, Some(head_path)));
    }
    for (stem, base_path) in base {
        pairs.push(DatasetPair::new(stem, Some(base_path), None));
    }
    pairs.sort_by(|a, b| a.stem.cmp(&b.stem));

    log::info!(
        "Found {} datasets under {} and {}",
        pairs.len(),
        base_dir.display(),
        head_dir.display()
    );
    Ok(pairs)
}

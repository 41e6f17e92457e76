//! Error types for shpdiff operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShpdiffError>;

#[derive(Error, Debug)]
pub enum ShpdiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Unsupported geometry kind: {kind}")]
    UnsupportedGeometryKind { kind: String },

    #[error("Malformed {kind} coordinates: {message}")]
    MalformedCoordinates { kind: String, message: String },

    #[error("Missing bounding box for feature {feature}")]
    MissingBoundingBox { feature: usize },

    #[error("Duplicate attribute key: {key}")]
    DuplicateAttribute { key: String },

    #[error("Invalid dataset file: {path}")]
    InvalidDataset { path: PathBuf },

    #[error("Dataset '{stem}' failed: {source}")]
    Dataset {
        stem: String,
        #[source]
        source: Box<ShpdiffError>,
    },

    #[error("{failed} of {total} datasets failed")]
    BatchFailed { failed: usize, total: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl ShpdiffError {
    pub fn unsupported_geometry(kind: impl Into<String>) -> Self {
        Self::UnsupportedGeometryKind { kind: kind.into() }
    }

    pub fn malformed(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::MalformedCoordinates {
            kind: kind.into(),
            message: msg.into(),
        }
    }

    pub fn duplicate_attribute(key: impl Into<String>) -> Self {
        Self::DuplicateAttribute { key: key.into() }
    }

    pub fn dataset(stem: impl Into<String>, source: ShpdiffError) -> Self {
        Self::Dataset {
            stem: stem.into(),
            source: Box::new(source),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Short, stable label used when reporting a failed dataset
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::WalkDir(_) => "WalkDir",
            Self::UnsupportedGeometryKind { .. } => "UnsupportedGeometryKind",
            Self::MalformedCoordinates { .. } => "MalformedCoordinates",
            Self::MissingBoundingBox { .. } => "MissingBoundingBox",
            Self::DuplicateAttribute { .. } => "DuplicateAttribute",
            Self::InvalidDataset { .. } => "InvalidDataset",
            Self::Dataset { source, .. } => source.kind(),
            Self::BatchFailed { .. } => "BatchFailed",
            Self::Config { .. } => "Config",
            Self::Render { .. } => "Render",
            Self::InvalidInput { .. } => "InvalidInput",
        }
    }
}

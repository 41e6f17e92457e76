//! # shpdiff
//!
//! Feature-level diffs between two versions of a vector dataset, with an
//! overlay image of what was added and removed.
//!
//! Features are canonicalized (coordinates fixed to a decimal precision,
//! attributes ordered by key), aligned as ordered sequences, and the edit
//! script is classified into deleted, inserted and replaced records.

pub mod align;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod hash;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod render;

pub use align::{align, OpTag, Opcode, SequenceMatcher};
pub use classify::{classify, ChangeRecord, DiffResult};
pub use config::ShpdiffConfig;
pub use error::{Result, ShpdiffError};
pub use feature::{Feature, RawFeature};
pub use geometry::{normalize, Geometry, RawGeometry};
pub use render::OverlayRenderer;

/// Current format version for shpdiff reports
pub const FORMAT_VERSION: &str = "1.0.0";

/// Decimal digits kept when fixing coordinates
pub const COORDINATE_PRECISION: u32 = 7;

/// Default overlay canvas edge in pixels
pub const CANVAS_SIZE: u32 = 400;

//! Configuration for diff reports and overlay rendering

use crate::error::{Result, ShpdiffError};
use crate::CANVAS_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration, loadable from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShpdiffConfig {
    pub render: RenderConfig,
    pub output: OutputConfig,
}

/// Fill and stroke colors for one class of features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStyle {
    pub fill: String,
    pub stroke: String,
}

/// Canvas and styling parameters for the overlay image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Fixed world-to-pixel ratio
    pub pixels_per_unit: f64,
    /// Stroke width in world units, so it scales with zoom
    pub stroke_width: f64,
    /// Point marker radius in device pixels
    pub point_radius: f64,
    pub background: Option<String>,
    pub added: ClassStyle,
    pub removed: ClassStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_SIZE,
            height: CANVAS_SIZE,
            pixels_per_unit: 0.1,
            stroke_width: 20.0,
            point_radius: 4.0,
            background: Some("#ffffff".to_string()),
            added: ClassStyle {
                fill: "#8ee8f2".to_string(),
                stroke: "#00899a".to_string(),
            },
            removed: ClassStyle {
                fill: "#ffa3a3".to_string(),
                stroke: "#c0141e".to_string(),
            },
        }
    }
}

/// Report output options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Maximum change lines printed per dataset in pretty output
    pub max_listed_changes: usize,
    pub render_images: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_listed_changes: 50,
            render_images: true,
        }
    }
}

impl ShpdiffConfig {
    /// Load configuration from a file, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    ShpdiffError::config(format!("cannot read {}: {}", path.display(), e))
                })?;
                let config: Self = serde_json::from_str(&content).map_err(|e| {
                    ShpdiffError::config(format!("cannot parse {}: {}", path.display(), e))
                })?;
                log::debug!("Loaded configuration from {}", path.display());
                config
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            return Err(ShpdiffError::config("canvas dimensions must be greater than 0"));
        }
        if !(render.pixels_per_unit.is_finite() && render.pixels_per_unit > 0.0) {
            return Err(ShpdiffError::config("pixels_per_unit must be a positive number"));
        }
        if !(render.stroke_width.is_finite() && render.stroke_width >= 0.0) {
            return Err(ShpdiffError::config("stroke_width must not be negative"));
        }
        if !(render.point_radius.is_finite() && render.point_radius > 0.0) {
            return Err(ShpdiffError::config("point_radius must be a positive number"));
        }

        let colors = [
            Some(&render.added.fill),
            Some(&render.added.stroke),
            Some(&render.removed.fill),
            Some(&render.removed.stroke),
            render.background.as_ref(),
        ];
        for color in colors.into_iter().flatten() {
            if !is_hex_color(color) {
                return Err(ShpdiffError::config(format!("invalid color '{}', expected #rrggbb", color)));
            }
        }

        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

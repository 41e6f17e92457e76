//! SVG overlay of added and removed features
//!
//! The canvas centers the combined bounding box of both feature sets, flips
//! the Y axis, and scales by a fixed world-to-pixel ratio. Coordinates are
//! written in device pixels.

use crate::config::{ClassStyle, RenderConfig};
use crate::error::{Result, ShpdiffError};
use crate::feature::{canonicalize_all, Feature, RawFeature};
use crate::geometry::{BBox, Point, Shape};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// World-to-canvas mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
    pub width: f64,
    pub height: f64,
}

impl Transform {
    /// Center `bbox` on the canvas; an absent bbox centers the world origin
    pub fn for_bbox(bbox: Option<&BBox>, config: &RenderConfig) -> Self {
        let (center_x, center_y) = bbox.map(BBox::center).unwrap_or((0.0, 0.0));
        Self {
            center_x,
            center_y,
            scale: config.pixels_per_unit,
            width: config.width as f64,
            height: config.height as f64,
        }
    }

    /// Map a world position to canvas pixels (Y down)
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.width / 2.0 + (x - self.center_x) * self.scale,
            self.height / 2.0 - (y - self.center_y) * self.scale,
        )
    }

    pub fn apply_point(&self, p: &Point) -> (f64, f64) {
        self.apply(p.x(), p.y())
    }
}

/// Union of every feature bbox in both sets
///
/// Fails with `MissingBoundingBox` naming the 1-based position of the first
/// feature without one (removed features are numbered first).
pub fn combined_bbox(added: &[Feature], removed: &[Feature]) -> Result<Option<BBox>> {
    let mut combined: Option<BBox> = None;
    for (idx, feature) in removed.iter().chain(added.iter()).enumerate() {
        let bbox = feature
            .geometry
            .bbox
            .ok_or_else(|| ShpdiffError::MissingBoundingBox { feature: idx + 1 })?;
        combined = Some(match combined {
            Some(c) => c.union(&bbox),
            None => bbox,
        });
    }
    Ok(combined)
}

/// A rendered overlay
#[derive(Debug, Clone)]
pub struct Overlay {
    pub svg: String,
    pub bbox: Option<BBox>,
    pub transform: Transform,
}

impl Overlay {
    /// Write the SVG document; the target must carry an `.svg` extension
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);
        if !is_svg {
            return Err(ShpdiffError::render(format!(
                "overlays are SVG documents, cannot write {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &self.svg)?;
        log::debug!("Wrote overlay {}", path.display());
        Ok(())
    }
}

/// Draws added/removed features onto a fixed-size canvas
pub struct OverlayRenderer {
    config: RenderConfig,
}

impl OverlayRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render canonical features; removed first so added ends up on top
    pub fn render(&self, added: &[Feature], removed: &[Feature]) -> Result<Overlay> {
        let bbox = combined_bbox(added, removed)?;
        let transform = Transform::for_bbox(bbox.as_ref(), &self.config);

        let mut canvas = Canvas::new(&self.config, transform);
        canvas.begin();
        canvas.layer("removed", &self.config.removed, removed);
        canvas.layer("added", &self.config.added, added);
        let svg = canvas.finish();

        Ok(Overlay {
            svg,
            bbox,
            transform,
        })
    }

    /// Canonicalize raw features first; unknown geometry kinds are fatal
    pub fn render_raw(&self, added: &[RawFeature], removed: &[RawFeature]) -> Result<Overlay> {
        let added = canonicalize_all(added)?;
        let removed = canonicalize_all(removed)?;
        self.render(&added, &removed)
    }
}

struct Canvas<'a> {
    config: &'a RenderConfig,
    transform: Transform,
    out: String,
}

impl<'a> Canvas<'a> {
    fn new(config: &'a RenderConfig, transform: Transform) -> Self {
        Self {
            config,
            transform,
            out: String::new(),
        }
    }

    fn begin(&mut self) {
        let (w, h) = (self.config.width, self.config.height);
        let _ = write!(
            self.out,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<defs>
  <style>
    svg {{ isolation: isolate; }}
    .shape {{ mix-blend-mode: multiply; stroke-linejoin: round; stroke-linecap: round; }}
  </style>
</defs>
"#
        );
        if let Some(background) = &self.config.background {
            let _ = writeln!(self.out, r#"<rect width="{w}" height="{h}" fill="{background}"/>"#);
        }
    }

    fn layer(&mut self, class: &str, style: &ClassStyle, features: &[Feature]) {
        let _ = writeln!(self.out, r#"<g class="{class}">"#);
        for feature in features {
            self.feature(style, feature);
        }
        self.out.push_str("</g>\n");
    }

    fn feature(&mut self, style: &ClassStyle, feature: &Feature) {
        match &feature.geometry.shape {
            Shape::Polygon(rings) => self.polygon(style, rings),
            Shape::MultiPolygon(parts) => {
                for rings in parts {
                    self.polygon(style, rings);
                }
            }
            Shape::LineString(points) => self.line(style, points),
            Shape::MultiLineString(lines) => {
                for points in lines {
                    self.line(style, points);
                }
            }
            Shape::Point(p) => self.point(style, p),
            Shape::MultiPoint(points) => {
                for p in points {
                    self.point(style, p);
                }
            }
        }
    }

    fn stroke_width(&self) -> f64 {
        self.config.stroke_width * self.transform.scale
    }

    /// One polygon part: fill every ring, then stroke every ring
    fn polygon(&mut self, style: &ClassStyle, rings: &[Vec<Point>]) {
        let d: String = rings
            .iter()
            .filter(|ring| !ring.is_empty())
            .map(|ring| self.trace(ring, true))
            .collect::<Vec<_>>()
            .join(" ");
        if d.is_empty() {
            return;
        }
        let width = self.stroke_width();

        let _ = writeln!(
            self.out,
            r#"<path class="shape" d="{d}" fill="{}" fill-rule="evenodd" stroke="none"/>"#,
            style.fill
        );
        let _ = writeln!(
            self.out,
            r#"<path class="shape" d="{d}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
            style.stroke,
            width
        );
    }

    fn line(&mut self, style: &ClassStyle, points: &[Point]) {
        if points.is_empty() {
            return;
        }
        let d = self.trace(points, false);
        let width = self.stroke_width();
        let _ = writeln!(
            self.out,
            r#"<path class="shape" d="{d}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
            style.stroke,
            width
        );
    }

    fn point(&mut self, style: &ClassStyle, p: &Point) {
        let (cx, cy) = self.transform.apply_point(p);
        let _ = writeln!(
            self.out,
            r#"<circle class="shape" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#,
            cx, cy, self.config.point_radius, style.fill
        );
    }

    fn trace(&self, points: &[Point], close: bool) -> String {
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            let (x, y) = self.transform.apply_point(p);
            let cmd = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                d.push(' ');
            }
            let _ = write!(d, "{}{:.2},{:.2}", cmd, x, y);
        }
        if close {
            d.push_str(" Z");
        }
        d
    }

    fn finish(mut self) -> String {
        self.out.push_str("</svg>\n");
        self.out
    }
}

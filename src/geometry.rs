//! Geometry normalization into canonical, comparable values
//!
//! Raw geometries arrive as a type tag plus loosely-typed nested coordinate
//! arrays. Normalization dispatches on the tag, checks that the nesting depth
//! matches it, and rounds every coordinate to [`COORDINATE_PRECISION`] decimal
//! digits so that re-exported data with floating noise compares equal.

use crate::error::{Result, ShpdiffError};
use crate::COORDINATE_PRECISION;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Multiplier turning a coordinate into its fixed-precision integer form
fn coordinate_scale() -> f64 {
    10f64.powi(COORDINATE_PRECISION as i32)
}

/// A canonical coordinate pair, stored as fixed-precision integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    x: i64,
    y: i64,
}

/// Whether a whole-valued float lies inside the `i64` range.
/// `i64::MAX as f64` is 2^63, one past the largest representable value.
fn fits_i64(value: f64) -> bool {
    value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64
}

impl Point {
    /// Round a floating-point pair to canonical precision; `None` if an
    /// ordinate has no fixed-precision form
    pub fn new(x: f64, y: f64) -> Option<Self> {
        let scale = coordinate_scale();
        let (x, y) = ((x * scale).round(), (y * scale).round());
        if !(fits_i64(x) && fits_i64(y)) {
            return None;
        }
        Some(Self {
            x: x as i64,
            y: y as i64,
        })
    }

    pub fn x(&self) -> f64 {
        self.x as f64 / coordinate_scale()
    }

    pub fn y(&self) -> f64 {
        self.y as f64 / coordinate_scale()
    }

    /// The fixed-precision integer pair backing this point
    pub fn fixed(&self) -> (i64, i64) {
        (self.x, self.y)
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.x())?;
        tuple.serialize_element(&self.y())?;
        tuple.end()
    }
}

/// Axis-aligned bounding box truncated to whole coordinate units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BBox {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl BBox {
    /// Build from a floating-point extent, truncating each bound toward zero
    pub fn from_extent(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.trunc() as i64,
            max_x: max_x.trunc() as i64,
            min_y: min_y.trunc() as i64,
            max_y: max_y.trunc() as i64,
        }
    }

    /// Smallest box enclosing both boxes
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x as f64 + self.max_x as f64) / 2.0,
            (self.min_y as f64 + self.max_y as f64) / 2.0,
        )
    }

    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }
}

/// The six supported simple-feature kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "Point",
            Self::MultiPoint => "MultiPoint",
            Self::LineString => "LineString",
            Self::MultiLineString => "MultiLineString",
            Self::Polygon => "Polygon",
            Self::MultiPolygon => "MultiPolygon",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryKind {
    type Err = ShpdiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Point" => Ok(Self::Point),
            "MultiPoint" => Ok(Self::MultiPoint),
            "LineString" => Ok(Self::LineString),
            "MultiLineString" => Ok(Self::MultiLineString),
            "Polygon" => Ok(Self::Polygon),
            "MultiPolygon" => Ok(Self::MultiPolygon),
            other => Err(ShpdiffError::unsupported_geometry(other)),
        }
    }
}

/// Coordinates shaped to match their geometry kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Shape {
    Point(Point),
    MultiPoint(Vec<Point>),
    LineString(Vec<Point>),
    MultiLineString(Vec<Vec<Point>>),
    Polygon(Vec<Vec<Point>>),
    MultiPolygon(Vec<Vec<Vec<Point>>>),
}

impl Shape {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::MultiPoint(_) => GeometryKind::MultiPoint,
            Self::LineString(_) => GeometryKind::LineString,
            Self::MultiLineString(_) => GeometryKind::MultiLineString,
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }

    /// Visit every point in storage order
    pub fn for_each_point(&self, mut f: impl FnMut(&Point)) {
        match self {
            Self::Point(p) => f(p),
            Self::MultiPoint(points) | Self::LineString(points) => points.iter().for_each(f),
            Self::MultiLineString(rings) | Self::Polygon(rings) => {
                rings.iter().flatten().for_each(f)
            }
            Self::MultiPolygon(parts) => parts.iter().flatten().flatten().for_each(f),
        }
    }

    /// Extent of all points, or `None` for an empty shape
    fn extent(&self) -> Option<BBox> {
        let mut extent: Option<(f64, f64, f64, f64)> = None;
        self.for_each_point(|p| {
            let (x, y) = (p.x(), p.y());
            extent = Some(match extent {
                None => (x, x, y, y),
                Some((min_x, max_x, min_y, max_y)) => {
                    (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
                }
            });
        });
        extent.map(|(min_x, max_x, min_y, max_y)| BBox::from_extent(min_x, max_x, min_y, max_y))
    }
}

/// A raw geometry as yielded by the format-conversion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    #[serde(default)]
    pub coordinates: Value,
    /// GeoJSON order: `[minX, minY, maxX, maxY]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

impl RawGeometry {
    pub fn new(geometry_type: impl Into<String>, coordinates: Value) -> Self {
        Self {
            geometry_type: geometry_type.into(),
            coordinates,
            bbox: None,
        }
    }

    pub fn with_bbox(mut self, bbox: [f64; 4]) -> Self {
        self.bbox = Some(bbox.to_vec());
        self
    }
}

/// A canonical geometry: typed coordinates plus bounding box
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Geometry {
    pub shape: Shape,
    pub bbox: Option<BBox>,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        self.shape.kind()
    }

    /// Convert back into a raw record that normalizes to this same geometry
    pub fn to_raw(&self) -> RawGeometry {
        let coordinates = match &self.shape {
            Shape::Point(p) => point_value(p),
            Shape::MultiPoint(points) | Shape::LineString(points) => points_value(points),
            Shape::MultiLineString(rings) | Shape::Polygon(rings) => {
                Value::Array(rings.iter().map(|r| points_value(r)).collect())
            }
            Shape::MultiPolygon(parts) => Value::Array(
                parts
                    .iter()
                    .map(|rings| Value::Array(rings.iter().map(|r| points_value(r)).collect()))
                    .collect(),
            ),
        };

        RawGeometry {
            geometry_type: self.kind().to_string(),
            coordinates,
            bbox: self.bbox.map(|b| {
                vec![b.min_x as f64, b.min_y as f64, b.max_x as f64, b.max_y as f64]
            }),
        }
    }
}

fn point_value(p: &Point) -> Value {
    serde_json::json!([p.x(), p.y()])
}

fn points_value(points: &[Point]) -> Value {
    Value::Array(points.iter().map(point_value).collect())
}

/// Normalize one raw geometry into its canonical form
pub fn normalize(raw: &RawGeometry) -> Result<Geometry> {
    let kind: GeometryKind = raw.geometry_type.parse()?;
    let coords = &raw.coordinates;

    let shape = match kind {
        GeometryKind::Point => Shape::Point(parse_point(kind, coords)?),
        GeometryKind::MultiPoint => Shape::MultiPoint(parse_points(kind, coords)?),
        GeometryKind::LineString => Shape::LineString(parse_points(kind, coords)?),
        GeometryKind::MultiLineString => Shape::MultiLineString(parse_rings(kind, coords)?),
        GeometryKind::Polygon => Shape::Polygon(parse_rings(kind, coords)?),
        GeometryKind::MultiPolygon => Shape::MultiPolygon(parse_parts(kind, coords)?),
    };

    let bbox = match &raw.bbox {
        Some(values) => Some(parse_bbox(kind, values)?),
        None => shape.extent(),
    };

    Ok(Geometry { shape, bbox })
}

fn parse_bbox(kind: GeometryKind, values: &[f64]) -> Result<BBox> {
    match values {
        [min_x, min_y, max_x, max_y] => {
            if let Some(bad) = values.iter().find(|v| !fits_i64(v.trunc())) {
                return Err(ShpdiffError::malformed(
                    kind.as_str(),
                    format!("bbox bound {} is out of range", bad),
                ));
            }
            Ok(BBox::from_extent(*min_x, *max_x, *min_y, *max_y))
        }
        _ => Err(ShpdiffError::malformed(
            kind.as_str(),
            format!("bbox must have 4 numbers, found {}", values.len()),
        )),
    }
}

fn expect_array<'a>(kind: GeometryKind, value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| {
        ShpdiffError::malformed(kind.as_str(), format!("expected {}, found {}", what, describe(value)))
    })
}

// A third ordinate (Z) is accepted and dropped; comparison is planar.
fn parse_point(kind: GeometryKind, value: &Value) -> Result<Point> {
    let ordinates = expect_array(kind, value, "a coordinate pair")?;
    if ordinates.len() < 2 || ordinates.len() > 3 {
        return Err(ShpdiffError::malformed(
            kind.as_str(),
            format!("a position needs 2 or 3 numbers, found {}", ordinates.len()),
        ));
    }

    let number = |v: &Value| {
        v.as_f64().ok_or_else(|| {
            ShpdiffError::malformed(kind.as_str(), format!("expected a number, found {}", describe(v)))
        })
    };

    let (x, y) = (number(&ordinates[0])?, number(&ordinates[1])?);
    Point::new(x, y).ok_or_else(|| {
        ShpdiffError::malformed(
            kind.as_str(),
            format!("position ({}, {}) is out of range at {} decimals", x, y, COORDINATE_PRECISION),
        )
    })
}

fn parse_points(kind: GeometryKind, value: &Value) -> Result<Vec<Point>> {
    expect_array(kind, value, "a list of positions")?
        .iter()
        .map(|v| parse_point(kind, v))
        .collect()
}

fn parse_rings(kind: GeometryKind, value: &Value) -> Result<Vec<Vec<Point>>> {
    expect_array(kind, value, "a list of rings")?
        .iter()
        .map(|v| parse_points(kind, v))
        .collect()
}

fn parse_parts(kind: GeometryKind, value: &Value) -> Result<Vec<Vec<Vec<Point>>>> {
    expect_array(kind, value, "a list of polygons")?
        .iter()
        .map(|v| parse_rings(kind, v))
        .collect()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

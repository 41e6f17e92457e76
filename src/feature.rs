//! Feature canonicalization: sorted attributes plus normalized geometry

use crate::error::{Result, ShpdiffError};
use crate::geometry::{normalize, Geometry, Point, RawGeometry, Shape};
use crate::hash::{DigestBuilder, FeatureDigest};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::hash::{Hash, Hasher};

/// A float attribute compared by its bit pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalFloat(u64);

impl CanonicalFloat {
    pub fn new(value: f64) -> Self {
        // -0.0 and 0.0 are the same attribute value
        let value = if value == 0.0 { 0.0 } else { value };
        Self(value.to_bits())
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl Serialize for CanonicalFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

/// One attribute value in canonical form
///
/// Integers and floats stay distinct: `1` and `1.0` are different values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(CanonicalFloat),
    Text(String),
}

impl From<&Value> for AttributeValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(CanonicalFloat::new(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => Self::Text(s.clone()),
            // Nested values are outside the attribute contract; keep them comparable as text
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v.value()),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Attributes sorted by key for order-independent equality
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributeSet(Vec<(String, AttributeValue)>);

impl AttributeSet {
    /// Build from key/value pairs, rejecting repeated keys
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, AttributeValue)>,
    {
        let mut entries: Vec<(String, AttributeValue)> = pairs.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        if let Some(pair) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ShpdiffError::duplicate_attribute(pair[0].0.clone()));
        }

        Ok(Self(entries))
    }

    pub fn from_map(map: &IndexMap<String, Value>) -> Result<Self> {
        Self::from_pairs(map.iter().map(|(k, v)| (k.clone(), AttributeValue::from(v))))
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| &self.0[idx].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for AttributeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// A raw feature as yielded by the format-conversion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFeature {
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: IndexMap<String, Value>,
    pub geometry: Option<RawGeometry>,
    /// Feature-level bbox, used when the geometry carries none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

fn deserialize_properties<'de, D>(deserializer: D) -> std::result::Result<IndexMap<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<IndexMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawFeature {
    pub fn new(properties: IndexMap<String, Value>, geometry: RawGeometry) -> Self {
        Self {
            properties,
            geometry: Some(geometry),
            bbox: None,
        }
    }
}

/// A canonical, comparable feature
#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub attributes: AttributeSet,
    pub geometry: Geometry,
    #[serde(skip)]
    digest: FeatureDigest,
}

impl Feature {
    /// Combine canonical parts and compute the feature digest
    pub fn canonicalize(attributes: AttributeSet, geometry: Geometry) -> Self {
        let digest = digest_of(&attributes, &geometry);
        Self {
            attributes,
            geometry,
            digest,
        }
    }

    /// Canonicalize a raw feature; geometry errors are fatal
    pub fn from_raw(raw: &RawFeature) -> Result<Self> {
        let raw_geometry = raw
            .geometry
            .as_ref()
            .ok_or_else(|| ShpdiffError::invalid_input("feature has no geometry"))?;

        let geometry = if raw_geometry.bbox.is_none() && raw.bbox.is_some() {
            let mut with_bbox = raw_geometry.clone();
            with_bbox.bbox = raw.bbox.clone();
            normalize(&with_bbox)?
        } else {
            normalize(raw_geometry)?
        };

        let attributes = AttributeSet::from_map(&raw.properties)?;
        Ok(Self::canonicalize(attributes, geometry))
    }

    pub fn digest(&self) -> FeatureDigest {
        self.digest
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        // Digest mismatch proves inequality; a match is confirmed structurally
        self.digest == other.digest
            && self.attributes == other.attributes
            && self.geometry == other.geometry
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

/// Canonicalize an ordered sequence, preserving order
pub fn canonicalize_all(raws: &[RawFeature]) -> Result<Vec<Feature>> {
    raws.iter()
        .enumerate()
        .map(|(idx, raw)| {
            Feature::from_raw(raw).map_err(|e| {
                log::debug!("Feature {} failed to canonicalize: {}", idx + 1, e);
                e
            })
        })
        .collect()
}

fn digest_of(attributes: &AttributeSet, geometry: &Geometry) -> FeatureDigest {
    let mut builder = DigestBuilder::new();

    builder.tag(b'A').length(attributes.len());
    for (key, value) in attributes.iter() {
        builder.str(key);
        match value {
            AttributeValue::Null => builder.tag(0),
            AttributeValue::Bool(b) => builder.tag(1).tag(*b as u8),
            AttributeValue::Integer(i) => builder.tag(2).i64(*i),
            AttributeValue::Float(v) => builder.tag(3).u64(v.0),
            AttributeValue::Text(s) => builder.tag(4).str(s),
        };
    }

    builder.tag(b'G');

    match &geometry.shape {
        Shape::Point(p) => {
            builder.tag(1);
            encode_points(&mut builder, std::slice::from_ref(p));
        }
        Shape::MultiPoint(ps) => {
            builder.tag(2);
            encode_points(&mut builder, ps);
        }
        Shape::LineString(ps) => {
            builder.tag(3);
            encode_points(&mut builder, ps);
        }
        Shape::MultiLineString(rings) | Shape::Polygon(rings) => {
            let tag = if matches!(geometry.shape, Shape::Polygon(_)) { 5 } else { 4 };
            builder.tag(tag).length(rings.len());
            for ring in rings {
                encode_points(&mut builder, ring);
            }
        }
        Shape::MultiPolygon(parts) => {
            builder.tag(6).length(parts.len());
            for rings in parts {
                builder.length(rings.len());
                for ring in rings {
                    encode_points(&mut builder, ring);
                }
            }
        }
    }

    match &geometry.bbox {
        Some(b) => {
            builder.tag(1).i64(b.min_x).i64(b.max_x).i64(b.min_y).i64(b.max_y);
        }
        None => {
            builder.tag(0);
        }
    }

    builder.finish()
}

fn encode_points(builder: &mut DigestBuilder, points: &[Point]) {
    builder.length(points.len());
    for p in points {
        let (x, y) = p.fixed();
        builder.i64(x).i64(y);
    }
}

//! Edge cases for geometry and attribute canonicalization

use serde_json::json;
use shpdiff::config::RenderConfig;
use shpdiff::feature::canonicalize_all;
use shpdiff::geometry::{BBox, Shape};
use shpdiff::{normalize, OverlayRenderer, RawFeature, RawGeometry, ShpdiffError};

fn raw_feature(value: serde_json::Value) -> RawFeature {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_point_with_nested_coordinates_is_malformed() {
    let err = normalize(&RawGeometry::new("Point", json!([[1.0, 2.0]]))).unwrap_err();
    assert!(matches!(err, ShpdiffError::MalformedCoordinates { .. }));
}

#[test]
fn test_polygon_with_flat_coordinates_is_malformed() {
    let err = normalize(&RawGeometry::new("Polygon", json!([[0.0, 0.0], [1.0, 1.0]]))).unwrap_err();
    assert!(matches!(err, ShpdiffError::MalformedCoordinates { .. }));
}

#[test]
fn test_unknown_kind_names() {
    for kind in ["GeometryCollection", "Curve", "point", ""] {
        let err = normalize(&RawGeometry::new(kind, json!([]))).unwrap_err();
        assert!(matches!(err, ShpdiffError::UnsupportedGeometryKind { .. }), "kind {:?}", kind);
    }
}

#[test]
fn test_multipolygon_bbox_spans_all_parts() {
    let geometry = normalize(&RawGeometry::new(
        "MultiPolygon",
        json!([
            [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
            [[[-5.7, 3.0], [-4.0, 3.0], [-4.0, 9.9], [-5.7, 3.0]]]
        ]),
    ))
    .unwrap();

    assert!(matches!(geometry.shape, Shape::MultiPolygon(ref parts) if parts.len() == 2));
    assert_eq!(
        geometry.bbox,
        Some(BBox {
            min_x: -5,
            max_x: 1,
            min_y: 0,
            max_y: 9,
        })
    );
}

#[test]
fn test_feature_level_bbox_used_when_geometry_has_none() {
    let feature = raw_feature(json!({
        "properties": {},
        "bbox": [10.0, 20.0, 30.0, 40.0],
        "geometry": {"type": "LineString", "coordinates": [[12.0, 22.0], [14.0, 24.0]]}
    }));
    let features = canonicalize_all(&[feature]).unwrap();
    assert_eq!(
        features[0].geometry.bbox,
        Some(BBox {
            min_x: 10,
            max_x: 30,
            min_y: 20,
            max_y: 40,
        })
    );
}

#[test]
fn test_duplicate_keys_after_canonicalization_rejected() {
    let err = shpdiff::feature::AttributeSet::from_pairs(vec![
        ("name".to_string(), shpdiff::feature::AttributeValue::Null),
        ("name".to_string(), shpdiff::feature::AttributeValue::Bool(true)),
    ])
    .unwrap_err();
    assert!(matches!(err, ShpdiffError::DuplicateAttribute { ref key } if key == "name"));
}

#[test]
fn test_integer_and_float_attributes_differ() {
    let a = raw_feature(json!({"properties": {"n": 1}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}));
    let b = raw_feature(json!({"properties": {"n": 1.0}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}));
    let features = canonicalize_all(&[a, b]).unwrap();
    assert_ne!(features[0], features[1]);
}

#[test]
fn test_null_properties_are_empty() {
    let feature = raw_feature(json!({"properties": null, "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}));
    let features = canonicalize_all(&[feature]).unwrap();
    assert!(features[0].attributes.is_empty());
}

#[test]
fn test_feature_without_geometry_rejected() {
    let feature = raw_feature(json!({"properties": {"id": 1}, "geometry": null}));
    assert!(matches!(
        canonicalize_all(&[feature]),
        Err(ShpdiffError::InvalidInput { .. })
    ));
}

#[test]
fn test_empty_geometry_cannot_be_rendered() {
    let renderer = OverlayRenderer::new(RenderConfig::default());
    let features = canonicalize_all(&[
        raw_feature(json!({"properties": {}, "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}})),
        raw_feature(json!({"properties": {}, "geometry": {"type": "LineString", "coordinates": []}})),
    ])
    .unwrap();

    let err = renderer.render(&features, &[]).unwrap_err();
    assert!(matches!(err, ShpdiffError::MissingBoundingBox { feature: 2 }));
}

//! Edge case tests for filesystem-related scenarios

use crate::common::{sample_data, CliTestRunner};
use shpdiff::ShpdiffError;
use std::fs;

#[test]
fn test_nonexistent_input_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture
        .create_collection("head.geojson", vec![sample_data::point_feature(1, 0.0, 0.0)])
        .unwrap();

    let error = runner.expect_failure(&["diff", "/nonexistent/path/base.geojson", &fixture.arg("head.geojson")]);
    let error_msg = error.to_string().to_lowercase();
    assert!(error_msg.contains("not found"), "Expected file not found error, got: {}", error);
    assert_eq!(error.kind(), "InvalidInput");
}

#[test]
fn test_empty_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture.create_raw("empty.geojson", "").unwrap();
    fixture.create_collection("head.geojson", vec![]).unwrap();

    let error = runner.expect_failure(&["diff", &fixture.arg("empty.geojson"), &fixture.arg("head.geojson")]);
    assert_eq!(error.kind(), "Json");
}

#[test]
fn test_corrupted_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let path = fixture.root().join("corrupt.geojson");
    fs::write(&path, b"\x00\x01\x02\x03invalid_data\xff\xfe").unwrap();
    fixture.create_collection("head.geojson", vec![]).unwrap();

    assert!(runner
        .run_command(&["diff", path.to_str().unwrap(), &fixture.arg("head.geojson")])
        .is_err());
}

#[test]
fn test_collection_without_features_array() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture
        .create_json("base.geojson", &serde_json::json!({"type": "FeatureCollection", "features": 3}))
        .unwrap();
    fixture.create_collection("head.geojson", vec![]).unwrap();

    let error = runner.expect_failure(&["diff", &fixture.arg("base.geojson"), &fixture.arg("head.geojson")]);
    assert_eq!(error.kind(), "InvalidDataset");
}

#[test]
fn test_unicode_stem_and_attributes() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let feature = serde_json::json!({
        "type": "Feature",
        "properties": {"名前": "北京", "note": "café ☕"},
        "geometry": {"type": "Point", "coordinates": [116.4, 39.9]}
    });
    fixture.create_collection("base/städte.geojson", vec![]).unwrap();
    fixture.create_collection("head/städte.geojson", vec![feature]).unwrap();

    runner.expect_success(&[
        "batch",
        &fixture.arg("base"),
        &fixture.arg("head"),
        "--output-dir",
        &fixture.arg("out"),
    ]);
    assert_eq!(
        fs::read_to_string(fixture.root().join("out/städte.txt")).unwrap(),
        "Insert new feature 1\n"
    );
}

#[test]
fn test_ambiguous_stems_rejected() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture.create_collection("base/roads.json", vec![]).unwrap();
    fixture.create_collection("base/roads.geojson", vec![]).unwrap();
    fs::create_dir_all(fixture.root().join("head")).unwrap();

    let error = runner.expect_failure(&["batch", &fixture.arg("base"), &fixture.arg("head")]);
    assert!(error.to_string().contains("Ambiguous"));
}

#[cfg(unix)]
#[test]
fn test_readonly_output_directory() {
    use std::os::unix::fs::PermissionsExt;

    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fixture
        .create_collection("base.geojson", vec![sample_data::point_feature(1, 0.0, 0.0)])
        .unwrap();
    fixture
        .create_collection("head.geojson", vec![sample_data::point_feature(2, 0.0, 0.0)])
        .unwrap();

    let out = fixture.root().join("locked");
    fs::create_dir_all(&out).unwrap();
    fs::set_permissions(&out, fs::Permissions::from_mode(0o555)).unwrap();

    let result = runner.run_command(&[
        "diff",
        &fixture.arg("base.geojson"),
        &fixture.arg("head.geojson"),
        "--output-dir",
        out.to_str().unwrap(),
    ]);

    fs::set_permissions(&out, fs::Permissions::from_mode(0o755)).unwrap();

    // Running as root ignores directory permissions
    if let Err(error) = result {
        assert!(matches!(error, ShpdiffError::Io(_)));
    }
}

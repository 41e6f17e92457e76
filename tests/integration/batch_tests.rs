//! Integration tests for the batch command

use crate::common::{assertions, sample_data, CliTestRunner};
use serde_json::Value;
use shpdiff::output::BATCH_SUMMARY_FILE;
use shpdiff::ShpdiffError;
use std::fs;

#[test]
fn test_batch_pairs_stems_across_directories() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();

    fixture
        .create_collection("base/buildings.geojson", sample_data::base_features())
        .unwrap();
    fixture
        .create_collection("head/buildings.geojson", sample_data::head_features())
        .unwrap();
    fixture
        .create_collection("base/wells.geojson", vec![sample_data::point_feature(1, 5.0, 5.0)])
        .unwrap();
    fixture
        .create_collection("base/roads/primary.json", vec![sample_data::line_feature(1, &[[0.0, 0.0], [10.0, 0.0]])])
        .unwrap();
    fixture
        .create_collection("head/roads/primary.json", vec![sample_data::line_feature(1, &[[0.0, 0.0], [10.0, 0.0]])])
        .unwrap();

    runner.expect_success(&[
        "batch",
        &fixture.arg("base"),
        &fixture.arg("head"),
        "--output-dir",
        &fixture.arg("out"),
        "--jobs",
        "2",
    ]);

    let out = fixture.root().join("out");
    assertions::assert_svg_overlay(&out.join("buildings.svg"));
    assertions::assert_svg_overlay(&out.join("wells.svg"));
    assert_eq!(
        fs::read_to_string(out.join("wells.txt")).unwrap(),
        "Delete old feature 1\n"
    );
    assert_eq!(fs::read_to_string(out.join("roads/primary.txt")).unwrap(), "");
    assert!(!out.join("roads/primary.svg").exists());

    let summary: Value = serde_json::from_str(&fs::read_to_string(out.join(BATCH_SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(summary["summary"]["total"], 3);
    assert_eq!(summary["summary"]["unchanged"], 1);
    assert_eq!(summary["summary"]["changed"], serde_json::json!(["buildings", "wells"]));
}

#[test]
fn test_batch_failure_isolated_per_stem() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();

    fixture
        .create_collection("base/good.geojson", vec![sample_data::point_feature(1, 0.0, 0.0)])
        .unwrap();
    fixture
        .create_collection("head/good.geojson", vec![sample_data::point_feature(2, 0.0, 0.0)])
        .unwrap();
    fixture
        .create_collection("base/bad.geojson", vec![sample_data::point_feature(1, 0.0, 0.0)])
        .unwrap();
    fixture
        .create_collection("head/bad.geojson", vec![sample_data::collection_feature(1)])
        .unwrap();

    let error = runner.expect_failure(&[
        "batch",
        &fixture.arg("base"),
        &fixture.arg("head"),
        "--output-dir",
        &fixture.arg("out"),
        "--format",
        "json",
    ]);
    assert!(matches!(error, ShpdiffError::BatchFailed { failed: 1, total: 2 }));

    let out = fixture.root().join("out");
    assert!(out.join("good.json").exists());
    assertions::assert_svg_overlay(&out.join("good.svg"));
    assert!(!out.join("bad.json").exists());

    let summary: Value = serde_json::from_str(&fs::read_to_string(out.join(BATCH_SUMMARY_FILE)).unwrap()).unwrap();
    let failed = &summary["summary"]["failed"][0];
    assert_eq!(failed["stem"], "bad");
    assert_eq!(failed["kind"], "UnsupportedGeometryKind");
}

#[test]
fn test_batch_empty_directories() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fs::create_dir_all(fixture.root().join("base")).unwrap();
    fs::create_dir_all(fixture.root().join("head")).unwrap();

    runner.expect_success(&[
        "batch",
        &fixture.arg("base"),
        &fixture.arg("head"),
        "--output-dir",
        &fixture.arg("out"),
    ]);
    assertions::assert_json_contains_keys(&fixture.root().join("out").join(BATCH_SUMMARY_FILE), &["summary", "version"]).unwrap();
}

#[test]
fn test_batch_missing_directory() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    fs::create_dir_all(fixture.root().join("base")).unwrap();

    let error = runner.expect_failure(&["batch", &fixture.arg("base"), &fixture.arg("nope")]);
    assert!(matches!(error, ShpdiffError::InvalidInput { .. }));
}

#[test]
fn test_batch_write_failure_isolated_per_stem() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();

    for stem in ["a", "b"] {
        fixture
            .create_collection(&format!("base/{}.geojson", stem), vec![sample_data::point_feature(1, 0.0, 0.0)])
            .unwrap();
        fixture
            .create_collection(&format!("head/{}.geojson", stem), vec![sample_data::point_feature(2, 0.0, 0.0)])
            .unwrap();
    }
    // A directory where the report for "a" should go makes that write fail
    fs::create_dir_all(fixture.root().join("out/a.txt")).unwrap();

    let error = runner.expect_failure(&[
        "batch",
        &fixture.arg("base"),
        &fixture.arg("head"),
        "--output-dir",
        &fixture.arg("out"),
        "--no-render",
    ]);
    assert!(matches!(error, ShpdiffError::BatchFailed { failed: 1, total: 2 }));

    let out = fixture.root().join("out");
    assert_eq!(
        fs::read_to_string(out.join("b.txt")).unwrap(),
        "Replace old feature 1 with new feature 1\n"
    );

    let summary: Value = serde_json::from_str(&fs::read_to_string(out.join(BATCH_SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(summary["summary"]["failed"].as_array().unwrap().len(), 1);
    assert_eq!(summary["summary"]["failed"][0]["stem"], "a");
    assert_eq!(summary["summary"]["failed"][0]["kind"], "Io");
    assert_eq!(summary["summary"]["changed"], serde_json::json!(["b"]));
}

#[test]
fn test_batch_stem_named_summary_keeps_its_report() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();

    fixture
        .create_collection("base/summary.geojson", vec![sample_data::point_feature(1, 0.0, 0.0)])
        .unwrap();
    fixture
        .create_collection("head/summary.geojson", vec![sample_data::point_feature(2, 0.0, 0.0)])
        .unwrap();

    runner.expect_success(&[
        "batch",
        &fixture.arg("base"),
        &fixture.arg("head"),
        "--output-dir",
        &fixture.arg("out"),
        "--format",
        "json",
        "--no-render",
    ]);

    let out = fixture.root().join("out");
    let report: Value = serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(report["stem"], "summary");
    assert!(report.get("summary").is_none());

    let batch: Value = serde_json::from_str(&fs::read_to_string(out.join(BATCH_SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(batch["summary"]["changed"], serde_json::json!(["summary"]));
}

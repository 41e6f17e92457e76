//! Common test utilities and helpers

use serde_json::Value;
use shpdiff::{Result, ShpdiffConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary test environments
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the root path of the test fixture
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a `FeatureCollection` holding `features`, creating parent directories
    pub fn create_collection(&self, name: &str, features: Vec<Value>) -> Result<PathBuf> {
        let collection = serde_json::json!({
            "type": "FeatureCollection",
            "features": features,
        });
        self.create_json(name, &collection)
    }

    /// Write any JSON document
    pub fn create_json(&self, name: &str, data: &Value) -> Result<PathBuf> {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(data)?)?;
        Ok(path)
    }

    /// Write a file with raw content
    pub fn create_raw(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Path inside the fixture as a string argument
    pub fn arg(&self, name: &str) -> String {
        self.root().join(name).to_string_lossy().into_owned()
    }
}

/// Helper for running CLI commands in tests
pub struct CliTestRunner {
    fixture: TestFixture,
}

impl CliTestRunner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fixture: TestFixture::new()?,
        })
    }

    pub fn fixture(&self) -> &TestFixture {
        &self.fixture
    }

    /// Run a shpdiff command and return the result
    pub fn run_command(&self, args: &[&str]) -> Result<()> {
        use clap::Parser;
        use shpdiff::cli::Cli;
        use shpdiff::commands::execute_command;

        let mut cmd_args = vec!["shpdiff"];
        cmd_args.extend(args);

        let cli = Cli::try_parse_from(cmd_args)
            .map_err(|e| shpdiff::ShpdiffError::invalid_input(e.to_string()))?;

        let config = ShpdiffConfig::load(cli.config.as_deref())?;
        execute_command(cli.command, &config)
    }

    /// Run a command and expect it to succeed
    pub fn expect_success(&self, args: &[&str]) {
        self.run_command(args).expect("Command should succeed");
    }

    /// Run a command and expect it to fail
    pub fn expect_failure(&self, args: &[&str]) -> shpdiff::ShpdiffError {
        self.run_command(args).expect_err("Command should fail")
    }
}

/// Sample feature generators for testing
pub mod sample_data {
    use serde_json::{json, Value};

    pub fn point_feature(id: i64, x: f64, y: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": {"id": id, "name": format!("site-{}", id)},
            "geometry": {"type": "Point", "coordinates": [x, y]}
        })
    }

    pub fn line_feature(id: i64, coords: &[[f64; 2]]) -> Value {
        json!({
            "type": "Feature",
            "properties": {"id": id, "kind": "road"},
            "geometry": {"type": "LineString", "coordinates": coords}
        })
    }

    /// Axis-aligned square with corner `(x, y)` and edge `size`
    pub fn square_feature(id: i64, x: f64, y: f64, size: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": {"id": id, "kind": "parcel"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [x, y], [x + size, y], [x + size, y + size], [x, y + size], [x, y]
                ]]
            }
        })
    }

    pub fn collection_feature(id: i64) -> Value {
        json!({
            "type": "Feature",
            "properties": {"id": id},
            "geometry": {"type": "GeometryCollection", "coordinates": []}
        })
    }

    /// Three buildings; the base version of most scenarios
    pub fn base_features() -> Vec<Value> {
        vec![
            square_feature(1, 0.0, 0.0, 100.0),
            square_feature(2, 200.0, 0.0, 100.0),
            square_feature(3, 400.0, 0.0, 100.0),
        ]
    }

    /// Building 2 moved, building 4 appended
    pub fn head_features() -> Vec<Value> {
        vec![
            square_feature(1, 0.0, 0.0, 100.0),
            square_feature(2, 250.0, 0.0, 100.0),
            square_feature(3, 400.0, 0.0, 100.0),
            square_feature(4, 600.0, 0.0, 100.0),
        ]
    }
}

/// Assertion helpers for test validation
pub mod assertions {
    use shpdiff::Result;
    use std::path::Path;

    /// Assert that a file exists and is not empty
    pub fn assert_file_exists_and_not_empty(path: &Path) {
        assert!(path.exists(), "File should exist: {}", path.display());
        let metadata = std::fs::metadata(path).expect("Should be able to read file metadata");
        assert!(metadata.len() > 0, "File should not be empty: {}", path.display());
    }

    /// Assert that a JSON file contains expected keys
    pub fn assert_json_contains_keys(path: &Path, keys: &[&str]) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;

        for key in keys {
            assert!(json.get(key).is_some(), "JSON should contain key '{}': {}", key, path.display());
        }

        Ok(())
    }

    /// Assert that an SVG overlay is well-formed enough to open
    pub fn assert_svg_overlay(path: &Path) {
        assert_file_exists_and_not_empty(path);
        let svg = std::fs::read_to_string(path).expect("Should be able to read overlay");
        assert!(svg.starts_with("<?xml"), "Overlay should start with an XML declaration");
        assert!(svg.contains("<svg"), "Overlay should contain an svg element");
        assert!(svg.trim_end().ends_with("</svg>"), "Overlay should be closed");
    }
}

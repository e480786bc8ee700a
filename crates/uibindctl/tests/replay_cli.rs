use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const SCRIPT: &str = r#"
{
  "variables": [
    {
      "name": "Tint",
      "effect": "Tint.fx",
      "format": "float",
      "columns": 2,
      "annotations": { "ui_bind": "TINT" }
    },
    {
      "name": "Enabled",
      "effect": "Tint.fx",
      "format": "bool",
      "annotations": { "ui_bind": "TINT_ENABLED" }
    }
  ],
  "frames": [
    {
      "writes": [
        { "variable": "Tint", "values": [1.0, 0.5] },
        { "variable": "Enabled", "values": [true] },
        { "variable": "Enabled", "values": [false] }
      ]
    },
    { "effects_loaded": false, "writes": [{ "variable": "Tint", "values": [2, 4] }] },
    { "effects_loaded": true }
  ]
}
"#;

fn uibindctl(config_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_uibindctl"));
    command
        .env("UIBINDCTL_CONFIG_DIR", config_dir)
        .env_remove("UIBINDCTL_CONFIG")
        .env_remove("RUST_LOG");
    command
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "uibindctl failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn replay_json_reports_applied_definitions() {
    let root = TempDir::new().unwrap();
    let script = root.path().join("script.json");
    fs::write(&script, SCRIPT).unwrap();

    let output = uibindctl(root.path())
        .args(["replay", "--json"])
        .arg(&script)
        .output()
        .expect("failed to run uibindctl replay");
    let report: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();

    let frames = report["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 3);

    let first = frames[0]["applied"].as_array().unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first[0]["scope"], "Tint.fx");
    assert_eq!(first[0]["key"], "TINT");
    assert_eq!(first[0]["value"], "1.00000000e+00,5.00000000e-01");
    assert_eq!(first[1]["value"], "1");
    assert_eq!(first[2]["value"], "0");

    assert_eq!(frames[1]["deferred"], 1);
    assert!(frames[1]["applied"].as_array().unwrap().is_empty());
    assert_eq!(frames[2]["applied"][0]["value"], "2.00000000e+00,4.00000000e+00");

    let definitions = report["definitions"].as_array().unwrap();
    assert_eq!(definitions.len(), 2);
}

#[test]
fn config_file_selects_legacy_behaviour() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("uibind.toml"),
        r#"
version = 1

[format]
bool_style = "words"

[flush]
scope = "global"
"#,
    )
    .unwrap();
    let script = root.path().join("script.json");
    fs::write(&script, SCRIPT).unwrap();

    let output = uibindctl(root.path())
        .args(["replay"])
        .arg(&script)
        .output()
        .expect("failed to run uibindctl replay");
    let stdout = stdout_of(&output);

    assert!(stdout.contains("frame 0: applied 3 definition(s)"));
    assert!(stdout.contains("  TINT_ENABLED=true"));
    assert!(stdout.contains("  TINT_ENABLED=false"));
    assert!(stdout.contains("frame 1: deferred 1 binding(s); no effects loaded"));
    assert!(!stdout.contains("[Tint.fx]"));
}

#[test]
fn format_renders_row_major_by_default() {
    let root = TempDir::new().unwrap();

    let output = uibindctl(root.path())
        .args([
            "format", "--format", "int", "--rows", "2", "--columns", "2", "1", "-2", "3", "4",
        ])
        .output()
        .expect("failed to run uibindctl format");
    assert_eq!(stdout_of(&output).trim(), "1,-2,3,4");

    let output = uibindctl(root.path())
        .args([
            "format",
            "--format",
            "int",
            "--rows",
            "2",
            "--columns",
            "2",
            "--lane-order",
            "column-major",
            "1",
            "2",
            "3",
            "4",
        ])
        .output()
        .expect("failed to run uibindctl format");
    assert_eq!(stdout_of(&output).trim(), "1,0,2,0");
}

#[test]
fn invalid_script_fails() {
    let root = TempDir::new().unwrap();
    let script = root.path().join("broken.json");
    fs::write(
        &script,
        r#"{ "frames": [{ "writes": [{ "variable": "Missing", "values": [1] }] }] }"#,
    )
    .unwrap();

    let status = uibindctl(root.path())
        .arg("replay")
        .arg(&script)
        .status()
        .expect("failed to run uibindctl replay");
    assert!(!status.success());
}

#[test]
fn format_rejects_surplus_values() {
    let root = TempDir::new().unwrap();

    let output = uibindctl(root.path())
        .args(["format", "--format", "int", "--columns", "2", "1", "2", "3"])
        .output()
        .expect("failed to run uibindctl format");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("3 values given for a 1x2 uniform"));
}

#[test]
fn config_where_reports_directory() {
    let root = TempDir::new().unwrap();

    let output = uibindctl(root.path())
        .args(["config", "where"])
        .output()
        .expect("failed to run uibindctl config where");
    let stdout = stdout_of(&output);
    assert!(stdout.contains(&root.path().display().to_string()));
    assert!(stdout.contains("(missing)"));
}

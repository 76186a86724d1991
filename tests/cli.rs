//! End-to-end tests of the `seird` binary

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn seird() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_seird"));
    command.env("RUST_LOG", "warn");
    command
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("seird.toml");
    fs::write(
        &path,
        r#"
[spatial]
shape = [12, 10]
time_steps = 20

[lumped]
t_end = 30.0
evaluation_points = 31

[output]
start_date = "2021-01-01"
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_lumped_run_writes_both_formats() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let output = dir.path().join("out");

    let status = seird()
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(&output)
        .args(["--format", "both", "lumped"])
        .status()
        .unwrap();
    assert!(status.success());

    let csv = fs::read_to_string(output.join("lumped_metrics.csv")).unwrap();
    let data_lines: Vec<&str> = csv.lines().filter(|line| !line.starts_with('#')).collect();
    assert_eq!(data_lines[0], "Date,Time,Cases,Deaths,Recoveries");
    assert!(data_lines[1].starts_with("2021-01-01,0.000000,"));
    assert!(data_lines[31].starts_with("2021-01-31,30.000000,"));
    assert_eq!(data_lines.len(), 1 + 31);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(output.join("lumped_metrics.json")).unwrap()).unwrap();
    assert_eq!(json["start_date"], "2021-01-01");
    assert_eq!(json["data"].as_array().unwrap().len(), 31);
    assert_eq!(json["time"][30], 30.0);

    assert!(output.join("lumped_trajectory.csv").exists());
    assert!(output.join("lumped_trajectory.json").exists());
}

#[test]
fn test_spatial_run_writes_field() {
    let dir = tempdir().unwrap();
    let config = write_config(dir.path());
    let output = dir.path().join("grid");

    let status = seird()
        .arg("--config")
        .arg(&config)
        .arg("--output-dir")
        .arg(&output)
        .arg("spatial")
        .status()
        .unwrap();
    assert!(status.success());

    let field = fs::read_to_string(output.join("spatial_field.csv")).unwrap();
    let data_lines: Vec<&str> = field.lines().filter(|line| !line.starts_with('#')).collect();
    assert_eq!(data_lines[0], "x,y,S,E,I,R,D");
    assert_eq!(data_lines.len(), 1 + 12 * 10);
    assert!(output.join("spatial_metrics.csv").exists());
}

#[test]
fn test_config_command_prints_toml() {
    let output = seird().arg("config").output().unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("[parameters]"));
    assert!(text.contains("[lumped.tolerance]"));
    assert!(text.contains("start_date = \"2020-03-04\""));
}

#[test]
fn test_invalid_config_exits_non_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[parameters]\ndeath_rate = -1.0\n").unwrap();

    let output = seird().arg("--config").arg(&path).arg("lumped").output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("death_rate"));
}

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PAGE_URL: &str = "https://www.youtube.com/feed/subscriptions";

#[allow(deprecated)]
fn get_tubelinks_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("tubelinks")
}

fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

fn scan(output_dir: &Path) -> Command {
    let mut cmd = Command::new(get_tubelinks_bin());
    cmd.arg("scan")
        .arg(fixture_path("subscriptions.html"))
        .arg("--page-url")
        .arg(PAGE_URL)
        .arg("--delay-ms")
        .arg("0")
        .arg("--output-dir")
        .arg(output_dir)
        .arg("--no-interactive")
        .arg("--yes");
    cmd
}

/// The single CSV written into `dir`
fn exported_csv(dir: &Path) -> (String, String) {
    let entries: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one export");

    let path = &entries[0];
    let name = path.file_name().unwrap().to_str().unwrap().to_string();
    (name, std::fs::read_to_string(path).unwrap())
}

#[test]
fn test_scan_exports_page_row_by_default() {
    let temp_dir = TempDir::new().unwrap();

    scan(temp_dir.path()).assert().success();

    let (name, csv) = exported_csv(temp_dir.path());
    assert!(name.starts_with("links_"));
    assert!(name.ends_with(".csv"));
    let stem = name.strip_suffix(".csv").unwrap();
    assert!(!stem.contains(':') && !stem.contains('.'));

    assert_eq!(
        csv,
        "链接地址,标题\n\"https://www.youtube.com/feed/subscriptions\",\"Subscriptions - YouTube\"\n"
    );
}

#[test]
fn test_scan_select_all_exports_every_video() {
    let temp_dir = TempDir::new().unwrap();

    scan(temp_dir.path()).arg("--select-all").assert().success();

    let (_, csv) = exported_csv(temp_dir.path());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "链接地址,标题",
            "\"https://www.youtube.com/watch?v=dQw4w9WgXcQ\",\"Never Gonna Give You Up\"",
            "\"https://www.youtube.com/watch?v=9bZkp7q19f0&t=42s\",\"\"\"Gangnam Style\"\", live\"",
            "\"https://www.youtube.com/watch?v=loading\",\"无标题\"",
            "\"https://www.youtube.com/feed/subscriptions\",\"Subscriptions - YouTube\"",
        ]
    );
}

#[test]
fn test_scan_rows_flag_adds_to_selection() {
    let temp_dir = TempDir::new().unwrap();

    scan(temp_dir.path()).arg("--rows").arg("2").assert().success();

    let (_, csv) = exported_csv(temp_dir.path());
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("9bZkp7q19f0"));
    assert!(!csv.contains("dQw4w9WgXcQ"));
}

#[test]
fn test_scan_rejects_row_out_of_range() {
    let temp_dir = TempDir::new().unwrap();

    scan(temp_dir.path())
        .arg("--rows")
        .arg("12")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn test_scan_dry_run_json_lists_rows() {
    let temp_dir = TempDir::new().unwrap();

    let output = scan(temp_dir.path())
        .arg("--dry-run")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3]["checked"], true);
    assert_eq!(rows[0]["checked"], false);
    assert_eq!(json["export_enabled"], true);

    // Nothing exported on a dry run
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_scan_page_title_override() {
    let temp_dir = TempDir::new().unwrap();

    scan(temp_dir.path())
        .arg("--page-title")
        .arg("My feed")
        .assert()
        .success();

    let (_, csv) = exported_csv(temp_dir.path());
    assert!(csv.ends_with("\"https://www.youtube.com/feed/subscriptions\",\"My feed\"\n"));
}

#[test]
fn test_scan_missing_file_is_acquisition_failure() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::new(get_tubelinks_bin());
    cmd.arg("scan")
        .arg(temp_dir.path().join("missing.html"))
        .arg("--page-url")
        .arg(PAGE_URL)
        .arg("--delay-ms")
        .arg("0")
        .arg("--no-interactive");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("获取链接失败"));
}

#[test]
fn test_scan_delay_from_env() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::new(get_tubelinks_bin());
    cmd.env("TUBELINKS_DELAY_MS", "0")
        .env("TUBELINKS_OUTPUT_DIR", temp_dir.path())
        .arg("scan")
        .arg(fixture_path("subscriptions.html"))
        .arg("--page-url")
        .arg(PAGE_URL)
        .arg("--no-interactive");

    cmd.assert().success();
    exported_csv(temp_dir.path());
}

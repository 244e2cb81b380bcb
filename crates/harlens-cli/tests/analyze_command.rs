use assert_cmd::Command;
use harlens_core::ConfigOverrides;
use harlens_report::{ReportMode, TRUNCATION_MARKER};
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn get_harlens_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("harlens")
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Command isolated from any user config file or HARLENS_* variables
fn harlens(config_home: &TempDir) -> Command {
    let mut cmd = Command::new(get_harlens_bin());
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("HARLENS_SLOW_THRESHOLD_MS")
        .env_remove("HARLENS_LARGE_RESPONSE_KB")
        .env_remove("HARLENS_MAX_DETAILED_ENTRIES")
        .env_remove("HARLENS_MAX_REPORT_CHARS")
        .env_remove("HARLENS_MAX_BODY_CHARS")
        .env_remove("HARLENS_PRIORITY_DOMAINS");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_summary_report_totals() {
    let home = TempDir::new().unwrap();
    harlens(&home)
        .arg("analyze")
        .arg(fixture("sample.har"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# HAR Analysis Report"))
        .stdout(predicate::str::contains("- **Total Requests:** 9"))
        .stdout(predicate::str::contains("**404:** 1"))
        .stdout(predicate::str::contains("- **First-Party Domain:** shop.example.com"))
        .stdout(predicate::str::contains("## Errors (1)"))
        .stdout(predicate::str::contains("- **Bytes saved by compression:** 800B"));
}

#[test]
fn test_cross_domain_cookie_reported() {
    let home = TempDir::new().unwrap();
    harlens(&home)
        .arg("analyze")
        .arg(fixture("sample.har"))
        .assert()
        .success()
        .stdout(predicate::str::contains("### Cross-Domain Cookies (1)"))
        .stdout(predicate::str::contains(
            "- `uid` sent to 2 domains (pixel.adtracker.io, shop.example.com), same value",
        ));
}

#[test]
fn test_plain_http_finding_once_per_domain() {
    let home = TempDir::new().unwrap();
    let report = stdout_of(harlens(&home).arg("analyze").arg(fixture("sample.har")));

    assert_eq!(
        report.matches("**HTTP (no TLS)** on legacy.example.org").count(),
        1
    );
    assert!(report.contains("**HTTP (no TLS)** on legacy.example.org (2 requests)"));
    assert!(report.contains("Bearer JWT (alg: HS256)"));
}

#[test]
fn test_forensic_detail_limit() {
    let home = TempDir::new().unwrap();
    let report = stdout_of(
        harlens(&home)
            .arg("analyze")
            .arg(fixture("sample.har"))
            .args(["--mode", "forensic", "--max-detailed-entries", "3"]),
    );

    assert!(report.starts_with("# HAR Forensic Report"));
    assert!(report.contains("## Detailed Entries (showing 3 of 9)"));
    assert!(report.contains("_... and 6 more entries not shown in detail_"));
    assert!(report.contains("## API Surface"));
    // the 404 and the slow POST outrank everything else
    let detail = &report[report.find("## Detailed Entries").unwrap()..];
    assert!(detail.contains("### 1. GET https://shop.example.com/api/products/1042"));
    assert!(detail.contains("### 2. POST https://shop.example.com/api/cart/items"));
}

#[test]
fn test_report_respects_character_budget() {
    let home = TempDir::new().unwrap();
    let report = stdout_of(
        harlens(&home)
            .arg("analyze")
            .arg(fixture("sample.har"))
            .args(["--max-report-chars", "500"]),
    );
    let report = report.trim_end_matches('\n');

    assert_eq!(report.chars().count(), 500);
    assert!(report.ends_with(TRUNCATION_MARKER.trim_start()));
}

#[test]
fn test_budget_from_environment() {
    let home = TempDir::new().unwrap();
    let report = stdout_of(
        harlens(&home)
            .env("HARLENS_MAX_REPORT_CHARS", "300")
            .arg("analyze")
            .arg(fixture("sample.har")),
    );
    assert!(report.trim_end_matches('\n').chars().count() <= 300);
}

#[test]
fn test_report_is_deterministic() {
    let home = TempDir::new().unwrap();
    let args = ["--mode", "forensic"];
    let first = stdout_of(harlens(&home).arg("analyze").arg(fixture("sample.har")).args(args));
    let second = stdout_of(harlens(&home).arg("analyze").arg(fixture("sample.har")).args(args));
    assert_eq!(first, second);
}

#[test]
fn test_malformed_capture() {
    let home = TempDir::new().unwrap();
    harlens(&home)
        .arg("analyze")
        .arg(fixture("malformed.har"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Error parsing HAR file:"));
}

#[test]
fn test_empty_capture() {
    let home = TempDir::new().unwrap();
    harlens(&home)
        .arg("analyze")
        .arg(fixture("empty.har"))
        .assert()
        .success()
        .stdout("No entries found in HAR file\n");
}

#[test]
fn test_missing_file_fails() {
    let home = TempDir::new().unwrap();
    harlens(&home)
        .arg("analyze")
        .arg(fixture("does-not-exist.har"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read HAR file"));
}

#[test]
fn test_json_output_statistics() {
    let home = TempDir::new().unwrap();
    let output = stdout_of(
        harlens(&home)
            .args(["--format", "json", "analyze"])
            .arg(fixture("sample.har")),
    );
    let stats: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(stats["total_requests"], 9);
    let status_total: u64 = stats["status_codes"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(status_total, 9);
    assert_eq!(stats["status_codes"]["404"], 1);
    assert_eq!(stats["errors"]["items"][0]["status"], 404);
    assert_eq!(stats["compression"]["savings"], 800);
}

#[test]
fn test_config_file_overrides_preset() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.json");
    std::fs::write(&config, r#"{"max_domains": 1}"#).unwrap();

    harlens(&home)
        .arg("analyze")
        .arg(fixture("sample.har"))
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("## Domains (4)"))
        .stdout(predicate::str::contains("_... and 3 more domains_"));
}

#[test]
fn test_flags_win_over_config_file() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("harlens.json");
    std::fs::write(&config_path, r#"{"max_report_chars": 100, "max_domains": 2}"#).unwrap();

    let config = harlens_cli::commands::analyze::load_config(
        ReportMode::Summary,
        Some(&config_path),
        ConfigOverrides {
            max_report_chars: Some(5000),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.max_report_chars, 5000);
    assert_eq!(config.max_domains, 2);
    assert_eq!(config.max_errors, 30);
}

#[test]
fn test_analyze_file_returns_report() {
    let config = harlens_core::ReportConfig::summary();
    let report = harlens_cli::commands::analyze::analyze_file(
        &fixture("sample.har"),
        ReportMode::Summary,
        &config,
    )
    .unwrap();
    assert!(report.contains("## Real-Time Communication"));
    assert!(report.contains("### WebSocket Connections (1)"));
}

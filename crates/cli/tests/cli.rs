use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let output_dir = dir.path().join("output");
    let config = format!(
        r#"
[general]
output_dir = "{}"

[apps.demo]
name = "Terra Nova"
description = "Choices, spaceships and pop culture shenanigans"
category = "Text-based games"
key_features = ["Ad free", "Original gameplay"]
target_audience = "Gamers aged 13-60"
app_url = "https://play.google.com/store/apps/details?id=com.example.terranova"
"#,
        output_dir.display()
    );
    let path = dir.path().join("config.toml");
    fs::write(&path, config).expect("write config");
    path
}

fn write_campaign(output_dir: &Path, id: &str) {
    fs::create_dir_all(output_dir).expect("create output dir");
    let record = serde_json::json!({
        "facebook": {
            "platform": "facebook",
            "app_url": "https://play.google.com/store/apps/details?id=com.example.terranova",
            "headline": "Conquer the Galaxy!",
            "body_text": "Your choices matter 🚀",
            "hashtags": ["#TerraNova", "#IndieGame"],
            "call_to_action": "Download now",
            "suggested_image_description": "A spaceship drifting past a ringed planet",
            "timestamp": "2025-09-09T16:06:47Z"
        },
        "twitter": {
            "platform": "twitter",
            "app_url": "https://play.google.com/store/apps/details?id=com.example.terranova",
            "headline": "Space, but funny",
            "body_text": "Mine asteroids. Laugh at the jokes.",
            "hashtags": ["#indiedev"],
            "call_to_action": "Play free",
            "suggested_image_description": "An asteroid field at dawn",
            "timestamp": "2025-09-09T16:06:47Z"
        }
    });
    fs::write(
        output_dir.join(format!("{id}.json")),
        serde_json::to_string_pretty(&record).unwrap(),
    )
    .expect("write campaign");
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("ad-poster");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("output_dir"));
    assert!(content.contains("[gemini]"));
    assert!(content.contains("[apps.example_app]"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "# existing").expect("write existing");

    let mut cmd = cargo_bin_cmd!("ad-poster");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn generate_dry_run_saves_only_supported_platforms() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("ad-poster");
    cmd.args([
        "generate",
        "--app",
        "demo",
        "--platforms",
        "facebook,bogus_platform",
        "--dry-run",
        "--skip-images",
        "--config",
    ])
    .arg(&config_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("All ads saved to:"));

    let output_dir = dir.path().join("output");
    let files: Vec<_> = fs::read_dir(&output_dir)
        .expect("read output dir")
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    assert_eq!(files.len(), 1);

    let record: Value =
        serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).expect("valid json");
    let platforms: Vec<&String> = record.as_object().unwrap().keys().collect();
    assert_eq!(platforms, ["facebook"]);
    assert_eq!(record["facebook"]["headline"], "Discover Terra Nova");
}

#[test]
fn generate_rejects_unknown_app() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("ad-poster");
    cmd.args(["generate", "--app", "nope", "--dry-run", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown app"));
}

#[test]
fn post_dry_run_records_success_per_platform() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    let output_dir = dir.path().join("output");
    write_campaign(&output_dir, "ads_20250909_160647");

    let mut cmd = cargo_bin_cmd!("ad-poster");
    cmd.args([
        "post",
        "--campaign",
        "ads_20250909_160647",
        "--dry-run",
        "--config",
    ])
    .arg(&config_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("facebook: success"))
    .stdout(predicate::str::contains("twitter: success"));

    let record: Value = serde_json::from_str(
        &fs::read_to_string(output_dir.join("ads_20250909_160647.json")).unwrap(),
    )
    .expect("valid json");
    assert_eq!(record["facebook"]["posting_status"], "success");
    assert_eq!(record["twitter"]["posting_status"], "success");
    assert!(record["facebook"]["post_time"].is_string());
}

#[test]
fn post_without_campaigns_fails_cleanly() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("ad-poster");
    cmd.args(["post", "--dry-run", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No campaigns found"));
}

#[test]
fn campaigns_list_reports_empty_store() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("ad-poster");
    cmd.args(["campaigns", "list", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No campaigns found"));
}

#[test]
fn campaigns_show_outputs_the_record_as_json() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    write_campaign(&dir.path().join("output"), "ads_20250909_160647");

    let mut cmd = cargo_bin_cmd!("ad-poster");
    let output = cmd
        .args([
            "campaigns",
            "show",
            "--campaign",
            "ads_20250909_160647",
            "--json",
            "--config",
        ])
        .arg(&config_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let record: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(record["facebook"]["headline"], "Conquer the Galaxy!");
    assert_eq!(record["facebook"]["body_text"], "Your choices matter 🚀");
}

#[test]
fn campaigns_delete_removes_the_record() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    let output_dir = dir.path().join("output");
    write_campaign(&output_dir, "ads_20250909_160647");

    let mut cmd = cargo_bin_cmd!("ad-poster");
    cmd.args([
        "campaigns",
        "delete",
        "--campaign",
        "ads_20250909_160647",
        "--config",
    ])
    .arg(&config_path)
    .assert()
    .success();

    assert!(!output_dir.join("ads_20250909_160647.json").exists());
}

#[test]
fn doctor_reports_status_as_json() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("ad-poster");
    let output = cmd
        .env("GOOGLE_API_KEY", "test-key")
        .args(["doctor", "--json", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(report["config"]["status"], "ok");
    assert_eq!(report["gemini"]["status"], "ok");
    // All platforms disabled in the test config
    assert_eq!(report["facebook"]["status"], "warn");
    assert_eq!(report["overall"], "warn");
}

//! Tests driving the `gos` binary
//!
//! Only failure paths that are decided before any network access are
//! covered here; provider round trips live in the adapter crates.

use std::process::{Command, Output};

use tempfile::TempDir;

/// `gos` with an isolated home directory and no backend environment
fn gos_command(home: &TempDir, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_gos"));
    command
        .args(args)
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("GOS_CONFIG")
        .env_remove("STORAGE_TYPE")
        .env_remove("RUST_LOG");
    command
}

fn gos(home: &TempDir, args: &[&str]) -> Output {
    gos_command(home, args)
        .output()
        .expect("Failed to execute gos")
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    let output = gos(&home, &["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("gos "));
}

#[test]
fn test_missing_backend_is_usage_error() {
    let home = TempDir::new().unwrap();
    let output = gos(&home, &["ls", "--json"]);

    assert_eq!(output.status.code(), Some(2), "Exit code should be 2");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json: serde_json::Value =
        serde_json::from_str(&stderr).expect("Error output should be valid JSON");
    assert!(json["error"].as_str().unwrap().contains("No backend configured"));
}

#[test]
fn test_unknown_storage_type_is_rejected() {
    let home = TempDir::new().unwrap();
    let output = gos(&home, &["--type", "azure", "demo"]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_type_without_bucket_is_usage_error() {
    let home = TempDir::new().unwrap();
    let output = gos_command(&home, &["--type", "gcs", "demo"])
        .env_remove("GCS_BUCKET")
        .output()
        .expect("Failed to execute gos");

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("GCS_BUCKET"));
}

#[test]
fn test_invalid_config_file_is_usage_error() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("backend.toml");
    std::fs::write(&config, "type = \"s3\"\nbucket = \"\"\n").unwrap();

    let output = gos(&home, &["--config", config.to_str().unwrap(), "ls"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Bucket name cannot be empty"));
}

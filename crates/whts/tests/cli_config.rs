#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "whts-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn config(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_whts"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .arg("config")
        .args(args)
        .env("WHTS_STORE", store)
        .output()
        .expect("config command should run")
}

#[test]
fn add_list_and_copy() {
    let dir = unique_temp_dir("config");
    let store = dir.join("store.json");

    let out = config(
        &store,
        &["add", "line-a", "--slave", "0x1234:8:4:1:0", "--slave", "0x5678:8:4:1:0"],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let out = config(&store, &["copy", "line-a"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "line-a_copy");

    let out = config(&store, &["copy", "line-a"]);
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "line-a_copy(2)");

    let out = config(&store, &["list"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("\"name\":\"line-a\""));
    assert!(stdout.contains("\"name\":\"line-a_copy(2)\""));
    assert!(stdout.contains("\"slaveNum\":2"));
    assert!(stdout.contains("\"id\":4660"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn remove_unknown_fails() {
    let dir = unique_temp_dir("remove");
    let store = dir.join("store.json");

    let out = config(&store, &["remove", "missing"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_slave_spec_is_usage_error() {
    let dir = unique_temp_dir("badspec");
    let store = dir.join("store.json");

    let out = config(&store, &["add", "x", "--slave", "1:999"]);
    assert_eq!(out.status.code(), Some(64));
    assert!(!store.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

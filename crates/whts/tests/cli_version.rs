#![cfg(feature = "cli")]

use std::process::Command;

#[test]
fn extended_version_reports_build_metadata() {
    let output = Command::new(env!("CARGO_BIN_EXE_whts"))
        .args(["version", "--extended"])
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
    assert!(stdout.lines().any(|l| l.starts_with("profile: ") && !l.ends_with("unknown")));
    let features = stdout
        .lines()
        .find_map(|l| l.strip_prefix("features: "))
        .expect("features line");
    assert!(features.split(',').any(|f| f == "cli"));
    assert!(stdout.contains("log_filter_env: WHTS_LOG"));
}

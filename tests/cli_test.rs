// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use assert_cmd::Command;
use predicates::prelude::*;

fn site_check_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_site-check"));
    cmd.env("RUST_LOG", "info").env("FETCH_TIMEOUT_SECS", "2");
    cmd
}

#[test]
fn test_check_prints_only_json_on_stdout() {
    // Nothing listens on port 1, so the analyzer degrades and logs a warning
    let output = site_check_cmd()
        .args(["check", "http://127.0.0.1:1/", "--category", "seo"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(stdout.trim()).expect("valid JSON");
    assert_eq!(json["score"], 0);
    assert!(json["error"].is_string());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("analysis failed"));
}

#[test]
fn test_check_rejects_unsupported_scheme() {
    site_check_cmd()
        .args(["check", "ftp://example.com/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme"));
}

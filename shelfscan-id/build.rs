//! Build script for shelfscan-id
//!
//! Stamps the binary with the commit and build time so a report can be traced
//! back to the engine that produced it. `main` shows the combined string in
//! `--version` and in the startup log line.

use std::process::Command;

fn git_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let hash = git_hash();
    let built = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    println!(
        "cargo:rustc-env=SHELFSCAN_BUILD_INFO={} (git {}, built {}, {})",
        version, hash, built, profile
    );
}

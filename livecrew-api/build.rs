//! Stamps the binary with `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE`
//!
//! Source tarballs have no `.git`; packagers set `LIVECREW_GIT_HASH` instead.

use std::env;
use std::process::Command;

fn git_hash() -> String {
    if let Ok(hash) = env::var("LIVECREW_GIT_HASH") {
        return hash;
    }

    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let stamp = [
        ("GIT_HASH", git_hash()),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ),
        (
            "BUILD_PROFILE",
            env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ];
    for (key, value) in stamp {
        println!("cargo:rustc-env={}={}", key, value);
    }
}

//! Stamps the binary with the commit and date it was built from, for
//! `quest-chronicles --version`.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Short hash of HEAD, or "unknown" outside a git checkout.
fn git_commit() -> String {
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output();
    match output {
        Ok(o) if o.status.success() => {
            let hash = String::from_utf8_lossy(&o.stdout).trim().to_string();
            if hash.is_empty() {
                "unknown".to_string()
            } else {
                hash
            }
        }
        _ => "unknown".to_string(),
    }
}

fn main() {
    let commit = env::var("BUILD_COMMIT").unwrap_or_else(|_| git_commit());
    let date = env::var("BUILD_DATE")
        .unwrap_or_else(|_| chrono::Utc::now().format("%Y-%m-%d").to_string());
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    let generated = [
        format!("pub const BUILD_COMMIT: &str = {:?};", commit),
        format!("pub const BUILD_DATE: &str = {:?};", date),
        format!("pub const PKG_VERSION: &str = {:?};", version),
    ]
    .join("\n");

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("build_info.rs"), generated).expect("write build_info.rs");

    println!("cargo:rerun-if-changed=.git/HEAD");
    for var in ["BUILD_COMMIT", "BUILD_DATE"] {
        println!("cargo:rerun-if-env-changed={}", var);
    }
}

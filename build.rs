//! Build script for the TACO server
//!
//! Embeds a monotonically increasing build number, the build timestamp and
//! the cargo profile so the status tool can report exactly what is running.

use std::fs;
use std::path::PathBuf;

const COUNTER_FILE: &str = "build_number.txt";

fn read_counter(path: &PathBuf) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=TACO_BUILD_NUMBER");

    // CI can pin the number; local builds bump the counter file
    let build_number = match std::env::var("TACO_BUILD_NUMBER") {
        Ok(pinned) => pinned.trim().parse().unwrap_or(0),
        Err(_) => {
            let counter = PathBuf::from(COUNTER_FILE);
            let next = read_counter(&counter) + 1;
            fs::write(&counter, next.to_string()).expect("Failed to write build number file");
            next
        }
    };

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=TACO_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=TACO_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=TACO_BUILD_PROFILE={}", profile);
}

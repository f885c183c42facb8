//! Build information
//!
//! Compile-time constants emitted by `build.rs`.

use serde::Serialize;

/// Build number, incremented on each recompilation
pub const BUILD_NUMBER: u64 = match option_env!("TACO_BUILD_NUMBER") {
    Some(s) => match parse_u64(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("TACO_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Cargo profile the binary was built with (debug/release)
pub const BUILD_PROFILE: &str = match option_env!("TACO_BUILD_PROFILE") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

const fn parse_u64(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut result: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b < b'0' || b > b'9' {
            return None;
        }
        result = result * 10 + (b - b'0') as u64;
        i += 1;
    }
    Some(result)
}

/// Serializable snapshot of the build constants
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            profile: BUILD_PROFILE,
        }
    }

    /// One-line banner, e.g. `taco 1.0.0 (build 12, release, 2026-01-01T00:00:00Z)`
    pub fn banner(&self) -> String {
        format!(
            "{} {} (build {}, {}, {})",
            self.name, self.version, self.build_number, self.profile, self.build_timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("42"), Some(42));
        assert_eq!(parse_u64(""), None);
        assert_eq!(parse_u64("4x"), None);
    }

    #[test]
    fn test_banner_contains_version() {
        let info = BuildInfo::current();
        assert!(info.banner().starts_with("taco "));
        assert!(info.banner().contains(VERSION));
    }
}

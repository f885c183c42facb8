//! Runtime configuration
//!
//! Everything is read from the environment so the server can be launched
//! by an MCP client without a config file.

use std::path::PathBuf;

pub const DATABASE_PATH_VAR: &str = "TACO_DATABASE_PATH";
pub const PRELOAD_SQL_VAR: &str = "TACO_PRELOAD_SQL";
pub const POOL_SIZE_VAR: &str = "TACO_POOL_SIZE";

const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// SQL file with the reference table inserts, imported when `foods` is empty
    pub preload_sql: Option<PathBuf>,
    pub pool_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let preload_sql = lookup(PRELOAD_SQL_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let pool_size = lookup(POOL_SIZE_VAR)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_POOL_SIZE);

        Self {
            database_path,
            preload_sql,
            pool_size,
        }
    }
}

/// `<project>/data/taco.db`, resolved relative to the executable
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("taco.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[]));
        assert!(config.database_path.ends_with("data/taco.db"));
        assert!(config.preload_sql.is_none());
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (DATABASE_PATH_VAR, "/tmp/x.db"),
            (PRELOAD_SQL_VAR, "/tmp/taco_preload.sql"),
            (POOL_SIZE_VAR, "4"),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.preload_sql, Some(PathBuf::from("/tmp/taco_preload.sql")));
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn test_invalid_pool_size_falls_back() {
        let config = AppConfig::from_lookup(lookup_from(&[(POOL_SIZE_VAR, "0")]));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        let config = AppConfig::from_lookup(lookup_from(&[(POOL_SIZE_VAR, "many")]));
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
    }
}

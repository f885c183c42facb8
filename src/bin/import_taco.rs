//! Utility to load the TACO reference table into the database
//!
//! Usage: `import_taco [path/to/taco.sql]`. The path defaults to
//! `TACO_PRELOAD_SQL`. Foods whose code is already present are skipped, so
//! existing ids and every diet item referencing them are kept.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use taco::config::{AppConfig, PRELOAD_SQL_VAR};
use taco::db::{migrations, seed, DataChange, Database};
use taco::models::NutrientRecord;

const USAGE: &str = "Usage: import_taco [path/to/taco.sql]";

/// Parse the command line into an optional SQL file path
fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Option<PathBuf>, String> {
    let mut sql_path = None;
    for arg in args {
        if arg.starts_with("--") {
            return Err(format!("Unknown option: {}", arg));
        }
        if sql_path.is_some() {
            return Err(format!("Unexpected argument: {}", arg));
        }
        sql_path = Some(PathBuf::from(arg));
    }
    Ok(sql_path)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("taco=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let sql_path = match parse_args(std::env::args().skip(1)) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let config = AppConfig::from_env();
    let sql_path = sql_path
        .or(config.preload_sql.clone())
        .ok_or_else(|| format!("No SQL file given and {} is not set", PRELOAD_SQL_VAR))?;

    println!("Database path: {}", config.database_path.display());
    println!("Importing: {}", sql_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path, 1)?;
    database.with_conn(|conn| migrations::run_migrations(conn))?;

    let report = database.write(DataChange::Foods, |conn| seed::import_preload_file(conn, &sql_path))?;

    let total = database.with_conn(NutrientRecord::count)?;
    println!("Executed: {}", report.executed);
    println!("Skipped:  {}", report.failed);
    println!("Foods in table: {}", total);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_path() {
        assert_eq!(parse_args(args(&[])).unwrap(), None);
        assert_eq!(
            parse_args(args(&["data/taco.sql"])).unwrap(),
            Some(PathBuf::from("data/taco.sql"))
        );
    }

    #[test]
    fn test_parse_args_rejects_flags() {
        assert!(parse_args(args(&["--help"])).is_err());
        assert!(parse_args(args(&["--replace", "taco.sql"])).is_err());
        assert!(parse_args(args(&["a.sql", "b.sql"])).is_err());
    }
}

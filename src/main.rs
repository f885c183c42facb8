//! TACO Diet Tracker
//!
//! An MCP server for food composition lookup and diet planning.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use taco::build_info::BuildInfo;
use taco::config::AppConfig;
use taco::db::{self, Database};
use taco::mcp::TacoService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("taco=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    eprintln!("{}", BuildInfo::current().banner());
    eprintln!("Starting MCP server on stdio...");

    let config = AppConfig::from_env();
    eprintln!("Database path: {}", config.database_path.display());

    // Ensure data directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path, config.pool_size)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        tracing::info!(version, "database ready");
        Ok(())
    })?;

    if let Some(ref preload) = config.preload_sql {
        let report = database.with_conn_mut(|conn| db::seed::seed_if_empty(conn, preload))?;
        if let Some(report) = report {
            eprintln!("Imported reference table: {} statements, {} skipped", report.executed, report.failed);
            database.notify(db::DataChange::Foods);
        }
    }

    let mut changes = database.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => tracing::debug!(?change, "data changed"),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "change log lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let service = TacoService::new(config.database_path.clone(), database);

    // Create stdio transport
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}

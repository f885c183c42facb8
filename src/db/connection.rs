//! Database connection management
//!
//! Provides SQLite connection pooling and management.

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tokio::sync::broadcast;

use super::notify::{ChangeNotifier, DataChange};

/// Database error types
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid data: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Connection pool plus the change notifier shared by every clone.
///
/// Constructed once by the binary and passed by reference to whatever
/// needs storage.
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
    notifier: ChangeNotifier,
}

fn init_connection(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;",
    )
}

impl Database {
    /// Open (or create) the database file with a pool of `max_size` connections
    pub fn new<P: AsRef<Path>>(path: P, max_size: u32) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(init_connection);

        let pool = Pool::builder().max_size(max_size).build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
            notifier: ChangeNotifier::new(),
        })
    }

    /// Single-connection in-memory database.
    ///
    /// Every in-memory connection is its own database, so the pool is
    /// capped at one.
    pub fn in_memory() -> DbResult<Self> {
        let manager = SqliteConnectionManager::memory().with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });
        let pool = Pool::builder().max_size(1).build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
            notifier: ChangeNotifier::new(),
        })
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Execute a closure with a database connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Execute a closure with a mutable database connection (for transactions)
    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DbResult<T>,
    {
        let mut conn = self.get_conn()?;
        f(&mut conn)
    }

    /// Run a write and publish `change` once it succeeded
    pub fn write<F, T>(&self, change: DataChange, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DbResult<T>,
    {
        let result = self.with_conn_mut(f)?;
        self.notifier.publish(change);
        Ok(result)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataChange> {
        self.notifier.subscribe()
    }

    pub fn notify(&self, change: DataChange) {
        self.notifier.publish(change);
    }
}

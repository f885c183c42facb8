//! Database module
//!
//! SQLite connection pool, migrations, change notification and the
//! reference dataset bootstrap.

pub mod connection;
pub mod migrations;
pub mod notify;
pub mod seed;

pub use connection::{Database, DbError, DbResult};
pub use notify::{ChangeNotifier, DataChange};

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;

    /// Fresh in-memory database with foreign keys on and the schema applied
    pub fn memory_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        super::migrations::run_migrations(&conn).unwrap();
        conn
    }
}

//! # Ganacert Persistence
//!
//! SQLite implementations of the store interfaces defined in
//! `ganacert-business`, plus the database facade that owns pool creation
//! and schema initialization.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ganacert_persistence::Database;
//!
//! let db = Database::open(Path::new("data/ganacert.db")).await?;
//! db.init().await?;
//! let store = db.store(); // implements every store trait
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::{SqliteStore, SCHEMA_SQL};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Database facade - pool creation and schema setup.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) a database file.
    pub async fn open(db_path: &Path) -> PersistenceResult<Self> {
        let url = format!("sqlite:{}?mode=rwc", db_path.display());
        let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Single-connection in-memory database, for tests and demos.
    pub async fn in_memory() -> PersistenceResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Create tables and indexes. Idempotent.
    pub async fn init(&self) -> PersistenceResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store handle implementing every store interface.
    pub fn store(&self) -> SqliteStore {
        SqliteStore::new(self.pool.clone())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

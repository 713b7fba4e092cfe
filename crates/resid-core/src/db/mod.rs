//! Canonical record store with connection pooling and migrations
//!
//! The storage side of the ingestion contract: canonical records are
//! upserted keyed by (processor, month, merchant_id) with the revenue
//! comparison applied on conflict, so re-uploading overlapping data is
//! idempotent and never regresses to lower revenue.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod records;

pub use records::{ImportStats, RecordUpsert};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) a database at `path` and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: uses a temporary file rather than `:memory:` because each
    /// pooled connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!("resid_test_{}_{}.db", std::process::id(), id));
        let path = path.to_string_lossy().to_string();

        let _ = std::fs::remove_file(&path);
        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Clear all record data but preserve the schema
    pub fn reset(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch("DELETE FROM records;")?;
        info!("Database reset complete");
        Ok(())
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Canonical revenue records, one per (processor, month, merchant)
            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY,
                processor TEXT NOT NULL,
                month TEXT NOT NULL,
                merchant_id TEXT NOT NULL,
                merchant_name TEXT NOT NULL,
                branch_id TEXT,
                -- Projected revenue, stored so the upsert conflict rule can
                -- compare without deserializing figures
                revenue REAL NOT NULL,
                -- Processor-keyed figures as JSON (tagged union)
                figures TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(processor, month, merchant_id)
            );

            CREATE INDEX IF NOT EXISTS idx_records_month ON records(month);
            CREATE INDEX IF NOT EXISTS idx_records_processor ON records(processor);
            "#,
        )?;

        Ok(())
    }
}

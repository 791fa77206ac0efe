/// Database modules organized by feature
mod migrations;
mod rules;
mod settings;
mod store;

pub use store::RuleStore;
#[cfg(test)]
pub(crate) use store::tests::UnreachableStore;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tracing::info;

/// Database connection pool wrapper
///
/// Holds the turn-on and turn-off rule tables and the persisted settings.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        info!("Database connected and migrations completed");
        Ok(db)
    }

    /// Private in-memory database; a single connection keeps it alive
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Get a reference to the connection pool (for internal use)
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

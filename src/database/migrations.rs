use super::Database;
use crate::models::Table;
use sqlx::Error as SqlxError;

impl Database {
    /// Run database migrations to create tables
    pub(super) async fn run_migrations(&self) -> Result<(), SqlxError> {
        self.create_rule_table(Table::On).await?;
        self.create_rule_table(Table::Off).await?;
        self.create_settings_table().await?;
        Ok(())
    }

    /// Both namespaces share one layout; ids autoincrement per table
    async fn create_rule_table(&self, table: Table) -> Result<(), SqlxError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rule_name TEXT NOT NULL DEFAULT '',
                hour INTEGER NOT NULL CHECK (hour BETWEEN 0 AND 23),
                minutes INTEGER NOT NULL CHECK (minutes BETWEEN 0 AND 59),
                sun BOOLEAN NOT NULL DEFAULT FALSE,
                mon BOOLEAN NOT NULL DEFAULT FALSE,
                tue BOOLEAN NOT NULL DEFAULT FALSE,
                wed BOOLEAN NOT NULL DEFAULT FALSE,
                thu BOOLEAN NOT NULL DEFAULT FALSE,
                fri BOOLEAN NOT NULL DEFAULT FALSE,
                sat BOOLEAN NOT NULL DEFAULT FALSE,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                mode TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            table.sql_name()
        );

        sqlx::query(&sql).execute(self.pool()).await?;
        Ok(())
    }

    async fn create_settings_table(&self) -> Result<(), SqlxError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }
}

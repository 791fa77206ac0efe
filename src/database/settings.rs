use tracing::warn;

use super::Database;
use crate::models::{Mode, Settings};
use crate::utils::validation::validate_notification_time;
use sqlx::Error as SqlxError;

const USE_LOCALTIME: &str = "use_localtime";
const DEFAULT_MODE: &str = "default_mode";
const SHUTDOWN_FAIL: &str = "shutdown_fail";
const NOTIFICATION_TIME: &str = "notification_time";

impl Database {
    /// Get the persisted settings (defaults for anything not stored)
    pub async fn get_settings(&self) -> Result<Settings, SqlxError> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(self.pool())
            .await?;

        let mut settings = Settings::default();
        for (key, value) in rows {
            let applied = match key.as_str() {
                USE_LOCALTIME => value.parse::<bool>().map(|v| settings.use_localtime = v).is_ok(),
                SHUTDOWN_FAIL => value.parse::<bool>().map(|v| settings.shutdown_fail = v).is_ok(),
                DEFAULT_MODE => value
                    .parse::<Mode>()
                    .map(|v| settings.default_mode = v)
                    .is_ok(),
                NOTIFICATION_TIME => value
                    .parse::<u8>()
                    .ok()
                    .filter(|v| validate_notification_time(*v).is_ok())
                    .map(|v| settings.notification_time = v)
                    .is_some(),
                _ => true,
            };
            if !applied {
                warn!("Ignoring invalid setting {} = '{}'", key, value);
            }
        }

        Ok(settings)
    }

    /// Persist every setting
    pub async fn set_settings(&self, settings: &Settings) -> Result<(), SqlxError> {
        let values = [
            (USE_LOCALTIME, settings.use_localtime.to_string()),
            (DEFAULT_MODE, settings.default_mode.to_string()),
            (SHUTDOWN_FAIL, settings.shutdown_fail.to_string()),
            (NOTIFICATION_TIME, settings.notification_time.to_string()),
        ];

        let mut tx = self.pool().begin().await?;
        for (key, value) in values {
            sqlx::query(
                r#"
                INSERT INTO settings (key, value, updated_at)
                VALUES (?, ?, CURRENT_TIMESTAMP)
                ON CONFLICT (key)
                DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }
}

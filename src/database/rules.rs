use async_trait::async_trait;
use tracing::debug;

use super::{Database, RuleStore};
use crate::error::{Error, Result};
use crate::models::{Mode, Rule, RuleId, Table, WeekDays};
use crate::utils::validation::validate_time_of_day;

const RULE_COLUMNS: &str =
    "id, rule_name, hour, minutes, sun, mon, tue, wed, thu, fri, sat, active, mode";

/// Raw row of `rules_turnon` / `rules_turnoff`
#[derive(sqlx::FromRow)]
struct RuleRow {
    id: i64,
    rule_name: String,
    hour: i64,
    minutes: i64,
    sun: bool,
    mon: bool,
    tue: bool,
    wed: bool,
    thu: bool,
    fri: bool,
    sat: bool,
    active: bool,
    mode: Option<String>,
}

impl RuleRow {
    fn into_rule(self, table: Table) -> Result<Rule> {
        let id = self.id;
        let corrupt = |reason: String| Error::CorruptRule { table, id, reason };

        let hour = u8::try_from(self.hour).map_err(|_| corrupt(format!("hour {}", self.hour)))?;
        let minutes =
            u8::try_from(self.minutes).map_err(|_| corrupt(format!("minutes {}", self.minutes)))?;
        validate_time_of_day(hour, minutes).map_err(|e| corrupt(e.to_string()))?;

        let mode = match self.mode.as_deref() {
            None => None,
            Some(name) => Some(
                name.parse::<Mode>()
                    .map_err(|name| corrupt(format!("unknown mode '{}'", name)))?,
            ),
        };

        Ok(Rule {
            id,
            name: self.rule_name,
            hour,
            minutes,
            days: WeekDays::new([
                self.sun, self.mon, self.tue, self.wed, self.thu, self.fri, self.sat,
            ]),
            active: self.active,
            mode,
            table,
        })
    }
}

#[async_trait]
impl RuleStore for Database {
    async fn get_all(&self, table: Table) -> Result<Vec<Rule>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", RULE_COLUMNS, table.sql_name());
        let rows: Vec<RuleRow> = sqlx::query_as(&sql).fetch_all(self.pool()).await?;

        rows.into_iter().map(|row| row.into_rule(table)).collect()
    }

    async fn get_single(&self, id: RuleId, table: Table) -> Result<Rule> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", RULE_COLUMNS, table.sql_name());
        let row: Option<RuleRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.ok_or(Error::NotFound { table, id })?.into_rule(table)
    }

    async fn add(&self, rule: &Rule) -> Result<RuleId> {
        let sql = format!(
            r#"
            INSERT INTO {} (rule_name, hour, minutes, sun, mon, tue, wed, thu, fri, sat, active, mode)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            rule.table.sql_name()
        );
        let days = rule.days.as_array();

        let result = sqlx::query(&sql)
            .bind(rule.name.as_str())
            .bind(i64::from(rule.hour))
            .bind(i64::from(rule.minutes))
            .bind(days[0])
            .bind(days[1])
            .bind(days[2])
            .bind(days[3])
            .bind(days[4])
            .bind(days[5])
            .bind(days[6])
            .bind(rule.active)
            .bind(rule.mode.map(Mode::as_str))
            .execute(self.pool())
            .await?;

        let id = result.last_insert_rowid();
        debug!("Inserted {} rule {}", rule.table, id);
        Ok(id)
    }

    async fn edit(&self, rule: &Rule) -> Result<()> {
        let sql = format!(
            r#"
            UPDATE {}
            SET rule_name = ?, hour = ?, minutes = ?,
                sun = ?, mon = ?, tue = ?, wed = ?, thu = ?, fri = ?, sat = ?,
                active = ?, mode = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            rule.table.sql_name()
        );
        let days = rule.days.as_array();

        let result = sqlx::query(&sql)
            .bind(rule.name.as_str())
            .bind(i64::from(rule.hour))
            .bind(i64::from(rule.minutes))
            .bind(days[0])
            .bind(days[1])
            .bind(days[2])
            .bind(days[3])
            .bind(days[4])
            .bind(days[5])
            .bind(days[6])
            .bind(rule.active)
            .bind(rule.mode.map(Mode::as_str))
            .bind(rule.id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound {
                table: rule.table,
                id: rule.id,
            });
        }
        Ok(())
    }

    async fn delete(&self, id: RuleId, table: Table) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", table.sql_name());
        let result = sqlx::query(&sql).bind(id).execute(self.pool()).await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound { table, id });
        }
        Ok(())
    }

    async fn enable_disable(&self, id: RuleId, table: Table, active: bool) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET active = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            table.sql_name()
        );
        let result = sqlx::query(&sql)
            .bind(active)
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound { table, id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn wake_rule() -> Rule {
        Rule::new(
            Table::On,
            "Work days",
            7,
            45,
            WeekDays::from_weekdays([Weekday::Mon, Weekday::Fri]),
        )
    }

    #[tokio::test]
    async fn test_add_then_get_single_round_trip() {
        let db = Database::in_memory().await.unwrap();
        let rule = Rule::new(Table::Off, "Night", 23, 30, WeekDays::ALL).with_mode(Mode::Disk);

        let id = db.add(&rule).await.unwrap();
        assert_ne!(id, 0);

        let stored = db.get_single(id, Table::Off).await.unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(Rule { id: 0, ..stored }, rule);
    }

    #[tokio::test]
    async fn test_ids_are_per_table() {
        let db = Database::in_memory().await.unwrap();
        let on_id = db.add(&wake_rule()).await.unwrap();

        assert!(matches!(
            db.get_single(on_id, Table::Off).await,
            Err(Error::NotFound { table: Table::Off, .. })
        ));
        assert_eq!(db.get_all(Table::On).await.unwrap().len(), 1);
        assert!(db.get_all(Table::Off).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_all_is_ordered_by_id() {
        let db = Database::in_memory().await.unwrap();
        let first = db.add(&wake_rule()).await.unwrap();
        let second = db.add(&Rule::new(Table::On, "", 6, 0, WeekDays::NONE)).await.unwrap();

        let ids: Vec<RuleId> = db.get_all(Table::On).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn test_edit_replaces_wholesale() {
        let db = Database::in_memory().await.unwrap();
        let id = db.add(&wake_rule()).await.unwrap();

        let mut edited = Rule::new(Table::On, "", 9, 0, WeekDays::NONE);
        edited.id = id;
        edited.active = false;
        db.edit(&edited).await.unwrap();

        assert_eq!(db.get_single(id, Table::On).await.unwrap(), edited);
    }

    #[tokio::test]
    async fn test_edit_missing_rule_is_not_found() {
        let db = Database::in_memory().await.unwrap();
        let mut rule = wake_rule();
        rule.id = 42;

        assert!(matches!(db.edit(&rule).await, Err(Error::NotFound { id: 42, .. })));
    }

    #[tokio::test]
    async fn test_delete_is_not_idempotent() {
        let db = Database::in_memory().await.unwrap();
        let id = db.add(&wake_rule()).await.unwrap();

        db.delete(id, Table::On).await.unwrap();
        assert!(matches!(db.delete(id, Table::On).await, Err(Error::NotFound { .. })));
        assert!(matches!(db.get_single(id, Table::On).await, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_enable_disable_only_touches_active() {
        let db = Database::in_memory().await.unwrap();
        let rule = wake_rule();
        let id = db.add(&rule).await.unwrap();

        db.enable_disable(id, Table::On, false).await.unwrap();
        let stored = db.get_single(id, Table::On).await.unwrap();
        assert!(!stored.active);
        assert_eq!(Rule { id: 0, active: true, ..stored }, rule);

        assert!(matches!(
            db.enable_disable(id + 1, Table::On, true).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_mode_is_reported_as_corrupt() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query("INSERT INTO rules_turnoff (rule_name, hour, minutes, mode) VALUES ('x', 1, 2, 'bogus')")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(matches!(
            db.get_all(Table::Off).await,
            Err(Error::CorruptRule { table: Table::Off, .. })
        ));
    }
}

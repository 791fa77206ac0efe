use tracing::debug;

use crate::database::RuleStore;
use crate::error::Result;
use crate::models::{Rule, RuleId, Table, WeekDays};

/// Point-in-time view of one table's active rules
///
/// The snapshot is never synced with the store: call [`refresh`] after a
/// commit that should be visible. Dropping the validator releases it.
///
/// [`refresh`]: ConflictValidator::refresh
#[derive(Debug)]
pub struct ConflictValidator {
    table: Table,
    snapshot: Vec<Rule>,
}

impl ConflictValidator {
    /// Snapshot the active rules of `table`, in store order
    pub async fn init<S: RuleStore + ?Sized>(store: &S, table: Table) -> Result<Self> {
        let mut validator = Self {
            table,
            snapshot: Vec::new(),
        };
        validator.refresh(store).await?;
        Ok(validator)
    }

    /// Re-read the table from the store
    pub async fn refresh<S: RuleStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        self.snapshot = store
            .get_all(self.table)
            .await?
            .into_iter()
            .filter(|rule| rule.active)
            .collect();
        debug!(
            "Conflict snapshot of {} rules holds {} active rule(s)",
            self.table,
            self.snapshot.len()
        );
        Ok(())
    }

    /// Release the snapshot
    pub fn finalize(self) {}

    /// First rule other than `self_id` firing at exactly `hour:minutes` on a
    /// shared day, in snapshot order
    pub fn validate_time(
        &self,
        self_id: Option<RuleId>,
        hour: u8,
        minutes: u8,
        days: &WeekDays,
    ) -> Option<RuleId> {
        self.snapshot
            .iter()
            .filter(|rule| Some(rule.id) != self_id)
            .filter(|rule| rule.hour == hour && rule.minutes == minutes)
            .find(|rule| rule.days.intersects(days))
            .map(|rule| rule.id)
    }

    /// Conflict check for a candidate rule
    ///
    /// Inactive candidates and candidates from the other table never
    /// conflict; a persisted candidate ignores its own stored version.
    pub fn check(&self, candidate: &Rule) -> Option<RuleId> {
        if !candidate.active || candidate.table != self.table {
            return None;
        }

        let self_id = candidate.is_persisted().then_some(candidate.id);
        self.validate_time(self_id, candidate.hour, candidate.minutes, &candidate.days)
    }
}

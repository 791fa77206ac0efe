use tracing::{info, warn};

use super::ConflictValidator;
use crate::database::RuleStore;
use crate::error::{Error, Result};
use crate::models::{Rule, RuleId, Table};
use crate::utils::message_formatter::RuleSummary;
use crate::utils::validation::validate_rule;

/// What a commit does with the candidate rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Edit(RuleId),
}

/// Add, edit, delete and toggle rules, re-validating conflicts every time
pub struct RuleLifecycle<'a, S: RuleStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RuleStore + ?Sized> RuleLifecycle<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and persist `rule`, returning its refreshed summary
    pub async fn commit(&self, operation: Operation, mut rule: Rule) -> Result<RuleSummary> {
        validate_rule(&rule)?;

        match operation {
            Operation::Add => rule.id = 0,
            Operation::Edit(id) => {
                // Must exist in the same table; tables never change
                self.store.get_single(id, rule.table).await?;
                rule.id = id;
            }
        }

        let validator = ConflictValidator::init(self.store, rule.table).await?;
        let conflict = validator.check(&rule);
        validator.finalize();
        if let Some(id) = conflict {
            warn!("{} rule conflicts with rule {}", rule.table, id);
            return Err(Error::Conflict {
                table: rule.table,
                id,
            });
        }

        let id = match operation {
            Operation::Add => self.store.add(&rule).await?,
            Operation::Edit(id) => {
                self.store.edit(&rule).await?;
                id
            }
        };
        info!("Committed {} rule {} ({:?})", rule.table, id, operation);

        self.summary(id, rule.table).await
    }

    pub async fn delete(&self, id: RuleId, table: Table) -> Result<()> {
        self.store.delete(id, table).await?;
        info!("Deleted {} rule {}", table, id);
        Ok(())
    }

    /// Toggle a rule; enabling it is rejected if it would conflict
    pub async fn set_active(&self, id: RuleId, table: Table, active: bool) -> Result<RuleSummary> {
        let mut rule = self.store.get_single(id, table).await?;

        if active {
            rule.active = true;
            let validator = ConflictValidator::init(self.store, table).await?;
            if let Some(conflict) = validator.check(&rule) {
                return Err(Error::Conflict {
                    table,
                    id: conflict,
                });
            }
        }

        self.store.enable_disable(id, table, active).await?;
        info!(
            "{} {} rule {}",
            if active { "Enabled" } else { "Disabled" },
            table,
            id
        );
        self.summary(id, table).await
    }

    pub async fn summary(&self, id: RuleId, table: Table) -> Result<RuleSummary> {
        let rule = self.store.get_single(id, table).await?;
        Ok(RuleSummary::from(&rule))
    }

    /// List view of a table
    pub async fn summaries(&self, table: Table) -> Result<Vec<RuleSummary>> {
        let rules = self.store.get_all(table).await?;
        Ok(rules.iter().map(RuleSummary::from).collect())
    }
}

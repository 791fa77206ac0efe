use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Rule, RuleId, Table};

/// Durable rule CRUD, keyed by `(Table, id)`
///
/// Every mutation has completed when the call returns. Rules handed out are
/// always in range; rows that are not surface as `Error::CorruptRule`.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Every rule in the table, in id order
    async fn get_all(&self, table: Table) -> Result<Vec<Rule>>;

    async fn get_single(&self, id: RuleId, table: Table) -> Result<Rule>;

    /// Persist a new rule and return its fresh, non-zero id
    async fn add(&self, rule: &Rule) -> Result<RuleId>;

    /// Replace the record matching `rule.id` in `rule.table` wholesale
    async fn edit(&self, rule: &Rule) -> Result<()>;

    /// Remove a record; deleting a missing id is `Error::NotFound`
    async fn delete(&self, id: RuleId, table: Table) -> Result<()>;

    /// Change only the active flag
    async fn enable_disable(&self, id: RuleId, table: Table, active: bool) -> Result<()>;
}

use crate::models::{RuleId, Table};
use crate::utils::validation::ValidationError;

/// Errors reported by the rule engine
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{table} rule {id} not found")]
    NotFound { table: Table, id: RuleId },

    #[error("invalid value: {0}")]
    Invalid(#[from] ValidationError),

    #[error("conflicts with {table} rule {id}")]
    Conflict { table: Table, id: RuleId },

    #[error("store: {0}")]
    Store(#[from] sqlx::Error),

    #[error("{table} rule {id} is corrupt: {reason}")]
    CorruptRule {
        table: Table,
        id: RuleId,
        reason: String,
    },

    #[error("no active {0} rule can fire")]
    NoUpcomingRule(Table),

    #[error("{program} failed: {message}")]
    OsCall { program: String, message: String },

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

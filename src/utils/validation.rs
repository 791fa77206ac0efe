use crate::constants::{NOTIFICATION_TIME_MAX, NOTIFICATION_TIME_MIN, RULE_NAME_MAX_LENGTH};
use crate::models::{Rule, Table};

/// Validation error types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("hour {0} is outside 0-23")]
    HourOutOfRange(u8),
    #[error("minutes {0} is outside 0-59")]
    MinutesOutOfRange(u8),
    #[error("name is {length} characters long, at most {max} allowed")]
    NameTooLong { length: usize, max: usize },
    #[error("turn-off rules need a mode")]
    MissingMode,
    #[error("turn-on rules do not carry a mode")]
    UnexpectedMode,
    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate { year: u16, month: u8, day: u8 },
    #[error("{0} is in the past")]
    InPast(String),
    #[error("expected HH:MM, got '{0}'")]
    InvalidTime(String),
    #[error("expected YYYY-MM-DD, got '{0}'")]
    InvalidDateFormat(String),
    #[error("unknown day '{0}'")]
    UnknownDay(String),
    #[error("notification time {0} is outside {min}-{max} minutes", min = NOTIFICATION_TIME_MIN, max = NOTIFICATION_TIME_MAX)]
    NotificationTimeOutOfRange(u8),
}

/// Check that an hour/minutes pair is a wall-clock time
pub fn validate_time_of_day(hour: u8, minutes: u8) -> Result<(), ValidationError> {
    if hour > 23 {
        return Err(ValidationError::HourOutOfRange(hour));
    }
    if minutes > 59 {
        return Err(ValidationError::MinutesOutOfRange(minutes));
    }
    Ok(())
}

/// Validate the caller-supplied fields of a rule before it is committed
pub fn validate_rule(rule: &Rule) -> Result<(), ValidationError> {
    let length = rule.name.chars().count();
    if length > RULE_NAME_MAX_LENGTH {
        return Err(ValidationError::NameTooLong {
            length,
            max: RULE_NAME_MAX_LENGTH,
        });
    }

    validate_time_of_day(rule.hour, rule.minutes)?;

    match (rule.table, rule.mode) {
        (Table::Off, None) => Err(ValidationError::MissingMode),
        (Table::On, Some(_)) => Err(ValidationError::UnexpectedMode),
        _ => Ok(()),
    }
}

pub fn validate_notification_time(minutes: u8) -> Result<(), ValidationError> {
    if (NOTIFICATION_TIME_MIN..=NOTIFICATION_TIME_MAX).contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::NotificationTimeOutOfRange(minutes))
    }
}

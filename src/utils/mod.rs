/// Utility modules for common functionality
pub mod datetime;
pub mod message_formatter;
pub mod messages;
pub mod repeats;
pub mod schedule_utils;
pub mod validation;

/// Log directive for the application
pub const LOG_DIRECTIVE: &str = "wakerule=info";

/// Database used when `WAKERULE_DATABASE_URL` is not set
pub const DEFAULT_DATABASE_URL: &str = "sqlite://wakerule.db?mode=rwc";

/// rtcwake binary used when `WAKERULE_RTCWAKE` is not set
pub const DEFAULT_RTCWAKE_PATH: &str = "rtcwake";

/// Maximum length for rule names
pub const RULE_NAME_MAX_LENGTH: usize = 32;

/// Name shown for rules stored without one
pub const UNNAMED_RULE: &str = "Unnamed rule";

/// Seconds the confirmation countdown starts from
pub const COUNTDOWN_START: u32 = 5;

/// Upper bound for the watch loop sleep, so rule edits are picked up
pub const RESCAN_INTERVAL_SECS: u64 = 300;

/// Allowed range for the shutdown notification lead time, in minutes
pub const NOTIFICATION_TIME_MIN: u8 = 1;
pub const NOTIFICATION_TIME_MAX: u8 = 60;

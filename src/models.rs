use std::fmt;
use std::str::FromStr;

use chrono::Weekday;

use crate::constants::NOTIFICATION_TIME_MIN;

/// Store-assigned rule handle, unique within its table
pub type RuleId = i64;

/// Id carried by a rule that has not been persisted yet
pub const NEW_RULE_ID: RuleId = 0;

/// Rule namespace: turn-on rules wake the machine, turn-off rules shut it down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Table {
    On,
    Off,
}

impl Table {
    /// SQL table holding this namespace
    pub fn sql_name(self) -> &'static str {
        match self {
            Table::On => "rules_turnon",
            Table::Off => "rules_turnoff",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::On => write!(f, "turn-on"),
            Table::Off => write!(f, "turn-off"),
        }
    }
}

/// rtcwake suspend/shutdown strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Mode {
    Standby,
    Freeze,
    Mem,
    Disk,
    Off,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Standby, Mode::Freeze, Mode::Mem, Mode::Disk, Mode::Off];

    /// Name understood by `rtcwake --mode`
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Standby => "standby",
            Mode::Freeze => "freeze",
            Mode::Mem => "mem",
            Mode::Disk => "disk",
            Mode::Off => "off",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

/// "Repeats on" set, indexed Sunday = 0 through Saturday = 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekDays([bool; 7]);

impl WeekDays {
    pub const NONE: WeekDays = WeekDays([false; 7]);
    pub const ALL: WeekDays = WeekDays([true; 7]);

    pub fn new(days: [bool; 7]) -> Self {
        Self(days)
    }

    /// Build a set from individual weekdays
    pub fn from_weekdays<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        let mut set = Self::NONE;
        for day in days {
            set.set(day, true);
        }
        set
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0[day.num_days_from_sunday() as usize]
    }

    pub fn set(&mut self, day: Weekday, selected: bool) {
        self.0[day.num_days_from_sunday() as usize] = selected;
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|selected| **selected).count()
    }

    /// True when at least one day is selected in both sets
    pub fn intersects(&self, other: &WeekDays) -> bool {
        self.0.iter().zip(other.0.iter()).any(|(a, b)| *a && *b)
    }

    /// Selected days in Sunday-first order
    pub fn selected(&self) -> impl Iterator<Item = Weekday> + '_ {
        SUNDAY_FIRST
            .into_iter()
            .filter(move |day| self.contains(*day))
    }

    pub fn as_array(&self) -> [bool; 7] {
        self.0
    }
}

/// Weekdays in storage order
pub const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A recurring wake or shutdown rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub hour: u8,
    pub minutes: u8,
    pub days: WeekDays,
    pub active: bool,
    /// Only set for turn-off rules
    pub mode: Option<Mode>,
    pub table: Table,
}

impl Rule {
    /// A new, not yet persisted, active rule
    pub fn new(table: Table, name: impl Into<String>, hour: u8, minutes: u8, days: WeekDays) -> Self {
        Self {
            id: NEW_RULE_ID,
            name: name.into(),
            hour,
            minutes,
            days,
            active: true,
            mode: None,
            table,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id != NEW_RULE_ID
    }
}

/// Persisted preferences read by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Compute weekdays and program the RTC in local time instead of UTC
    pub use_localtime: bool,
    /// Mode preselected for new turn-off rules and custom schedules
    pub default_mode: Mode,
    /// Still power off when no wake could be armed
    pub shutdown_fail: bool,
    /// Minutes of notice logged before a turn-off rule fires
    pub notification_time: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_localtime: true,
            default_mode: Mode::Off,
            shutdown_fail: false,
            notification_time: NOTIFICATION_TIME_MIN,
        }
    }
}

/// "Repeats on" summary of a rule's day set
use std::fmt;

use chrono::Weekday;

use crate::models::WeekDays;

/// Display bucket for a day set; exactly one applies to any set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repeats {
    EveryDay,
    Weekdays,
    Weekends,
    Single(Weekday),
    AnyDay,
    Listed(Vec<Weekday>),
}

impl Repeats {
    pub fn classify(days: &WeekDays) -> Self {
        use Weekday::*;

        let is_weekend = |day: &Weekday| matches!(day, Sun | Sat);
        let selected: Vec<Weekday> = days.selected().collect();

        match selected.len() {
            7 => Repeats::EveryDay,
            0 => Repeats::AnyDay,
            1 => Repeats::Single(selected[0]),
            5 if selected.iter().all(|day| !is_weekend(day)) => Repeats::Weekdays,
            2 if selected.iter().all(is_weekend) => Repeats::Weekends,
            _ => Repeats::Listed(selected),
        }
    }
}

/// Plural day name, as in "Tuesdays"
pub fn plural_day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sundays",
        Weekday::Mon => "Mondays",
        Weekday::Tue => "Tuesdays",
        Weekday::Wed => "Wednesdays",
        Weekday::Thu => "Thursdays",
        Weekday::Fri => "Fridays",
        Weekday::Sat => "Saturdays",
    }
}

impl fmt::Display for Repeats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repeats::EveryDay => f.write_str("Every day"),
            Repeats::Weekdays => f.write_str("Weekdays"),
            Repeats::Weekends => f.write_str("Weekends"),
            Repeats::Single(day) => f.write_str(plural_day_name(*day)),
            Repeats::AnyDay => f.write_str("Any day"),
            Repeats::Listed(days) => {
                let names: Vec<&str> = days.iter().map(|day| plural_day_name(*day)).collect();
                f.write_str(&names.join(", "))
            }
        }
    }
}

/// Summary text for a day set
pub fn repeats_summary(days: &WeekDays) -> String {
    Repeats::classify(days).to_string()
}

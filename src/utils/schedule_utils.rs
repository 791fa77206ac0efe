/// Pure weekly schedule calculations
use chrono::{Datelike, Days, NaiveDateTime, NaiveTime};

use crate::models::WeekDays;

/// Format time as HH:MM
pub fn format_time_hhmm(hour: u8, minute: u8) -> String {
    format!("{:02}:{:02}", hour, minute)
}

/// Next instant strictly after `now` at which a weekly rule fires.
///
/// Returns `None` for an empty day set, which can never fire. A rule whose
/// day is today but whose time has passed rolls over to next week.
pub fn next_occurrence(
    hour: u8,
    minutes: u8,
    days: &WeekDays,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(hour as u32, minutes as u32, 0)?;
    let today = now.weekday().num_days_from_sunday();

    days.selected()
        .filter_map(|day| {
            let offset = (7 + day.num_days_from_sunday() - today) % 7;
            let candidate = now
                .date()
                .checked_add_days(Days::new(offset as u64))?
                .and_time(time);
            if candidate > now {
                Some(candidate)
            } else {
                candidate.checked_add_days(Days::new(7))
            }
        })
        .min()
}

/// Whole minutes from `now` until `at`, rounded up
pub fn minutes_until(now: NaiveDateTime, at: NaiveDateTime) -> i64 {
    let seconds = (at - now).num_seconds();
    (seconds + 59).div_euclid(60)
}

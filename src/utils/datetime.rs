/// Clock access and date/time parsing
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};

use crate::models::WeekDays;
use crate::utils::validation::ValidationError;

/// Current wall-clock time, truncated to the second, in local time or UTC
pub fn now(use_localtime: bool) -> NaiveDateTime {
    let now = if use_localtime {
        Local::now().naive_local()
    } else {
        Utc::now().naive_utc()
    };
    now.with_nanosecond(0).unwrap_or(now)
}

/// Parse a time string in HH:MM format
pub fn parse_time_string(time_str: &str) -> Result<(u8, u8), ValidationError> {
    let time = NaiveTime::parse_from_str(time_str.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidTime(time_str.to_string()))?;
    Ok((time.hour() as u8, time.minute() as u8))
}

/// Parse a date string in YYYY-MM-DD format into (year, month, day)
pub fn parse_date_string(date_str: &str) -> Result<(u16, u8, u8), ValidationError> {
    let parts: Vec<&str> = date_str.trim().split('-').collect();
    let invalid = || ValidationError::InvalidDateFormat(date_str.to_string());
    let [year, month, day] = parts.as_slice() else {
        return Err(invalid());
    };

    Ok((
        year.parse().map_err(|_| invalid())?,
        month.parse().map_err(|_| invalid())?,
        day.parse().map_err(|_| invalid())?,
    ))
}

/// Check that a (year, month, day) triple exists in the calendar
pub fn calendar_date(year: u16, month: u8, day: u8) -> Result<NaiveDate, ValidationError> {
    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).ok_or(
        ValidationError::InvalidDate { year, month, day },
    )
}

/// Parse a comma separated day list such as "mon,wed", "weekdays" or "every"
pub fn parse_days(days_str: &str) -> Result<WeekDays, ValidationError> {
    let mut days = WeekDays::NONE;

    for part in days_str.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "every" | "all" | "daily" => days = WeekDays::ALL,
            "none" => {}
            "weekdays" => {
                for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
                    days.set(day, true);
                }
            }
            "weekends" => {
                days.set(Weekday::Sun, true);
                days.set(Weekday::Sat, true);
            }
            other => {
                let day = other
                    .parse::<Weekday>()
                    .map_err(|_| ValidationError::UnknownDay(part.to_string()))?;
                days.set(day, true);
            }
        }
    }

    Ok(days)
}

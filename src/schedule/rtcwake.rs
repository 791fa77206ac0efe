use std::fmt;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, info};

use super::WakeTimer;
use crate::database::RuleStore;
use crate::error::{Error, Result};
use crate::models::{Mode, Rule, Table};
use crate::utils::datetime::calendar_date;
use crate::utils::schedule_utils::next_occurrence;
use crate::utils::validation::{ValidationError, validate_time_of_day};

/// One-shot absolute wake specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtcwakeArgs {
    pub hour: u8,
    pub minutes: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
    pub mode: Mode,
}

impl RtcwakeArgs {
    pub fn from_datetime(at: NaiveDateTime, mode: Mode) -> Self {
        Self {
            hour: at.hour() as u8,
            minutes: at.minute() as u8,
            day: at.day() as u8,
            month: at.month() as u8,
            year: at.year().clamp(0, u16::MAX as i32) as u16,
            mode,
        }
    }

    /// The wake instant, if the fields form a real date and time
    pub fn datetime(&self) -> std::result::Result<NaiveDateTime, ValidationError> {
        validate_time_of_day(self.hour, self.minutes)?;
        let date = calendar_date(self.year, self.month, self.day)?;
        let time = NaiveTime::from_hms_opt(self.hour as u32, self.minutes as u32, 0)
            .ok_or(ValidationError::HourOutOfRange(self.hour))?;
        Ok(date.and_time(time))
    }
}

impl fmt::Display for RtcwakeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02} (mode: {})",
            self.year, self.month, self.day, self.hour, self.minutes, self.mode
        )
    }
}

/// Bounds-check a wake specification against `now`; no side effects
pub fn validate_args(args: &RtcwakeArgs, now: NaiveDateTime) -> std::result::Result<(), ValidationError> {
    let at = args.datetime()?;
    if at <= now {
        return Err(ValidationError::InPast(at.format("%Y-%m-%d %H:%M").to_string()));
    }
    Ok(())
}

/// Soonest future occurrence of any active turn-on rule, as wake arguments
///
/// Ties between rules firing at the same instant go to the first in store
/// order.
pub async fn get_upcoming_on<S: RuleStore + ?Sized>(
    store: &S,
    mode: Mode,
    now: NaiveDateTime,
) -> Result<RtcwakeArgs> {
    let rules = store.get_all(Table::On).await?;

    let (rule, at) = soonest_occurrence(&rules, now).ok_or(Error::NoUpcomingRule(Table::On))?;
    debug!("Upcoming turn-on rule {} fires at {}", rule.id, at);

    let args = RtcwakeArgs::from_datetime(at, mode);
    validate_args(&args, now)?;
    Ok(args)
}

/// Active rule with the nearest next occurrence after `now`
pub fn soonest_occurrence(rules: &[Rule], now: NaiveDateTime) -> Option<(&Rule, NaiveDateTime)> {
    rules
        .iter()
        .filter(|rule| rule.active)
        .filter_map(|rule| {
            next_occurrence(rule.hour, rule.minutes, &rule.days, now).map(|at| (rule, at))
        })
        .min_by_key(|(_, at)| *at)
}

/// Validate a one-shot wake against `now` and hand it to the OS
///
/// `now` and `args` are on the same clock, local time or UTC.
pub async fn custom_schedule<T: WakeTimer + ?Sized>(
    timer: &T,
    args: &RtcwakeArgs,
    now: NaiveDateTime,
    use_localtime: bool,
) -> Result<()> {
    validate_args(args, now)?;
    perform(timer, args, use_localtime).await
}

/// Arm the OS wake primitive; failures are reported, never retried
pub async fn perform<T: WakeTimer + ?Sized>(
    timer: &T,
    args: &RtcwakeArgs,
    use_localtime: bool,
) -> Result<()> {
    timer.arm(args, use_localtime).await?;
    info!("Wake armed for {}", args);
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::{Database, UnreachableStore};
    use crate::models::WeekDays;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Weekday};
    use std::sync::Mutex;

    /// Records calls instead of touching the system
    #[derive(Default)]
    pub(crate) struct RecordingTimer {
        pub armed: Mutex<Vec<RtcwakeArgs>>,
        /// Clock flag of every armed wake
        pub clocks: Mutex<Vec<bool>>,
        pub powered_off: Mutex<Vec<Mode>>,
        pub fail: bool,
    }

    #[async_trait]
    impl WakeTimer for RecordingTimer {
        async fn arm(&self, args: &RtcwakeArgs, use_localtime: bool) -> Result<()> {
            if self.fail {
                return Err(Error::OsCall {
                    program: "rtcwake".to_string(),
                    message: "exit status: 1".to_string(),
                });
            }
            self.armed.lock().unwrap().push(*args);
            self.clocks.lock().unwrap().push(use_localtime);
            Ok(())
        }

        async fn power_off(&self, mode: Mode) -> Result<()> {
            self.powered_off.lock().unwrap().push(mode);
            Ok(())
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn args(year: u16, month: u8, day: u8, hour: u8, minutes: u8) -> RtcwakeArgs {
        RtcwakeArgs {
            hour,
            minutes,
            day,
            month,
            year,
            mode: Mode::Off,
        }
    }

    #[test]
    fn test_validate_args_bounds() {
        let now = at(2026, 10, 16, 12, 0);
        assert!(validate_args(&args(2026, 10, 17, 8, 0), now).is_ok());
        assert_eq!(
            validate_args(&args(2026, 10, 17, 24, 0), now),
            Err(ValidationError::HourOutOfRange(24))
        );
        assert_eq!(
            validate_args(&args(2026, 10, 17, 8, 60), now),
            Err(ValidationError::MinutesOutOfRange(60))
        );
        assert!(matches!(
            validate_args(&args(2027, 2, 29, 8, 0), now),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(matches!(
            validate_args(&args(2026, 13, 1, 8, 0), now),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_validate_args_rejects_past_and_now() {
        let now = at(2026, 10, 16, 12, 0);
        assert!(matches!(
            validate_args(&args(2026, 10, 15, 13, 0), now),
            Err(ValidationError::InPast(_))
        ));
        assert!(matches!(
            validate_args(&args(2026, 10, 16, 12, 0), now),
            Err(ValidationError::InPast(_))
        ));
        assert!(validate_args(&args(2026, 10, 16, 12, 1), now).is_ok());
    }

    #[tokio::test]
    async fn test_upcoming_rolls_to_next_week() {
        let db = Database::in_memory().await.unwrap();
        db.add(&Rule::new(Table::On, "", 8, 0, WeekDays::from_weekdays([Weekday::Mon])))
            .await
            .unwrap();

        // Monday 09:00
        let upcoming = get_upcoming_on(&db, Mode::Mem, at(2026, 10, 19, 9, 0)).await.unwrap();
        assert_eq!(upcoming, RtcwakeArgs { mode: Mode::Mem, ..args(2026, 10, 26, 8, 0) });
    }

    #[tokio::test]
    async fn test_upcoming_picks_globally_soonest_active_rule() {
        let db = Database::in_memory().await.unwrap();
        let mut inactive = Rule::new(Table::On, "", 10, 0, WeekDays::ALL);
        inactive.active = false;
        db.add(&inactive).await.unwrap();
        db.add(&Rule::new(Table::On, "", 7, 0, WeekDays::from_weekdays([Weekday::Wed])))
            .await
            .unwrap();
        db.add(&Rule::new(Table::On, "", 6, 0, WeekDays::from_weekdays([Weekday::Tue])))
            .await
            .unwrap();
        // Turn-off rules are never considered
        db.add(&Rule::new(Table::Off, "", 9, 30, WeekDays::ALL).with_mode(Mode::Off))
            .await
            .unwrap();

        let upcoming = get_upcoming_on(&db, Mode::Off, at(2026, 10, 19, 9, 0)).await.unwrap();
        assert_eq!(upcoming, args(2026, 10, 20, 6, 0));
    }

    #[tokio::test]
    async fn test_upcoming_not_found() {
        let db = Database::in_memory().await.unwrap();
        let now = at(2026, 10, 19, 9, 0);
        assert!(matches!(
            get_upcoming_on(&db, Mode::Off, now).await,
            Err(Error::NoUpcomingRule(Table::On))
        ));

        // A rule without days can never fire
        db.add(&Rule::new(Table::On, "", 8, 0, WeekDays::NONE)).await.unwrap();
        assert!(matches!(
            get_upcoming_on(&db, Mode::Off, now).await,
            Err(Error::NoUpcomingRule(Table::On))
        ));
    }

    #[tokio::test]
    async fn test_upcoming_surfaces_store_failure() {
        assert!(matches!(
            get_upcoming_on(&UnreachableStore, Mode::Off, at(2026, 10, 19, 9, 0)).await,
            Err(Error::Store(_))
        ));
    }

    #[test]
    fn test_soonest_occurrence_tie_goes_to_first() {
        let mut first = Rule::new(Table::On, "first", 8, 0, WeekDays::ALL);
        first.id = 1;
        let mut second = Rule::new(Table::On, "second", 8, 0, WeekDays::ALL);
        second.id = 2;

        let rules = [first, second];
        let (rule, _) = soonest_occurrence(&rules, at(2026, 10, 19, 9, 0)).unwrap();
        assert_eq!(rule.id, 1);
    }

    #[tokio::test]
    async fn test_custom_schedule_validates_before_arming() {
        let timer = RecordingTimer::default();
        let now = at(2026, 10, 16, 12, 0);

        let past = args(2026, 10, 1, 8, 0);
        assert!(matches!(
            custom_schedule(&timer, &past, now, true).await,
            Err(Error::Invalid(ValidationError::InPast(_)))
        ));
        assert!(timer.armed.lock().unwrap().is_empty());

        let future = args(2026, 10, 20, 8, 0);
        custom_schedule(&timer, &future, now, false).await.unwrap();
        assert_eq!(*timer.armed.lock().unwrap(), vec![future]);
        assert_eq!(*timer.clocks.lock().unwrap(), vec![false]);
    }

    #[tokio::test]
    async fn test_perform_reports_os_failure() {
        let timer = RecordingTimer {
            fail: true,
            ..Default::default()
        };
        assert!(matches!(
            perform(&timer, &args(2026, 10, 20, 8, 0), true).await,
            Err(Error::OsCall { .. })
        ));
    }
}

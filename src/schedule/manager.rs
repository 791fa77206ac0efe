use std::future::Future;

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

use super::WakeTimer;
use super::rtcwake::{get_upcoming_on, perform, soonest_occurrence};
use crate::constants::RESCAN_INTERVAL_SECS;
use crate::database::{Database, RuleStore};
use crate::error::{Error, Result};
use crate::models::{Mode, Rule, RuleId, Settings, Table};
use crate::utils::datetime;
use crate::utils::schedule_utils::{minutes_until, next_occurrence};

/// What the watch loop does once its current sleep ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The turn-off rule fires
    Fire,
    /// Log the advance notice
    Notify,
    /// Re-read rules and settings
    Rescan,
}

/// Pick the next thing to wake up for and how long to sleep until then
///
/// `notice` is the advance-notice instant, or `None` once it has been given.
/// Ties go to firing, then to the notice.
pub fn plan_wait(
    now: NaiveDateTime,
    fire_at: NaiveDateTime,
    notice: Option<NaiveDateTime>,
) -> (WakeReason, Duration) {
    let rescan_at = now + ChronoDuration::seconds(RESCAN_INTERVAL_SECS as i64);

    let mut next = (WakeReason::Rescan, rescan_at);
    if let Some(notice_at) = notice {
        if notice_at <= now {
            return (WakeReason::Notify, Duration::ZERO);
        }
        if notice_at <= next.1 {
            next = (WakeReason::Notify, notice_at);
        }
    }
    if fire_at <= next.1 {
        next = (WakeReason::Fire, fire_at);
    }

    let wait = (next.1 - now).to_std().unwrap_or(Duration::ZERO);
    (next.0, wait)
}

/// Stored version of a turn-off rule, if it is still active and still
/// fires at `fire_at`
pub async fn still_due<S: RuleStore + ?Sized>(
    store: &S,
    id: RuleId,
    fire_at: NaiveDateTime,
) -> Result<Option<Rule>> {
    let rule = match store.get_single(id, Table::Off).await {
        Ok(rule) => rule,
        Err(Error::NotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };

    let just_before = fire_at - ChronoDuration::seconds(1);
    let due = rule.active
        && next_occurrence(rule.hour, rule.minutes, &rule.days, just_before) == Some(fire_at);
    Ok(due.then_some(rule))
}

/// Arm the soonest wake and enter the turn-off rule's mode
///
/// The rule is re-read first; one that was disabled, deleted or moved since
/// it was scheduled does nothing. With `shutdown_fail` set, a wake that
/// cannot be armed still powers the machine off without one.
pub async fn fire<S, T>(
    store: &S,
    timer: &T,
    settings: &Settings,
    rule: &Rule,
    now: NaiveDateTime,
) -> Result<()>
where
    S: RuleStore + ?Sized,
    T: WakeTimer + ?Sized,
{
    let Some(current) = still_due(store, rule.id, now).await? else {
        info!("Turn-off rule {} changed before firing, skipping", rule.id);
        return Ok(());
    };

    let mode = effective_mode(&current, settings);
    info!("Turn-off rule {} fired, mode {}", current.id, mode);

    let armed = match get_upcoming_on(store, mode, now).await {
        Ok(args) => perform(timer, &args, settings.use_localtime).await,
        Err(e) => Err(e),
    };

    match armed {
        Ok(()) => Ok(()),
        Err(e) if settings.shutdown_fail => {
            warn!("No wake armed ({}), entering {} anyway", e, mode);
            timer.power_off(mode).await
        }
        Err(e) => Err(e),
    }
}

/// Run the turn-off rules until `shutdown` resolves
pub async fn run_watch<T, F>(db: &Database, timer: &T, shutdown: F)
where
    T: WakeTimer + ?Sized,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    info!("Schedule manager started");

    // Rule and instant the notice has been logged for
    let mut notified: Option<(RuleId, NaiveDateTime)> = None;

    loop {
        let (settings, rules) = match load(db).await {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("Failed to load turn-off rules: {}", e);
                tokio::select! {
                    _ = sleep(Duration::from_secs(60)) => {}
                    _ = &mut shutdown => break,
                }
                continue;
            }
        };

        let now = datetime::now(settings.use_localtime);
        let Some((rule, fire_at)) = soonest_occurrence(&rules, now) else {
            info!("No active turn-off rule, checking again later");
            tokio::select! {
                _ = sleep(Duration::from_secs(RESCAN_INTERVAL_SECS)) => {}
                _ = &mut shutdown => break,
            }
            continue;
        };

        let notice = (notified != Some((rule.id, fire_at))).then(|| {
            fire_at - ChronoDuration::minutes(settings.notification_time as i64)
        });
        let (reason, wait) = plan_wait(now, fire_at, notice);
        info!(
            "Next turn-off rule {} at {} ({} minutes), waking for {:?}",
            rule.id,
            fire_at,
            minutes_until(now, fire_at),
            reason
        );

        tokio::select! {
            _ = sleep(wait) => {}
            _ = &mut shutdown => break,
        }

        match reason {
            WakeReason::Notify => {
                warn!(
                    "Turning off in {} minute(s) ({} rule {})",
                    minutes_until(datetime::now(settings.use_localtime), fire_at),
                    Table::Off,
                    rule.id
                );
                notified = Some((rule.id, fire_at));
            }
            WakeReason::Fire => {
                if let Err(e) = fire(db, timer, &settings, rule, fire_at).await {
                    error!("Failed to run turn-off rule {}: {}", rule.id, e);
                }
                notified = None;
            }
            WakeReason::Rescan => {}
        }
    }

    info!("Schedule manager stopped");
}

async fn load(db: &Database) -> Result<(Settings, Vec<Rule>)> {
    let settings = db.get_settings().await?;
    let rules = db.get_all(Table::Off).await?;
    Ok((settings, rules))
}

/// Mode a turn-off rule enters when it fires
pub fn effective_mode(rule: &Rule, settings: &Settings) -> Mode {
    rule.mode.unwrap_or(settings.default_mode)
}

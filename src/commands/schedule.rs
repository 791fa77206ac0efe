use tracing::info;

use super::{AppContext, ScheduleCommand, wait_for_ctrl_c};
use crate::constants::COUNTDOWN_START;
use crate::error::Result;
use crate::schedule::{
    Confirmation, Countdown, RtcwakeArgs, WakeTimer, confirm, custom_schedule, get_upcoming_on,
    validate_args,
};
use crate::utils::datetime::{self, parse_date_string, parse_time_string};
use crate::utils::messages::{format_info, format_success, format_warning};

pub async fn run<T: WakeTimer>(ctx: &AppContext<T>, command: ScheduleCommand) -> Result<()> {
    let use_localtime = ctx.settings.use_localtime;
    let now = datetime::now(use_localtime);

    let (args, yes) = match command {
        ScheduleCommand::Custom {
            date,
            time,
            mode,
            yes,
        } => {
            let (year, month, day) = parse_date_string(&date)?;
            let (hour, minutes) = parse_time_string(&time)?;
            let args = RtcwakeArgs {
                hour,
                minutes,
                day,
                month,
                year,
                mode: mode.unwrap_or(ctx.settings.default_mode),
            };
            validate_args(&args, now)?;
            (args, yes)
        }
        ScheduleCommand::Upcoming { mode, yes } => {
            let args = get_upcoming_on(&ctx.db, mode.unwrap_or(ctx.settings.default_mode), now).await?;
            println!("{}", format_info(&format!("Soonest turn-on rule fires {}", args)));
            (args, yes)
        }
    };

    if !yes && !countdown(&args).await {
        return Ok(());
    }

    // The countdown took a few seconds; check against the current time
    custom_schedule(&ctx.timer, &args, datetime::now(use_localtime), use_localtime).await?;
    println!("{}", format_success(&format!("Wake armed for {}", args)));
    Ok(())
}

/// Give the user a few seconds to press Ctrl-C; true when not cancelled
async fn countdown(args: &RtcwakeArgs) -> bool {
    eprintln!(
        "{}",
        format_warning(&format!("Entering {} mode, press Ctrl-C to cancel", args.mode))
    );

    let outcome = confirm(Countdown::start(COUNTDOWN_START), wait_for_ctrl_c(), |remaining| {
        eprintln!("  {}...", remaining)
    })
    .await;

    if outcome == Confirmation::Cancelled {
        info!("Schedule cancelled by the user");
        println!("{}", format_info("Cancelled"));
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Database, RuleStore};
    use crate::error::Error;
    use crate::models::{Mode, Rule, Settings, Table, WeekDays};
    use crate::schedule::rtcwake::tests::RecordingTimer;
    use crate::utils::validation::ValidationError;

    async fn context(settings: Settings) -> AppContext<RecordingTimer> {
        AppContext {
            db: Database::in_memory().await.unwrap(),
            timer: RecordingTimer::default(),
            settings,
        }
    }

    #[tokio::test]
    async fn test_upcoming_arms_soonest_rule() {
        let settings = Settings {
            use_localtime: false,
            default_mode: Mode::Mem,
            ..Settings::default()
        };
        let ctx = context(settings).await;
        ctx.db
            .add(&Rule::new(Table::On, "", 7, 0, WeekDays::ALL))
            .await
            .unwrap();

        run(&ctx, ScheduleCommand::Upcoming { mode: None, yes: true })
            .await
            .unwrap();

        let armed = ctx.timer.armed.lock().unwrap().clone();
        assert_eq!(armed.len(), 1);
        assert_eq!((armed[0].hour, armed[0].minutes, armed[0].mode), (7, 0, Mode::Mem));
        assert!(armed[0].datetime().unwrap() > datetime::now(false));
        assert_eq!(*ctx.timer.clocks.lock().unwrap(), vec![false]);
    }

    #[tokio::test]
    async fn test_upcoming_without_rules_arms_nothing() {
        let ctx = context(Settings::default()).await;

        assert!(matches!(
            run(&ctx, ScheduleCommand::Upcoming { mode: Some(Mode::Off), yes: true }).await,
            Err(Error::NoUpcomingRule(Table::On))
        ));
        assert!(ctx.timer.armed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_rejects_past_date() {
        let ctx = context(Settings::default()).await;

        let past = ScheduleCommand::Custom {
            date: "2001-01-01".to_string(),
            time: "08:00".to_string(),
            mode: None,
            yes: true,
        };
        assert!(matches!(
            run(&ctx, past).await,
            Err(Error::Invalid(ValidationError::InPast(_)))
        ));
        assert!(ctx.timer.armed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_arms_future_date() {
        let ctx = context(Settings::default()).await;

        let future = ScheduleCommand::Custom {
            date: "2999-06-01".to_string(),
            time: "08:15".to_string(),
            mode: Some(Mode::Disk),
            yes: true,
        };
        run(&ctx, future).await.unwrap();

        let armed = ctx.timer.armed.lock().unwrap().clone();
        assert_eq!(
            armed,
            vec![RtcwakeArgs {
                hour: 8,
                minutes: 15,
                day: 1,
                month: 6,
                year: 2999,
                mode: Mode::Disk,
            }]
        );
        assert_eq!(*ctx.timer.clocks.lock().unwrap(), vec![true]);
    }
}

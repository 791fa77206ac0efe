use tracing::info;

use super::{AppContext, ConfigCommand};
use crate::error::Result;
use crate::models::{Mode, Settings};
use crate::utils::messages::{format_info, format_success};
use crate::utils::validation::validate_notification_time;

pub async fn run<T>(ctx: &AppContext<T>, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            print!("{}", describe(&ctx.settings));
        }
        ConfigCommand::Set {
            use_localtime,
            default_mode,
            shutdown_fail,
            notification_time,
        } => {
            let settings = apply(
                ctx.settings,
                use_localtime,
                default_mode,
                shutdown_fail,
                notification_time,
            )?;
            if settings == ctx.settings {
                println!("{}", format_info("Nothing to change"));
                return Ok(());
            }

            ctx.db.set_settings(&settings).await?;
            info!("Settings updated: {:?}", settings);
            println!("{}", format_success("Settings saved"));
            print!("{}", describe(&settings));
        }
    }

    Ok(())
}

fn apply(
    mut settings: Settings,
    use_localtime: Option<bool>,
    default_mode: Option<Mode>,
    shutdown_fail: Option<bool>,
    notification_time: Option<u8>,
) -> Result<Settings> {
    if let Some(minutes) = notification_time {
        validate_notification_time(minutes)?;
        settings.notification_time = minutes;
    }
    if let Some(value) = use_localtime {
        settings.use_localtime = value;
    }
    if let Some(mode) = default_mode {
        settings.default_mode = mode;
    }
    if let Some(value) = shutdown_fail {
        settings.shutdown_fail = value;
    }
    Ok(settings)
}

fn describe(settings: &Settings) -> String {
    format!(
        "use-localtime      {}\ndefault-mode       {}\nshutdown-fail      {}\nnotification-time  {} min\n",
        settings.use_localtime,
        settings.default_mode,
        settings.shutdown_fail,
        settings.notification_time
    )
}

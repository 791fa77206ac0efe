// Command modules
mod config;
mod rules;
mod schedule;

use std::future::Future;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::database::Database;
use crate::error::Result;
use crate::models::{Mode, RuleId, Settings, Table};
use crate::schedule::{Rtcwake, WakeTimer, run_watch};

/// Schedule machine wake-ups and shutdowns from weekly rules
#[derive(Debug, Parser)]
#[command(name = "wakerule", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage turn-on and turn-off rules
    #[command(subcommand)]
    Rules(RulesCommand),
    /// Arm a one-shot wake
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    /// Show or change the persisted settings
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Run turn-off rules until Ctrl-C
    Watch,
}

/// Fields shared by `rules add` and `rules edit`
#[derive(Debug, clap::Args)]
pub struct RuleFields {
    /// Time of day, HH:MM
    #[arg(long)]
    pub time: String,
    /// Days such as "mon,wed", "weekdays", "weekends" or "every"
    #[arg(long, default_value = "none")]
    pub days: String,
    /// Display name (at most 32 characters)
    #[arg(long, default_value = "")]
    pub name: String,
    /// Turn-off mode (defaults to the configured default mode)
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,
    /// Store the rule disabled
    #[arg(long)]
    pub inactive: bool,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List the rules of a table
    List {
        #[arg(value_enum)]
        table: Table,
    },
    /// Add a rule
    Add {
        #[arg(value_enum)]
        table: Table,
        #[command(flatten)]
        fields: RuleFields,
    },
    /// Replace every field of an existing rule
    Edit {
        #[arg(value_enum)]
        table: Table,
        id: RuleId,
        #[command(flatten)]
        fields: RuleFields,
    },
    /// Delete a rule
    Delete {
        #[arg(value_enum)]
        table: Table,
        id: RuleId,
    },
    /// Enable a rule
    Enable {
        #[arg(value_enum)]
        table: Table,
        id: RuleId,
    },
    /// Disable a rule
    Disable {
        #[arg(value_enum)]
        table: Table,
        id: RuleId,
    },
}

#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// Wake at a given date and time
    Custom {
        /// Date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Time of day, HH:MM
        #[arg(long)]
        time: String,
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        /// Skip the confirmation countdown
        #[arg(long)]
        yes: bool,
    },
    /// Wake for the soonest active turn-on rule
    Upcoming {
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        /// Skip the confirmation countdown
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the current settings
    Show,
    /// Change one or more settings
    Set {
        /// Compute schedules in local time instead of UTC
        #[arg(long)]
        use_localtime: Option<bool>,
        #[arg(long, value_enum)]
        default_mode: Option<Mode>,
        /// Still power off when no wake can be armed
        #[arg(long)]
        shutdown_fail: Option<bool>,
        /// Minutes of notice before a turn-off rule fires (1-60)
        #[arg(long)]
        notification_time: Option<u8>,
    },
}

/// What every command runs against
pub struct AppContext<T = Rtcwake> {
    pub db: Database,
    pub timer: T,
    pub settings: Settings,
}

/// Run a parsed command
pub async fn dispatch<T: WakeTimer>(ctx: &AppContext<T>, command: Command) -> Result<()> {
    match command {
        Command::Rules(command) => rules::run(ctx, command).await,
        Command::Schedule(command) => schedule::run(ctx, command).await,
        Command::Config(command) => config::run(ctx, command).await,
        Command::Watch => {
            run_watch(&ctx.db, &ctx.timer, wait_for_ctrl_c()).await;
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
pub(crate) async fn wait_for_ctrl_c() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_rules_add() {
        let cli = Cli::try_parse_from([
            "wakerule", "rules", "add", "off", "--time", "23:30", "--days", "weekdays", "--mode",
            "disk",
        ])
        .unwrap();

        match cli.command {
            Command::Rules(RulesCommand::Add { table, fields }) => {
                assert_eq!(table, Table::Off);
                assert_eq!(fields.time, "23:30");
                assert_eq!(fields.mode, Some(Mode::Disk));
                assert!(!fields.inactive);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_registration_failure_never_resolves() {
        let failed = wait_for_signal(std::future::ready(Err(std::io::Error::other("no signals"))));
        tokio::select! {
            _ = failed => panic!("a failed registration must not count as Ctrl-C"),
            _ = tokio::time::sleep(std::time::Duration::from_secs(60)) => {}
        }

        // A delivered signal resolves
        wait_for_signal(std::future::ready(Ok(()))).await;
    }

    #[test]
    fn test_parse_rejects_unknown_table() {
        assert!(Cli::try_parse_from(["wakerule", "rules", "list", "sideways"]).is_err());
    }
}

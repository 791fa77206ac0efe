use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use super::RtcwakeArgs;
use crate::error::{Error, Result};
use crate::models::Mode;

/// OS primitive that arms the RTC and performs a suspend/shutdown mode
#[async_trait]
pub trait WakeTimer: Send + Sync {
    /// Arm the machine to wake at `args` after entering `args.mode`
    ///
    /// `use_localtime` tells whether `args` is local time or UTC.
    async fn arm(&self, args: &RtcwakeArgs, use_localtime: bool) -> Result<()>;

    /// Enter `mode` without arming a wake
    async fn power_off(&self, mode: Mode) -> Result<()>;
}

/// `rtcwake` from util-linux
#[derive(Debug, Clone)]
pub struct Rtcwake {
    pub program: PathBuf,
    /// Log the commands instead of running them
    pub dry_run: bool,
}

impl Rtcwake {
    /// Arguments passed to rtcwake for a wake specification
    pub fn command_args(args: &RtcwakeArgs, use_localtime: bool) -> Vec<String> {
        vec![
            if use_localtime { "--local" } else { "--utc" }.to_string(),
            "--date".to_string(),
            format!(
                "{:04}-{:02}-{:02} {:02}:{:02}",
                args.year, args.month, args.day, args.hour, args.minutes
            ),
            "--mode".to_string(),
            args.mode.to_string(),
        ]
    }

    async fn run(&self, program: &str, args: &[String]) -> Result<()> {
        if self.dry_run {
            info!("Dry run: {} {}", program, args.join(" "));
            return Ok(());
        }

        info!("Running {} {}", program, args.join(" "));
        let output = Command::new(program).args(args).output().await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("{} exited with {}: {}", program, output.status, stderr);
        Err(Error::OsCall {
            program: program.to_string(),
            message: if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            },
        })
    }
}

/// systemctl verb that enters a mode without a wake alarm
pub fn systemctl_verb(mode: Mode) -> &'static str {
    match mode {
        Mode::Off => "poweroff",
        Mode::Disk => "hibernate",
        Mode::Standby | Mode::Freeze | Mode::Mem => "suspend",
    }
}

#[async_trait]
impl WakeTimer for Rtcwake {
    async fn arm(&self, args: &RtcwakeArgs, use_localtime: bool) -> Result<()> {
        let program = self.program.to_string_lossy().into_owned();
        self.run(&program, &Self::command_args(args, use_localtime)).await
    }

    async fn power_off(&self, mode: Mode) -> Result<()> {
        self.run("systemctl", &[systemctl_verb(mode).to_string()]).await
    }
}

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::TimerError;
use crate::pomodoro::pomodoro::{
    DurationConfig, FOCUS_MINUTES, LONG_BREAK_MINUTES, SHORT_BREAK_MINUTES,
};

pub const DEFAULT_ADDR: &str = "127.0.0.1:8765";

/// Pomodoro timer for the terminal, with a WebSocket bridge for browser front ends
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// focus period length in minutes
    #[arg(long, default_value_t = i64::from(FOCUS_MINUTES), allow_negative_numbers = true)]
    pub focus: i64,

    /// short break length in minutes
    #[arg(long, default_value_t = i64::from(SHORT_BREAK_MINUTES), allow_negative_numbers = true)]
    pub short_break: i64,

    /// long break length in minutes, granted after every 4th focus period
    #[arg(long, default_value_t = i64::from(LONG_BREAK_MINUTES), allow_negative_numbers = true)]
    pub long_break: i64,

    /// serve the WebSocket bridge instead of reading commands from the terminal
    #[arg(long)]
    pub daemon: bool,

    /// address the WebSocket bridge listens on
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub addr: SocketAddr,

    /// log file (defaults to the platform data directory)
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// do not show desktop notifications when a period completes
    #[arg(long)]
    pub no_notify: bool,
}

impl Cli {
    pub fn duration_config(&self) -> Result<DurationConfig, TimerError> {
        DurationConfig::new(self.focus, self.short_break, self.long_break)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pomodoro::pomodoro::Mode;
    use assert_matches::assert_matches;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["focus_it"]).unwrap();
        assert!(!cli.daemon);
        assert_eq!(cli.addr, DEFAULT_ADDR.parse::<SocketAddr>().unwrap());
        assert_eq!(cli.duration_config().unwrap(), DurationConfig::default());
    }

    #[test]
    fn custom_durations() {
        let cli = Cli::try_parse_from([
            "focus_it",
            "--focus",
            "50",
            "--short-break",
            "10",
            "--long-break",
            "30",
            "--daemon",
        ])
        .unwrap();
        let cfg = cli.duration_config().unwrap();
        assert_eq!(cfg.minutes(Mode::Focus), 50);
        assert_eq!(cfg.minutes(Mode::ShortBreak), 10);
        assert_eq!(cfg.minutes(Mode::LongBreak), 30);
        assert!(cli.daemon);
    }

    #[test]
    fn non_positive_durations_are_rejected() {
        let cli = Cli::try_parse_from(["focus_it", "--short-break", "0"]).unwrap();
        assert_matches!(
            cli.duration_config(),
            Err(TimerError::InvalidConfig {
                mode: Mode::ShortBreak,
                minutes: 0
            })
        );
        let cli = Cli::try_parse_from(["focus_it", "--focus", "-5"]).unwrap();
        assert_matches!(cli.duration_config(), Err(TimerError::InvalidConfig { .. }));
    }

    #[test]
    fn non_integer_durations_fail_to_parse() {
        assert!(Cli::try_parse_from(["focus_it", "--focus", "2.5"]).is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

pub const TICK_INTERVAL_MS: u64 = 1000; // One logical tick per second
pub const FOCUS_MINUTES: u32 = 25; // Default Pomodoro focus time
pub const SHORT_BREAK_MINUTES: u32 = 5; // Default short break
pub const LONG_BREAK_MINUTES: u32 = 15; // Default long break
pub const FOCUS_PERIODS_PER_CYCLE: u32 = 4; // Long break after every 4th focus period

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Focus, Mode::ShortBreak, Mode::LongBreak];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "FOCUS",
            Mode::ShortBreak => "SHORT BREAK",
            Mode::LongBreak => "LONG BREAK",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "Focus Time",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mode::Focus => "🍅",
            Mode::ShortBreak => "☕",
            Mode::LongBreak => "🌴",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Mode::Focus)
    }

    /// Break granted once `completed` focus periods are done.
    pub fn after_focus(completed: u32) -> Mode {
        if completed > 0 && completed % FOCUS_PERIODS_PER_CYCLE == 0 {
            Mode::LongBreak
        } else {
            Mode::ShortBreak
        }
    }

    /// Accepts the short names used on the command line as well as the
    /// serialized ones.
    pub fn parse(s: &str) -> Option<Mode> {
        match s.to_lowercase().as_str() {
            "focus" | "f" | "work" => Some(Mode::Focus),
            "short" | "short_break" | "short-break" | "shortbreak" => Some(Mode::ShortBreak),
            "long" | "long_break" | "long-break" | "longbreak" => Some(Mode::LongBreak),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Minutes configured per mode. Every value is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConfig {
    focus: u32,
    short_break: u32,
    long_break: u32,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            focus: FOCUS_MINUTES,
            short_break: SHORT_BREAK_MINUTES,
            long_break: LONG_BREAK_MINUTES,
        }
    }
}

impl DurationConfig {
    pub fn new(focus: i64, short_break: i64, long_break: i64) -> Result<Self, TimerError> {
        Ok(Self {
            focus: validate_minutes(Mode::Focus, focus)?,
            short_break: validate_minutes(Mode::ShortBreak, short_break)?,
            long_break: validate_minutes(Mode::LongBreak, long_break)?,
        })
    }

    pub fn minutes(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus,
            Mode::ShortBreak => self.short_break,
            Mode::LongBreak => self.long_break,
        }
    }

    pub fn seconds(&self, mode: Mode) -> u32 {
        self.minutes(mode) * 60
    }

    /// Leaves the config untouched when `minutes` is rejected.
    pub fn set(&mut self, mode: Mode, minutes: i64) -> Result<u32, TimerError> {
        let minutes = validate_minutes(mode, minutes)?;
        match mode {
            Mode::Focus => self.focus = minutes,
            Mode::ShortBreak => self.short_break = minutes,
            Mode::LongBreak => self.long_break = minutes,
        }
        Ok(minutes)
    }
}

// Period lengths are stored in seconds as u32, so the minute count must
// stay positive and small enough to multiply by 60.
fn validate_minutes(mode: Mode, minutes: i64) -> Result<u32, TimerError> {
    match u32::try_from(minutes) {
        Ok(m) if m > 0 && m <= u32::MAX / 60 => Ok(m),
        _ => Err(TimerError::InvalidConfig { mode, minutes }),
    }
}

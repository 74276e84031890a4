use super::events::Snapshot;
use super::pomodoro::{DurationConfig, Mode};

/// The countdown state behind a `SessionController`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSession {
    pub(crate) mode: Mode,
    pub(crate) running: bool,
    pub(crate) remaining_seconds: u32,
    pub(crate) total_seconds: u32,
    pub(crate) focus_intervals_completed: u32,
    pub(crate) session_number: u32,
}

impl TimerSession {
    pub fn new(config: &DurationConfig) -> Self {
        let total = config.seconds(Mode::Focus);
        Self {
            mode: Mode::Focus,
            running: false,
            remaining_seconds: total,
            total_seconds: total,
            focus_intervals_completed: 0,
            session_number: 1,
        }
    }

    /// Load a full period of `mode`. Counters are not touched.
    pub(crate) fn begin_period(&mut self, mode: Mode, config: &DurationConfig) {
        let total = config.seconds(mode);
        self.mode = mode;
        self.remaining_seconds = total;
        self.total_seconds = total;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            running: self.running,
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.total_seconds,
            focus_intervals_completed: self.focus_intervals_completed,
            session_number: self.session_number,
        }
    }
}

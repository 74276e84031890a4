use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::pomodoro::Mode;

/// Point-in-time copy of the session state carried by every event.
/// Serializes with an extra `progress` field holding
/// [`Snapshot::fraction_remaining`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub mode: Mode,
    pub running: bool,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub focus_intervals_completed: u32,
    pub session_number: u32,
}

impl Snapshot {
    /// `remaining / total`, from 1.0 at the start of a period down to 0.0.
    /// A zero total reads as 0.0.
    pub fn fraction_remaining(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        f64::from(self.remaining_seconds) / f64::from(self.total_seconds)
    }

    /// Remaining time as MM:SS.
    pub fn format_remaining(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Snapshot", 7)?;
        state.serialize_field("mode", &self.mode)?;
        state.serialize_field("running", &self.running)?;
        state.serialize_field("remaining_seconds", &self.remaining_seconds)?;
        state.serialize_field("total_seconds", &self.total_seconds)?;
        state.serialize_field("focus_intervals_completed", &self.focus_intervals_completed)?;
        state.serialize_field("session_number", &self.session_number)?;
        state.serialize_field("progress", &self.fraction_remaining())?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    /// Displayed time or run state changed.
    Progress { snapshot: Snapshot },
    /// A period ran down to zero; `starting` is already loaded.
    PeriodCompleted {
        ended: Mode,
        starting: Mode,
        snapshot: Snapshot,
    },
    SessionCountersChanged { snapshot: Snapshot },
}

impl TimerEvent {
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            TimerEvent::Progress { snapshot }
            | TimerEvent::PeriodCompleted { snapshot, .. }
            | TimerEvent::SessionCountersChanged { snapshot } => snapshot,
        }
    }
}

/// Receiver of controller events.
pub trait EventSink {
    fn on_event(&mut self, event: &TimerEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&TimerEvent),
{
    fn on_event(&mut self, event: &TimerEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(remaining: u32, total: u32) -> Snapshot {
        Snapshot {
            mode: Mode::Focus,
            running: false,
            remaining_seconds: remaining,
            total_seconds: total,
            focus_intervals_completed: 0,
            session_number: 1,
        }
    }

    #[test]
    fn fraction_remaining_guards_zero_total() {
        assert_eq!(snapshot(0, 0).fraction_remaining(), 0.0);
        assert_eq!(snapshot(750, 1500).fraction_remaining(), 0.5);
        assert_eq!(snapshot(1500, 1500).fraction_remaining(), 1.0);
    }

    #[test]
    fn format_remaining_pads_minutes_and_seconds() {
        assert_eq!(snapshot(1500, 1500).format_remaining(), "25:00");
        assert_eq!(snapshot(61, 1500).format_remaining(), "01:01");
        assert_eq!(snapshot(0, 1500).format_remaining(), "00:00");
        assert_eq!(snapshot(6000, 6000).format_remaining(), "100:00");
    }

    #[test]
    fn event_serialization() {
        let event = TimerEvent::PeriodCompleted {
            ended: Mode::Focus,
            starting: Mode::ShortBreak,
            snapshot: snapshot(300, 300),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"period_completed\""));
        assert!(json.contains("\"ended\":\"focus\""));
        assert!(json.contains("\"starting\":\"short_break\""));
        assert!(json.contains("\"remaining_seconds\":300"));
        assert!(json.contains("\"progress\":1.0"));
    }

    #[test]
    fn snapshot_json_carries_progress() {
        let value = serde_json::to_value(snapshot(750, 1500)).unwrap();
        assert_eq!(value["progress"], 0.5);
        assert_eq!(value["remaining_seconds"], 750);
        assert_eq!(value["mode"], "focus");

        let value = serde_json::to_value(snapshot(0, 0)).unwrap();
        assert_eq!(value["progress"], 0.0);
    }
}

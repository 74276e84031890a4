use notify_rust::Notification;
use tracing::warn;

use crate::pomodoro::events::{EventSink, TimerEvent};
use crate::pomodoro::pomodoro::Mode;

/// Title and body announcing the end of a period of `ended`.
pub fn completion_message(ended: Mode) -> (&'static str, &'static str) {
    if ended.is_break() {
        ("Break time is over!", "Ready to focus again?")
    } else {
        ("Focus session complete!", "Great work! Time for a break.")
    }
}

fn send_notification(summary: &str, body: &str) -> Result<(), Box<dyn std::error::Error>> {
    Notification::new()
        .summary(summary)
        .body(body)
        .timeout(0) // No auto-dismiss
        .show()?;
    Ok(())
}

/// Pops a desktop notification whenever a period completes.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl EventSink for DesktopNotifier {
    fn on_event(&mut self, event: &TimerEvent) {
        if let TimerEvent::PeriodCompleted { ended, .. } = event {
            let (summary, body) = completion_message(*ended);
            if let Err(e) = send_notification(summary, body) {
                warn!(error = %e, "failed to send notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_depend_on_the_period_that_ended() {
        assert_eq!(completion_message(Mode::Focus).0, "Focus session complete!");
        assert_eq!(completion_message(Mode::ShortBreak).0, "Break time is over!");
        assert_eq!(completion_message(Mode::LongBreak).1, "Ready to focus again?");
    }
}

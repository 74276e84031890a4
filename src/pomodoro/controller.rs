use tracing::{debug, info};

use super::events::{EventSink, Snapshot, SubscriptionId, TimerEvent};
use super::pomodoro::{DurationConfig, Mode};
use super::scheduler::{TickId, TickScheduler};
use super::session::TimerSession;
use crate::error::TimerError;

/// Owns the timer session and applies start/pause/reset/tick/config
/// changes to it. Holds at most one live tick handle, and only while
/// running.
pub struct SessionController<S: TickScheduler> {
    session: TimerSession,
    config: DurationConfig,
    scheduler: S,
    ticking: Option<(TickId, S::Handle)>,
    next_tick_id: u64,
    sinks: Vec<(SubscriptionId, Box<dyn EventSink>)>,
    next_subscription: u64,
}

impl<S: TickScheduler> SessionController<S> {
    pub fn new(config: DurationConfig, scheduler: S) -> Self {
        Self {
            session: TimerSession::new(&config),
            config,
            scheduler,
            ticking: None,
            next_tick_id: 0,
            sinks: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn subscribe(&mut self, sink: impl EventSink + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.sinks.push((id, Box::new(sink)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sub, _)| *sub != id);
        self.sinks.len() != before
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    pub fn config(&self) -> &DurationConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.session.running
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn start(&mut self) {
        if self.session.running {
            return;
        }
        // A paused session never holds a handle, but never stack two.
        self.cancel_ticks();

        let id = TickId(self.next_tick_id);
        self.next_tick_id += 1;
        let handle = self.scheduler.schedule(id);
        self.ticking = Some((id, handle));
        self.session.running = true;

        debug!(mode = ?self.session.mode, remaining = self.session.remaining_seconds, "timer started");
        self.emit_progress();
    }

    pub fn pause(&mut self) {
        if !self.session.running {
            return;
        }
        self.cancel_ticks();
        self.session.running = false;

        debug!(mode = ?self.session.mode, remaining = self.session.remaining_seconds, "timer paused");
        self.emit_progress();
    }

    pub fn toggle(&mut self) {
        if self.session.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Restart the current mode's period at full length. Mode and counters
    /// are kept.
    pub fn reset(&mut self) {
        self.cancel_ticks();
        self.session.running = false;
        let mode = self.session.mode;
        self.session.begin_period(mode, &self.config);

        debug!(?mode, total = self.session.total_seconds, "timer reset");
        self.emit_progress();
    }

    /// One elapsed second. Ignored unless running; the tick that brings the
    /// countdown to zero also completes the period.
    pub fn tick(&mut self) {
        if !self.session.running {
            return;
        }
        if self.session.remaining_seconds == 0 {
            self.complete();
            return;
        }

        self.session.remaining_seconds -= 1;
        self.emit_progress();
        if self.session.remaining_seconds == 0 {
            self.complete();
        }
    }

    /// Apply a tick delivered by the scheduler. Ticks from a handle that has
    /// since been cancelled are dropped. Returns whether the tick counted.
    pub fn tick_from(&mut self, id: TickId) -> bool {
        let live = matches!(&self.ticking, Some((live, _)) if *live == id);
        if live {
            self.tick();
        } else {
            debug!(tick = id.0, "dropping stale tick");
        }
        live
    }

    /// End the current period and load the next one.
    pub fn complete(&mut self) {
        self.cancel_ticks();
        self.session.running = false;

        let ended = self.session.mode;
        let starting = match ended {
            Mode::Focus => {
                self.session.focus_intervals_completed += 1;
                self.session.session_number += 1;
                Mode::after_focus(self.session.focus_intervals_completed)
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Focus,
        };
        self.session.begin_period(starting, &self.config);
        self.emit_progress();

        info!(
            ?ended,
            ?starting,
            session = self.session.session_number,
            completed = self.session.focus_intervals_completed,
            "period completed"
        );

        let snapshot = self.snapshot();
        self.emit(TimerEvent::PeriodCompleted {
            ended,
            starting,
            snapshot,
        });
        self.emit(TimerEvent::SessionCountersChanged { snapshot });
    }

    /// Change the configured minutes for `mode`. Rejected values leave the
    /// controller untouched.
    pub fn update_config(&mut self, mode: Mode, minutes: i64) -> Result<(), TimerError> {
        let minutes = self.config.set(mode, minutes)?;
        debug!(?mode, minutes, "duration updated");

        if mode == self.session.mode && !self.session.running {
            self.session.begin_period(mode, &self.config);
            self.emit_progress();
        }
        Ok(())
    }

    fn cancel_ticks(&mut self) {
        if let Some((_, handle)) = self.ticking.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn emit_progress(&mut self) {
        let snapshot = self.snapshot();
        self.emit(TimerEvent::Progress { snapshot });
    }

    fn emit(&mut self, event: TimerEvent) {
        for (_, sink) in self.sinks.iter_mut() {
            sink.on_event(&event);
        }
    }
}

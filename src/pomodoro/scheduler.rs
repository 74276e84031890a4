use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

use crate::runtime::{Request, RequestSender};

/// Identifies one scheduled repeating tick. Ids are never reused within a
/// controller, so a tick carrying a stale id can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// Creates and cancels the repeating one-second callback that drives
/// `SessionController::tick`.
pub trait TickScheduler {
    type Handle;

    fn schedule(&mut self, id: TickId) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// Sends `Request::Tick` into the runtime channel once per period.
#[derive(Debug, Clone)]
pub struct TokioTicker {
    tx: RequestSender,
    period: Duration,
}

impl TokioTicker {
    pub fn new(tx: RequestSender, period: Duration) -> Self {
        Self { tx, period }
    }
}

impl TickScheduler for TokioTicker {
    type Handle = JoinHandle<()>;

    fn schedule(&mut self, id: TickId) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let period = self.period;
        tokio::spawn(async move {
            // First tick lands one full period after start.
            let mut ticks = interval_at(Instant::now() + period, period);
            loop {
                ticks.tick().await;
                if tx.send(Request::Tick(id)).is_err() {
                    tracing::debug!(tick = id.0, "runtime gone, stopping ticker");
                    break;
                }
            }
        })
    }

    fn cancel(&mut self, handle: JoinHandle<()>) {
        handle.abort();
    }
}

/// Scheduler for tests: nothing fires on its own, callers invoke `tick()`
/// directly and inspect which handles are live.
#[derive(Debug, Default)]
pub struct ManualTicker {
    live: Vec<TickId>,
    cancelled: Vec<TickId>,
}

impl ManualTicker {
    pub fn live(&self) -> &[TickId] {
        &self.live
    }

    pub fn cancelled(&self) -> &[TickId] {
        &self.cancelled
    }
}

impl TickScheduler for ManualTicker {
    type Handle = TickId;

    fn schedule(&mut self, id: TickId) -> TickId {
        self.live.push(id);
        id
    }

    fn cancel(&mut self, handle: TickId) {
        self.live.retain(|live| *live != handle);
        self.cancelled.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::request_channel;

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_fires_every_period_until_cancelled() {
        let (tx, mut rx) = request_channel();
        let mut ticker = TokioTicker::new(tx, Duration::from_secs(1));
        let handle = ticker.schedule(TickId(7));

        for _ in 0..3 {
            match rx.recv().await {
                Some(Request::Tick(id)) => assert_eq!(id, TickId(7)),
                other => panic!("expected tick, got {:?}", other),
            }
        }

        ticker.cancel(handle);
        tokio::time::sleep(Duration::from_secs(5)).await;
        // Anything still queued was sent before the abort took effect.
        while let Ok(req) = rx.try_recv() {
            assert!(matches!(req, Request::Tick(TickId(7))));
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_waits_one_period_before_first_tick() {
        let (tx, mut rx) = request_channel();
        let mut ticker = TokioTicker::new(tx, Duration::from_secs(1));
        let _handle = ticker.schedule(TickId(1));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(matches!(rx.try_recv(), Ok(Request::Tick(TickId(1)))));
    }

    #[test]
    fn manual_ticker_tracks_live_handles() {
        let mut ticker = ManualTicker::default();
        let a = ticker.schedule(TickId(1));
        let _b = ticker.schedule(TickId(2));
        ticker.cancel(a);
        assert_eq!(ticker.live(), &[TickId(2)]);
        assert_eq!(ticker.cancelled(), &[TickId(1)]);
    }
}

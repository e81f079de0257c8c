//! Sources of the focus timer's one-second tick.
//!
//! Every `schedule` call returns a fresh [`TickHandle`]. Cancelling a handle
//! stops delivery at the source; the timer additionally drops any tick whose
//! handle is no longer current.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

pub trait TickScheduler {
    /// Begin a recurring one-second tick.
    fn schedule(&mut self) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
}

/// Hands out handles without a background source; the caller delivers ticks.
#[derive(Debug, Default)]
pub struct ManualTicks {
    next: u64,
    live: Vec<TickHandle>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_handles(&self) -> &[TickHandle] {
        &self.live
    }
}

impl TickScheduler for ManualTicks {
    fn schedule(&mut self) -> TickHandle {
        self.next += 1;
        let handle = TickHandle(self.next);
        self.live.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.live.retain(|h| *h != handle);
    }
}

/// Tokio interval per handle, delivering handles over a channel.
///
/// `schedule` must be called from within a tokio runtime. Cancelling aborts
/// the interval task, so no further tick is sent for that handle.
pub struct TokioTicker {
    period: Duration,
    next: u64,
    tx: mpsc::UnboundedSender<TickHandle>,
    tasks: HashMap<TickHandle, JoinHandle<()>>,
}

impl TokioTicker {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TickHandle>) {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> (Self, mpsc::UnboundedReceiver<TickHandle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let ticker = Self {
            period,
            next: 0,
            tx,
            tasks: HashMap::new(),
        };
        (ticker, rx)
    }
}

impl TickScheduler for TokioTicker {
    fn schedule(&mut self) -> TickHandle {
        self.next += 1;
        let handle = TickHandle(self.next);
        let tx = self.tx.clone();
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(handle).is_err() {
                    break;
                }
            }
        });
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_ticks_track_live_handles() {
        let mut ticks = ManualTicks::new();
        let a = ticks.schedule();
        let b = ticks.schedule();
        assert_ne!(a, b);
        ticks.cancel(a);
        assert_eq!(ticks.live_handles(), &[b]);
        ticks.cancel(a);
        assert_eq!(ticks.live_handles(), &[b]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_ticker_stops_after_cancel() {
        let (mut ticker, mut rx) = TokioTicker::with_period(Duration::from_secs(1));
        let handle = ticker.schedule();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(rx.recv().await, Some(handle));
        assert_eq!(rx.recv().await, Some(handle));

        ticker.cancel(handle);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}

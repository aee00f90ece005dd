//! Wall-clock tick source for a running session.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Interval between countdown ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed period. `seq` starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub seq: u64,
}

/// Cancellation handle for a spawned ticker. Dropping it stops the task.
#[derive(Debug)]
pub struct TickerHandle {
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    /// Stop the ticker. Returns `false` if it was already stopped.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn a task that sends a `Tick` every `period`, starting one period from now.
///
/// Must be called from within a tokio runtime. The task ends when the handle
/// is stopped or the receiver is dropped.
#[must_use]
pub fn spawn_ticker(period: Duration) -> (TickerHandle, mpsc::Receiver<Tick>) {
    let (tx, rx) = mpsc::channel(8);
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        let mut seq = 0_u64;
        loop {
            interval.tick().await;
            seq += 1;
            if tx.send(Tick { seq }).await.is_err() {
                break;
            }
        }
    });
    (TickerHandle { task: Some(task) }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delivers_ticks_in_order() {
        let (mut handle, mut rx) = spawn_ticker(TICK_PERIOD);
        for expected in 1..=3 {
            let tick = rx.recv().await.unwrap();
            assert_eq!(tick.seq, expected);
        }
        assert!(handle.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_closes_channel() {
        let (mut handle, mut rx) = spawn_ticker(TICK_PERIOD);
        assert!(handle.stop());
        assert!(!handle.stop());
        assert!(handle.is_stopped());
        assert!(rx.recv().await.is_none());
    }
}

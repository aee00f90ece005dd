//! Pure countdown state for a timed quiz.
//!
//! The countdown does not own a clock. Whoever drives it delivers one
//! `tick` per elapsed second; this keeps the state machine deterministic and
//! lets tests advance time by calling `tick` directly.

/// Default time budget for one reading passage (18 minutes).
pub const DEFAULT_TIME_BUDGET_SECS: u32 = 1_080;

/// Remaining time at or below which the display switches to a warning style.
pub const WARNING_THRESHOLD_SECS: u32 = 60;

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Time remains; carries the new remaining value.
    Running { remaining_secs: u32 },
    /// This tick brought the countdown to zero. It has stopped itself.
    Expired,
    /// The countdown was already stopped; nothing changed.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    budget_secs: u32,
    remaining_secs: u32,
    stopped: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(budget_secs: u32) -> Self {
        Self {
            budget_secs,
            remaining_secs: budget_secs,
            stopped: false,
        }
    }

    #[must_use]
    pub fn budget_secs(&self) -> u32 {
        self.budget_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.remaining_secs <= WARNING_THRESHOLD_SECS
    }

    /// `budget - remaining`, never negative and never above the budget.
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.budget_secs.saturating_sub(self.remaining_secs)
    }

    /// Consume one second.
    pub fn tick(&mut self) -> CountdownTick {
        if self.stopped {
            return CountdownTick::Stopped;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.stopped = true;
            return CountdownTick::Expired;
        }
        CountdownTick::Running {
            remaining_secs: self.remaining_secs,
        }
    }

    /// Stop counting. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        !std::mem::replace(&mut self.stopped, true)
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_BUDGET_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_expires_once() {
        let mut countdown = Countdown::new(3);
        assert_eq!(
            countdown.tick(),
            CountdownTick::Running { remaining_secs: 2 }
        );
        assert_eq!(
            countdown.tick(),
            CountdownTick::Running { remaining_secs: 1 }
        );
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert!(countdown.is_stopped());
        assert_eq!(countdown.tick(), CountdownTick::Stopped);
        assert_eq!(countdown.remaining_secs(), 0);
        assert_eq!(countdown.elapsed_secs(), 3);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut countdown = Countdown::default();
        countdown.tick();
        assert!(countdown.stop());
        let snapshot = countdown.clone();
        assert!(!countdown.stop());
        assert_eq!(countdown, snapshot);
        assert_eq!(countdown.tick(), CountdownTick::Stopped);
        assert_eq!(countdown.elapsed_secs(), 1);
    }

    #[test]
    fn warning_starts_at_one_minute() {
        let mut countdown = Countdown::new(62);
        assert!(!countdown.is_warning());
        countdown.tick();
        assert!(!countdown.is_warning());
        countdown.tick();
        assert!(countdown.is_warning());
    }

    #[test]
    fn zero_budget_expires_on_first_tick() {
        let mut countdown = Countdown::new(0);
        assert_eq!(countdown.tick(), CountdownTick::Expired);
        assert_eq!(countdown.elapsed_secs(), 0);
    }
}

#![forbid(unsafe_code)]

//! Inactivity timeout policy.
//!
//! Each engine layer owns one [`InactivityTimer`]. Every transform the layer
//! applies re-arms the timer; the next key event cancels it. If the deadline
//! is reached first, [`poll_expired`](InactivityTimer::poll_expired) reports
//! it exactly once and the layer injects its reset transform.
//!
//! # Invariants
//! 1. An expired timer fires once per arm and is then disarmed.
//! 2. A cancelled timer never fires.
//! 3. Time is always supplied by the caller; the timer never reads a clock.
//!
//! # Example
//!
//! ```
//! use calc_core::inactivity::InactivityTimer;
//! use std::time::{Duration, Instant};
//!
//! let mut timer = InactivityTimer::new(Duration::from_millis(5000));
//! let t = Instant::now();
//! timer.restart(t);
//!
//! assert!(!timer.poll_expired(t + Duration::from_millis(4999)));
//! assert!(timer.poll_expired(t + Duration::from_millis(5000)));
//! assert!(!timer.poll_expired(t + Duration::from_millis(9000)));
//! ```

use std::time::{Duration, Instant};

/// Default idle window before a layer resets.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Cancellable one-shot deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Default for InactivityTimer {
    fn default() -> Self {
        Self::new(DEFAULT_INACTIVITY_TIMEOUT)
    }
}

impl InactivityTimer {
    /// Create a disarmed timer.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Arm (or re-arm) the timer starting at `now`.
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.timeout);
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before the deadline, `None` when disarmed.
    #[must_use]
    pub fn time_until_expiry(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Returns `true` once if the deadline has been reached, disarming the timer.
    pub fn poll_expired(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

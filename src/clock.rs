use std::time::{Duration, Instant};

/// Fixed-interval tick source driven by cooperative polling.
///
/// The run loop asks `due` with the current instant; the clock answers at
/// most once per interval and re-arms itself. Stopping an already stopped
/// clock is a no-op, which keeps the dead-transition path re-entrant.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    interval: Duration,
    deadline: Option<Instant>,
}

impl TickClock {
    /// Creates a disarmed clock with the given interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Arms the clock; the first tick is due one interval from `now`.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Disarms the clock.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Reports whether a tick is due at `now`, re-arming on a hit.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

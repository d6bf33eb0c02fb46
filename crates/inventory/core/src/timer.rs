//! Deterministic single-shot timers for debounced side effects.
//!
//! The original debounce discipline relied on an engine timer manager; here
//! it is an explicit deadline advanced by whoever drives the simulation
//! clock. Re-arming before the deadline cancels and restarts the countdown,
//! so a burst of N triggers collapses into one firing after the last trigger
//! plus the delay.

use core::ops::Add;

/// Milliseconds on the simulation clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Add<u64> for Tick {
    type Output = Tick;

    fn add(self, ms: u64) -> Tick {
        Tick(self.0.saturating_add(ms))
    }
}

/// Cancelable single-shot countdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebounceTimer {
    delay_ms: u64,
    deadline: Option<Tick>,
}

impl DebounceTimer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    /// Starts (or restarts) the countdown from `now`.
    pub fn arm(&mut self, now: Tick) {
        self.deadline = Some(now + self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the deadline and returns true exactly once when it has
    /// passed.
    pub fn fire(&mut self, now: Tick) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_restarts_the_countdown() {
        let mut timer = DebounceTimer::new(100);
        timer.arm(Tick(0));
        timer.arm(Tick(50));

        // Old deadline (100) must not fire; the new one (150) must.
        assert!(!timer.fire(Tick(100)));
        assert!(timer.fire(Tick(150)));
    }

    #[test]
    fn fires_exactly_once() {
        let mut timer = DebounceTimer::new(100);
        timer.arm(Tick(0));
        assert!(!timer.fire(Tick(99)));
        assert!(timer.fire(Tick(100)));
        assert!(!timer.fire(Tick(200)));
    }

    #[test]
    fn cancel_disarms() {
        let mut timer = DebounceTimer::new(100);
        timer.arm(Tick(0));
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.fire(Tick(1000)));
    }
}

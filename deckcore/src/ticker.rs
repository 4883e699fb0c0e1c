//! Frame-polled fixed-interval timers.
//!
//! egui has no timer callbacks; the app polls each ticker once per frame
//! and asks the repaint scheduler to wake it at [`Ticker::deadline`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// First tick fires one `interval` after `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, next: now + interval }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Returns `true` once per elapsed interval. Missed ticks (window
    /// hidden, machine asleep) collapse into one.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }
}

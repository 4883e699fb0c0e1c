//! Deadline-driven repaint scheduling
//!
//! egui only runs a frame when something asks for one. The deck has several
//! clocks that need frames without user input: the next GIF frame, the
//! swap and recolor tickers, a pending window re-center. Each frame the app
//! reports those deadlines with [`RepaintController::schedule`] and the
//! controller issues a single `request_repaint_after` for the earliest.
//!
//! Worker completions do not go through here; the runner's waker calls
//! `Context::request_repaint` directly from the worker thread.

use std::time::{Duration, Instant};

/// Never sleep longer than this, so a missed wake-up self-heals.
const MAX_SLEEP: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct RepaintController {
    /// Earliest deadline recorded this frame.
    next: Option<Instant>,
}

impl RepaintController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the **start** of `update()`; forgets last frame's deadlines.
    pub fn begin_frame(&mut self) {
        self.next = None;
    }

    /// Ask for a frame no later than `at`.
    pub fn schedule(&mut self, at: Instant) {
        self.next = Some(match self.next {
            Some(current) => current.min(at),
            None => at,
        });
    }

    /// Time to sleep before the next frame, capped at one second.
    pub fn sleep_for(&self, now: Instant) -> Duration {
        self.next
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or(MAX_SLEEP)
            .min(MAX_SLEEP)
    }

    /// Call at the **end** of `update()`.
    pub fn end_frame(&self, ctx: &egui::Context) {
        ctx.request_repaint_after(self.sleep_for(Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earliest_deadline_wins() {
        let now = Instant::now();
        let mut rc = RepaintController::new();
        rc.schedule(now + Duration::from_millis(800));
        rc.schedule(now + Duration::from_millis(40));
        rc.schedule(now + Duration::from_millis(300));
        assert_eq!(rc.sleep_for(now), Duration::from_millis(40));
    }

    #[test]
    fn test_sleep_is_capped() {
        let now = Instant::now();
        let mut rc = RepaintController::new();
        assert_eq!(rc.sleep_for(now), MAX_SLEEP);
        rc.schedule(now + Duration::from_secs(30));
        assert_eq!(rc.sleep_for(now), MAX_SLEEP);
    }

    #[test]
    fn test_past_deadline_means_immediate() {
        let now = Instant::now();
        let mut rc = RepaintController::new();
        rc.schedule(now);
        assert_eq!(rc.sleep_for(now + Duration::from_millis(5)), Duration::ZERO);
    }

    #[test]
    fn test_begin_frame_forgets_old_deadlines() {
        let now = Instant::now();
        let mut rc = RepaintController::new();
        rc.schedule(now + Duration::from_millis(10));
        rc.begin_frame();
        assert_eq!(rc.sleep_for(now), MAX_SLEEP);
    }
}

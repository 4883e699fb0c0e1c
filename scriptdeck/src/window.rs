//! Keep the deck pinned to the middle of the primary monitor.
//!
//! The window is centered on the first frame and, whenever it is found
//! somewhere else, snapped back after a short delay.

use egui::{Pos2, Vec2, ViewportCommand};
use std::time::{Duration, Instant};

/// Positions closer than this count as centered.
const TOLERANCE: f32 = 1.0;

/// Top-left corner that centers `window` on `monitor` (whole points).
pub fn centered_origin(monitor: Vec2, window: Vec2) -> Pos2 {
    let offset = ((monitor - window) / 2.0).floor();
    Pos2::new(offset.x.max(0.0), offset.y.max(0.0))
}

pub struct Centering {
    delay: Duration,
    due: Option<Instant>,
}

impl Centering {
    /// The first observation recenters immediately.
    pub fn new(delay: Duration, now: Instant) -> Self {
        Self { delay, due: Some(now) }
    }

    /// Feed the current and desired positions; returns where to move the
    /// window, if it is time to.
    pub fn observe(&mut self, current: Pos2, target: Pos2, now: Instant) -> Option<Pos2> {
        if let Some(due) = self.due {
            if now >= due {
                self.due = None;
                return Some(target);
            }
            return None;
        }
        if (current - target).length() > TOLERANCE {
            self.due = Some(now + self.delay);
        }
        None
    }

    /// Pending snap-back, for repaint scheduling.
    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    /// Read the viewport geometry and issue a move when one is due.
    pub fn update(&mut self, ctx: &egui::Context, now: Instant) -> Option<Instant> {
        let (outer, monitor) = ctx.input(|i| {
            let viewport = i.viewport();
            (viewport.outer_rect, viewport.monitor_size)
        });
        // Some platforms (Wayland) never report these; nothing to do there.
        let (Some(outer), Some(monitor)) = (outer, monitor) else {
            return None;
        };

        let target = centered_origin(monitor, outer.size());
        if let Some(pos) = self.observe(outer.min, target, now) {
            tracing::debug!(x = pos.x, y = pos.y, "recentering window");
            ctx.send_viewport_cmd(ViewportCommand::OuterPosition(pos));
        }
        self.deadline()
    }
}

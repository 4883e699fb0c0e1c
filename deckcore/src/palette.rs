//! Deck colors
//!
//! Two independent color concerns live here: the per-action log colors
//! (one light tone per action, fixed for the app lifetime) and the shared
//! button gradient that is re-rolled on a timer.

use egui::Color32;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Lower bound of generated action colors, as a packed `0xRRGGBB`.
pub const ACTION_COLOR_MIN: u32 = 0xAA_FF_AA;
/// Upper bound (inclusive) of generated action colors.
pub const ACTION_COLOR_MAX: u32 = 0xFF_FF_FF;

/// Palette the button gradient is drawn from.
pub const BUTTON_PALETTE: [Color32; 5] = [
    Color32::from_rgb(0xAD, 0xD8, 0xE6),
    Color32::from_rgb(0xFF, 0xD7, 0x00),
    Color32::from_rgb(0xFF, 0x63, 0x47),
    Color32::from_rgb(0xFF, 0xA5, 0x00),
    Color32::from_rgb(0x90, 0xEE, 0x90),
];

/// Alpha of the leading gradient stop.
pub const STOP_ALPHA_START: f32 = 0.5;
/// Alpha of the trailing gradient stop.
pub const STOP_ALPHA_END: f32 = 0.0;

/// Unpack `0xRRGGBB`.
pub fn color_from_packed(rgb: u32) -> Color32 {
    Color32::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Apply a 0.0..=1.0 alpha to an opaque color.
pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a)
}

/// A light tone drawn uniformly from the packed range
/// `ACTION_COLOR_MIN..=ACTION_COLOR_MAX`.
pub fn random_action_color<R: Rng + ?Sized>(rng: &mut R) -> Color32 {
    color_from_packed(rng.gen_range(ACTION_COLOR_MIN..=ACTION_COLOR_MAX))
}

/// Lazily assigned action colors, keyed by display name.
#[derive(Debug, Default, Clone)]
pub struct ColorBook {
    colors: HashMap<String, Color32>,
}

impl ColorBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for `name`, generating one on first use.
    pub fn assign<R: Rng + ?Sized>(&mut self, name: &str, rng: &mut R) -> Color32 {
        *self
            .colors
            .entry(name.to_string())
            .or_insert_with(|| random_action_color(rng))
    }

    pub fn get(&self, name: &str) -> Option<Color32> {
        self.colors.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Two-stop diagonal gradient shared by every deck button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonStyle {
    pub start: Color32,
    pub end: Color32,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            start: Color32::from_rgb(0xFF, 0x6E, 0xC7),
            end: Color32::from_rgb(0x73, 0x6E, 0xFE),
        }
    }
}

impl ButtonStyle {
    /// Pick two distinct palette colors.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut picks = BUTTON_PALETTE.choose_multiple(rng, 2);
        let start = *picks.next().unwrap_or(&BUTTON_PALETTE[0]);
        let end = *picks.next().unwrap_or(&BUTTON_PALETTE[1]);
        Self { start, end }
    }

    /// Gradient stops `(top-left, bottom-right)` with alpha applied.
    /// Hovering swaps the stops.
    pub fn stops(&self, hovered: bool) -> (Color32, Color32) {
        let start = with_alpha(self.start, STOP_ALPHA_START);
        let end = with_alpha(self.end, STOP_ALPHA_END);
        if hovered {
            (end, start)
        } else {
            (start, end)
        }
    }
}

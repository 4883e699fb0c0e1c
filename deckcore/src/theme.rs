//! Deck theme: translucent panels over an animated background
//!
//! Panels are transparent so the GIF shows through; only the log sits on a
//! dark tinted card. Text is white and bold on buttons, near-white in the log.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

pub struct DeckColors;

impl DeckColors {
    pub const TEXT: Color32 = Color32::from_rgb(0xF0, 0xF0, 0xF0);
    pub const BUTTON_TEXT: Color32 = Color32::WHITE;
    /// `rgba(255, 255, 255, 0.2)` button outline.
    pub const BUTTON_BORDER: Color32 = Color32::from_rgba_premultiplied(51, 51, 51, 51);
    /// `rgba(30, 30, 30, 120)` log card.
    pub const LOG_FILL: Color32 = Color32::from_rgba_premultiplied(14, 14, 14, 120);
    pub const BUTTON_SHADOW: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 230);
    /// Shown when no background animation is available.
    pub const BACKDROP: Color32 = Color32::from_rgb(0x1A, 0x1A, 0x24);
}

pub struct DeckTheme {
    pub font_size_body: f32,
    pub font_size_button: f32,
    pub font_size_log: f32,
    pub rounding: f32,
    pub window_padding: f32,
    pub item_spacing: f32,
    pub button_padding: f32,
    /// Offset of the drop shadow under buttons.
    pub shadow_offset: f32,
}

impl Default for DeckTheme {
    fn default() -> Self {
        Self {
            font_size_body: 14.0,
            font_size_button: 13.0,
            font_size_log: 15.0,
            rounding: 8.0,
            window_padding: 10.0,
            item_spacing: 8.0,
            button_padding: 10.0,
            shadow_offset: 2.0,
        }
    }
}

impl DeckTheme {
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = Style::default();

        style.text_styles = [
            (TextStyle::Small, FontId::new(self.font_size_body - 3.0, FontFamily::Proportional)),
            (TextStyle::Body, FontId::new(self.font_size_body, FontFamily::Proportional)),
            (TextStyle::Button, FontId::new(self.font_size_button, FontFamily::Proportional)),
            (TextStyle::Heading, FontId::new(self.font_size_body + 6.0, FontFamily::Proportional)),
            (TextStyle::Monospace, FontId::new(self.font_size_log, FontFamily::Monospace)),
        ]
        .into();

        let mut visuals = Visuals::dark();
        visuals.panel_fill = Color32::TRANSPARENT;
        visuals.window_fill = Color32::TRANSPARENT;
        visuals.extreme_bg_color = DeckColors::LOG_FILL;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, DeckColors::TEXT);
        visuals.window_rounding = Rounding::same(self.rounding);
        visuals.window_stroke = Stroke::NONE;
        visuals.window_shadow = egui::epaint::Shadow::NONE;
        visuals.popup_shadow = egui::epaint::Shadow::NONE;
        style.visuals = visuals;

        style.spacing.window_margin = egui::Margin::same(self.window_padding);
        style.spacing.item_spacing = egui::vec2(self.item_spacing, self.item_spacing);
        style.spacing.button_padding = egui::vec2(self.button_padding, self.button_padding);

        ctx.set_style(style);
    }

    /// Dark translucent card holding the log.
    pub fn log_frame(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(DeckColors::LOG_FILL)
            .rounding(Rounding::same(self.rounding))
            .inner_margin(egui::Margin::same(8.0))
    }

    /// Root panel frame: transparent, padded.
    pub fn panel_frame(&self) -> egui::Frame {
        egui::Frame::none().inner_margin(egui::Margin::same(self.window_padding))
    }

    pub fn log_font(&self) -> FontId {
        FontId::new(self.font_size_log, FontFamily::Proportional)
    }

    pub fn button_font(&self) -> FontId {
        FontId::new(self.font_size_button, FontFamily::Proportional)
    }
}

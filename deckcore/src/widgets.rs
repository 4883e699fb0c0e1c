//! Deck widgets

use crate::palette::ButtonStyle;
use crate::theme::{DeckColors, DeckTheme};
use egui::epaint::Mesh;
use egui::{Color32, Pos2, Rect, Response, Sense, Shape, Stroke, Ui, Widget};

/// Extra width added around the label text.
pub const BUTTON_TEXT_MARGIN: f32 = 40.0;

/// Button with a diagonal two-stop gradient, bold white label and a
/// soft drop shadow. Hovering reverses the gradient.
pub struct GradientButton<'a> {
    text: &'a str,
    style: ButtonStyle,
    theme: &'a DeckTheme,
    min_width: f32,
}

impl<'a> GradientButton<'a> {
    pub fn new(text: &'a str, style: ButtonStyle, theme: &'a DeckTheme) -> Self {
        Self { text, style, theme, min_width: 0.0 }
    }

    /// Stretch to at least `width`, e.g. an equal share of the row.
    pub fn min_width(mut self, width: f32) -> Self {
        self.min_width = width;
        self
    }
}

impl<'a> Widget for GradientButton<'a> {
    fn ui(self, ui: &mut Ui) -> Response {
        let font = self.theme.button_font();
        let text_width = ui.fonts(|f| {
            f.layout_no_wrap(self.text.to_string(), font.clone(), DeckColors::BUTTON_TEXT)
                .size()
                .x
        });
        let height = self.theme.font_size_button + self.theme.button_padding * 2.0;
        let width = (text_width + BUTTON_TEXT_MARGIN).max(self.min_width);
        let (rect, response) = ui.allocate_exact_size(egui::vec2(width, height), Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let rounding = self.theme.rounding;
            let offset = egui::vec2(self.theme.shadow_offset, self.theme.shadow_offset);

            painter.rect_filled(rect.translate(offset), rounding, DeckColors::BUTTON_SHADOW.gamma_multiply(0.6));

            let (top_left, bottom_right) = self.style.stops(response.hovered());
            painter.add(Shape::mesh(diagonal_gradient(rect, top_left, bottom_right)));
            painter.rect_stroke(rect, rounding, Stroke::new(1.0, DeckColors::BUTTON_BORDER));

            let text_pos = if response.is_pointer_button_down_on() {
                rect.center() + egui::vec2(0.0, 1.0)
            } else {
                rect.center()
            };
            // Second pass a fraction of a pixel right gives the label a bold weight.
            for dx in [0.0, 0.6] {
                painter.text(
                    text_pos + egui::vec2(dx, 0.0),
                    egui::Align2::CENTER_CENTER,
                    self.text,
                    font.clone(),
                    DeckColors::BUTTON_TEXT,
                );
            }
        }

        response.on_hover_cursor(egui::CursorIcon::PointingHand)
    }
}

/// Quad shaded from `start` at the top-left corner to `end` at the
/// bottom-right; the other two corners take the midpoint.
pub fn diagonal_gradient(rect: Rect, start: Color32, end: Color32) -> Mesh {
    let mid = lerp_color(start, end, 0.5);
    let mut mesh = Mesh::default();
    let corners: [(Pos2, Color32); 4] = [
        (rect.left_top(), start),
        (rect.right_top(), mid),
        (rect.right_bottom(), end),
        (rect.left_bottom(), mid),
    ];
    for (pos, color) in corners {
        mesh.colored_vertex(pos, color);
    }
    mesh.add_triangle(0, 1, 2);
    mesh.add_triangle(0, 2, 3);
    mesh
}

fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_premultiplied(mix(a.r(), b.r()), mix(a.g(), b.g()), mix(a.b(), b.b()), mix(a.a(), b.a()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_corners() {
        let rect = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 40.0));
        let start = Color32::from_rgba_premultiplied(200, 100, 0, 200);
        let end = Color32::from_rgba_premultiplied(0, 0, 0, 0);
        let mesh = diagonal_gradient(rect, start, end);

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.vertices[0].pos, rect.left_top());
        assert_eq!(mesh.vertices[0].color, start);
        assert_eq!(mesh.vertices[2].color, end);
        assert_eq!(mesh.vertices[1].color, Color32::from_rgba_premultiplied(100, 50, 0, 100));
        assert_eq!(mesh.vertices[1].color, mesh.vertices[3].color);
    }
}

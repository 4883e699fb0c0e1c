//! The deck window: background, button row, log.

use crate::background::BackgroundPlayer;
use crate::window::Centering;
use deckcore::ticker::Ticker;
use deckcore::widgets::GradientButton;
use deckcore::{Controller, DeckTheme, Message, RepaintController, Settings};
use egui::{Context, LayerId, RichText, ScrollArea};
use std::sync::Arc;
use std::time::Instant;

pub struct DeckApp {
    controller: Controller,
    theme: DeckTheme,
    repaint: RepaintController,
    background: BackgroundPlayer,
    centering: Centering,
    swap: Ticker,
    recolor: Ticker,
    /// Button labels, in registry order.
    labels: Vec<String>,
    /// Messages raised while drawing, handled once the frame is laid out.
    outbox: Vec<Message>,
}

impl DeckApp {
    pub fn new(cc: &eframe::CreationContext<'_>, mut controller: Controller, settings: &Settings) -> Self {
        let theme = DeckTheme::default();
        theme.apply(&cc.egui_ctx);

        let ctx = cc.egui_ctx.clone();
        controller.set_waker(Arc::new(move || ctx.request_repaint()));

        let now = Instant::now();
        let labels = controller.registry().display_names();
        Self {
            controller,
            theme,
            repaint: RepaintController::new(),
            background: BackgroundPlayer::new(),
            centering: Centering::new(settings.recenter_delay(), now),
            swap: Ticker::new(settings.swap_interval(), now),
            recolor: Ticker::new(settings.recolor_interval(), now),
            labels,
            outbox: Vec::new(),
        }
    }

    fn render_buttons(&mut self, ui: &mut egui::Ui) {
        if self.labels.is_empty() {
            return;
        }
        let count = self.labels.len() as f32;
        let spacing = ui.spacing().item_spacing.x;
        let share = ((ui.available_width() - spacing * (count - 1.0)) / count).max(0.0);
        let style = self.controller.button_style();

        ui.horizontal(|ui| {
            for (index, label) in self.labels.iter().enumerate() {
                let button = GradientButton::new(label, style, &self.theme).min_width(share);
                if ui.add(button).clicked() {
                    self.outbox.push(Message::Enqueue(index));
                }
            }
        });
    }

    fn render_log(&self, ui: &mut egui::Ui) {
        let font = self.theme.log_font();
        self.theme.log_frame().show(ui, |ui| {
            ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for entry in self.controller.log().entries() {
                        ui.label(
                            RichText::new(&entry.text)
                                .font(font.clone())
                                .color(entry.color)
                                .strong(),
                        );
                    }
                });
        });
    }
}

impl eframe::App for DeckApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.repaint.begin_frame();
        let now = Instant::now();

        self.controller.pump();
        if self.swap.poll(now) {
            self.controller.handle(Message::SwapAnimation);
        }
        if self.recolor.poll(now) {
            self.controller.handle(Message::Recolor);
        }

        self.background.show(ctx, self.controller.background());
        self.background.poll(ctx, now);
        self.background
            .paint(&ctx.layer_painter(LayerId::background()), ctx.screen_rect());

        if let Some(at) = self.centering.update(ctx, now) {
            self.repaint.schedule(at);
        }

        egui::CentralPanel::default()
            .frame(self.theme.panel_frame())
            .show(ctx, |ui| {
                self.render_buttons(ui);
                ui.add_space(self.theme.item_spacing);
                self.render_log(ui);
            });

        let clicks = std::mem::take(&mut self.outbox);
        if !clicks.is_empty() {
            for message in clicks {
                self.controller.handle(message);
            }
            // Show the new log lines without waiting for input.
            ctx.request_repaint();
        }

        self.repaint.schedule(self.swap.deadline());
        self.repaint.schedule(self.recolor.deadline());
        if let Some(at) = self.background.deadline() {
            self.repaint.schedule(at);
        }
        self.repaint.end_frame(ctx);
    }
}

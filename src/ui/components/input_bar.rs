//! Input bar component
//!
//! Typed fallback for talking to the agent; submits on Enter or the Send
//! button.

use crate::engine::EngineHandle;
use crate::state::SessionSnapshot;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

/// Input bar component for typed input
pub struct InputBar<'a> {
    handle: &'a EngineHandle,
    snapshot: &'a SessionSnapshot,
    input_text: &'a mut String,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(
        handle: &'a EngineHandle,
        snapshot: &'a SessionSnapshot,
        input_text: &'a mut String,
        theme: &'a Theme,
    ) -> Self {
        Self {
            handle,
            snapshot,
            input_text,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let can_submit = self.snapshot.phase.can_accept_input();
                    let has_text = !self.input_text.trim().is_empty();

                    let send_width = 70.0;
                    let text_width =
                        (ui.available_width() - send_width - self.theme.spacing_sm).max(100.0);

                    let edit = egui::TextEdit::singleline(self.input_text)
                        .hint_text("Type a message instead of speaking...")
                        .desired_width(text_width);
                    let edit_response = ui.add(edit);

                    let enter_pressed = edit_response.lost_focus()
                        && ui.input(|i| i.key_pressed(Key::Enter));

                    let send_button = egui::Button::new(
                        RichText::new("Send").size(14.0).color(
                            if can_submit && has_text {
                                self.theme.text_primary
                            } else {
                                self.theme.text_muted
                            },
                        ),
                    )
                    .min_size(Vec2::new(send_width, 32.0))
                    .rounding(self.theme.button_rounding);

                    let send_clicked =
                        ui.add_enabled(can_submit && has_text, send_button).clicked();

                    if (enter_pressed || send_clicked) && can_submit && has_text {
                        let text = self.input_text.trim().to_string();
                        let _ = self.handle.submit_text(text);
                        self.input_text.clear();
                        edit_response.request_focus();
                    }
                });
            });
    }
}

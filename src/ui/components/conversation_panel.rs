//! Conversation history component
//!
//! Scrollable list of the user/agent exchanges so far.

use crate::conversation::{Message, Role};
use crate::ui::theme::Theme;
use chrono::Local;
use egui::{RichText, ScrollArea, Ui};

/// Conversation history panel
pub struct ConversationPanel<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
    max_height: f32,
}

impl<'a> ConversationPanel<'a> {
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            max_height: 260.0,
        }
    }

    /// Set the maximum height for the scrollable area
    pub fn max_height(mut self, height: f32) -> Self {
        self.max_height = height;
        self
    }

    /// Show the conversation history
    pub fn show(self, ui: &mut Ui) {
        if self.messages.is_empty() {
            return;
        }

        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.label(
                    RichText::new("Conversation History")
                        .strong()
                        .size(14.0)
                        .color(self.theme.text_primary),
                );

                ui.add_space(4.0);
                ui.separator();
                ui.add_space(4.0);

                ScrollArea::vertical()
                    .max_height(self.max_height)
                    .auto_shrink([false, true])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for message in self.messages {
                            self.show_message(ui, message);
                            ui.add_space(self.theme.spacing_sm);
                        }
                    });
            });
        });
    }

    fn show_message(&self, ui: &mut Ui, message: &Message) {
        let accent = match message.role {
            Role::User => self.theme.primary,
            Role::Agent => self.theme.secondary,
        };

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.button_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(message.role.label())
                            .strong()
                            .size(12.0)
                            .color(accent),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let stamp = message.timestamp.with_timezone(&Local);
                        ui.label(
                            RichText::new(stamp.format("%H:%M:%S").to_string())
                                .size(11.0)
                                .color(self.theme.text_muted),
                        );
                    });
                });

                ui.label(
                    RichText::new(&message.content)
                        .size(13.0)
                        .color(self.theme.text_secondary),
                );
            });
    }
}

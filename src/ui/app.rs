//! Main application struct and eframe integration
//!
//! This module contains the main BanterApp that implements eframe::App.
//! The app never mutates session state directly: it renders snapshots and
//! sends commands to the engine.

use crate::conversation::Message;
use crate::engine::EngineHandle;
use crate::state::{SessionEvent, SessionSnapshot};
use crate::ui::components::{ConversationPanel, InputBar, MicButton};
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, Color32, RichText, TopBottomPanel, Vec2};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

/// Main Banter application
pub struct BanterApp {
    /// Engine control handle
    handle: EngineHandle,
    /// Engine worker threads, joined on exit
    workers: Vec<JoinHandle<()>>,
    /// Visual theme
    theme: Theme,
    /// Typed input buffer
    input_text: String,
    /// Whether the app has been initialized
    initialized: bool,
}

impl BanterApp {
    /// Create a new Banter application
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        handle: EngineHandle,
        workers: Vec<JoinHandle<()>>,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        Self {
            handle,
            workers,
            theme,
            input_text: String::new(),
            initialized: false,
        }
    }

    /// Initialize the application (called on first frame)
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        info!("Banter UI initialized");
    }

    /// Drain pending engine events
    ///
    /// State is re-read from the shared snapshot every frame, so events
    /// only need logging here.
    fn drain_events(&mut self) {
        while let Some(event) = self.handle.try_recv_event() {
            match event {
                SessionEvent::StateChanged => {}
                SessionEvent::Error(e) => warn!("Engine error: {}", e),
                SessionEvent::Shutdown => info!("Engine shut down"),
            }
        }
    }

    /// Show the top header bar
    fn show_header(&self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Banter")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.label(
                        RichText::new("Voice Chat Agent")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );
                });
            });
    }

    /// Show the bottom typed-input area
    fn show_input_area(&mut self, ctx: &egui::Context, snapshot: &SessionSnapshot) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                InputBar::new(&self.handle, snapshot, &mut self.input_text, &self.theme).show(ui);
            });
    }

    /// Show the main content area
    fn show_content(
        &mut self,
        ctx: &egui::Context,
        snapshot: &SessionSnapshot,
        messages: &[Message],
    ) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(self.theme.spacing_lg);

                            MicButton::new(&self.handle, snapshot, &self.theme).show(ui);
                            self.handle_space_shortcut(ui, snapshot);

                            ui.add_space(self.theme.spacing_sm);

                            // Status line
                            ui.label(
                                RichText::new(&snapshot.status)
                                    .size(14.0)
                                    .color(self.theme.text_muted),
                            );

                            ui.add_space(self.theme.spacing);

                            self.show_controls(ui, snapshot, messages);

                            if let Some(error) = &snapshot.error {
                                ui.add_space(self.theme.spacing);
                                self.show_error_banner(ui, error);
                            }
                        });

                        ui.add_space(self.theme.spacing);

                        if !snapshot.transcript.is_empty() {
                            self.show_text_card(
                                ui,
                                "You said:",
                                &snapshot.transcript,
                                self.theme.primary,
                            );
                            ui.add_space(self.theme.spacing_sm);
                        }

                        if !snapshot.response.is_empty() {
                            self.show_text_card(
                                ui,
                                "Agent Response:",
                                &snapshot.response,
                                self.theme.secondary,
                            );
                            ui.add_space(self.theme.spacing_sm);
                        }

                        ConversationPanel::new(messages, &self.theme).show(ui);

                        ui.add_space(self.theme.spacing);
                    });
            });
    }

    /// Show the stop-speaking and clear-chat controls
    fn show_controls(&self, ui: &mut egui::Ui, snapshot: &SessionSnapshot, messages: &[Message]) {
        ui.horizontal(|ui| {
            // Center the two buttons
            let button_width = 120.0;
            let total = button_width * 2.0 + self.theme.spacing_sm;
            let pad = ((ui.available_width() - total) / 2.0).max(0.0);
            ui.add_space(pad);

            let stop_button = egui::Button::new(RichText::new("Stop Speaking").size(13.0))
                .min_size(Vec2::new(button_width, 32.0))
                .rounding(self.theme.button_rounding);
            if ui
                .add_enabled(snapshot.phase.is_speaking(), stop_button)
                .clicked()
            {
                let _ = self.handle.stop_speaking();
            }

            ui.add_space(self.theme.spacing_sm);

            let clear_button = egui::Button::new(RichText::new("Clear Chat").size(13.0))
                .min_size(Vec2::new(button_width, 32.0))
                .rounding(self.theme.button_rounding);
            if ui.add_enabled(!messages.is_empty(), clear_button).clicked() {
                let _ = self.handle.clear_conversation();
            }
        });
    }

    /// Show the error banner
    fn show_error_banner(&self, ui: &mut egui::Ui, error: &str) {
        egui::Frame::none()
            .fill(self.theme.error.gamma_multiply(0.15))
            .rounding(self.theme.button_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.label(RichText::new(error).size(13.0).color(self.theme.error));
            });
    }

    /// Show a labelled text card
    fn show_text_card(&self, ui: &mut egui::Ui, title: &str, text: &str, accent: Color32) {
        ui.group(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(title).strong().size(13.0).color(accent));
                ui.add_space(2.0);
                ui.label(
                    RichText::new(text)
                        .size(14.0)
                        .color(self.theme.text_secondary),
                );
            });
        });
    }

    /// Toggle the capture session with the space bar
    fn handle_space_shortcut(&self, ui: &egui::Ui, snapshot: &SessionSnapshot) {
        let space_pressed = ui.input(|i| i.key_pressed(egui::Key::Space));
        let any_widget_focused = ui.memory(|m| m.focused().is_some());
        let mic_enabled =
            self.handle.recognition_supported() && !snapshot.phase.is_speaking();

        if space_pressed && !any_widget_focused && mic_enabled {
            if snapshot.phase.is_listening() {
                let _ = self.handle.stop_listening();
            } else {
                let _ = self.handle.start_listening();
            }
        }
    }
}

impl eframe::App for BanterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Initialize on first frame
        self.initialize();

        // Poll backend events
        self.drain_events();

        let snapshot = self.handle.state().snapshot();
        let messages = self.handle.conversation().get_all();

        // Render UI
        self.show_header(ctx);
        self.show_input_area(ctx, &snapshot);
        self.show_content(ctx, &snapshot, &messages);

        // Request repaint for animations
        if snapshot.phase.is_active() {
            ctx.request_repaint();
        } else {
            // Engine events arrive between frames
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Banter shutting down");
        let _ = self.handle.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

//! Microphone button component
//!
//! The main control for toggling a capture session on/off.

use crate::engine::EngineHandle;
use crate::state::{SessionSnapshot, VoicePhase};
use crate::ui::theme::Theme;
use egui::{Color32, Rect, Sense, Vec2};

/// Round mic button for voice input
///
/// Disabled while a reply is being spoken and when no capture backend
/// exists; the orchestrator still guards every command, the button only
/// mirrors the phase.
pub struct MicButton<'a> {
    handle: &'a EngineHandle,
    snapshot: &'a SessionSnapshot,
    theme: &'a Theme,
}

impl<'a> MicButton<'a> {
    pub fn new(handle: &'a EngineHandle, snapshot: &'a SessionSnapshot, theme: &'a Theme) -> Self {
        Self {
            handle,
            snapshot,
            theme,
        }
    }

    fn enabled(&self) -> bool {
        self.handle.recognition_supported() && !self.snapshot.phase.is_speaking()
    }

    /// Show the mic button and return the response
    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let enabled = self.enabled();
        let sense = if enabled { Sense::click() } else { Sense::hover() };

        let size = Vec2::new(72.0, 72.0);
        let (rect, response) = ui.allocate_exact_size(size, sense);

        if ui.is_rect_visible(rect) {
            self.paint_button(ui, rect, &response);
        }

        if enabled && response.clicked() {
            if self.snapshot.phase.is_listening() {
                let _ = self.handle.stop_listening();
            } else {
                let _ = self.handle.start_listening();
            }
        }

        let tooltip = if !self.handle.recognition_supported() {
            "Speech recognition unavailable"
        } else if self.snapshot.phase.is_speaking() {
            "Wait for the reply to finish"
        } else if self.snapshot.phase.is_listening() {
            "Click to stop listening"
        } else {
            "Click to speak"
        };
        response.clone().on_hover_text(tooltip);

        response
    }

    /// Paint the button appearance
    fn paint_button(&self, ui: &mut egui::Ui, rect: Rect, response: &egui::Response) {
        let painter = ui.painter();
        let phase = self.snapshot.phase;
        let enabled = self.enabled();

        let bg_color = match phase {
            VoicePhase::Listening => self.theme.listening,
            VoicePhase::Processing => self.theme.warning.gamma_multiply(0.8),
            _ if !enabled => self.theme.primary.gamma_multiply(0.35),
            _ if response.hovered() => self.theme.primary.gamma_multiply(1.2),
            _ => self.theme.primary,
        };

        painter.circle_filled(rect.center(), 32.0, bg_color);

        if response.hovered() && enabled && !phase.is_listening() {
            painter.circle_stroke(
                rect.center(),
                33.0,
                egui::Stroke::new(2.0, self.theme.primary.gamma_multiply(0.6)),
            );
        }

        match phase {
            VoicePhase::Listening => {
                self.draw_stop_icon(painter, rect.center());
                self.draw_pulsing_ring(ui, rect.center());
            }
            VoicePhase::Processing => self.draw_processing_icon(ui, rect.center()),
            _ => self.draw_mic_icon(painter, rect.center()),
        }
    }

    /// Draw the stop square icon (while listening)
    fn draw_stop_icon(&self, painter: &egui::Painter, center: egui::Pos2) {
        painter.rect_filled(
            Rect::from_center_size(center, Vec2::splat(18.0)),
            2.0,
            Color32::WHITE,
        );
    }

    /// Draw the processing indicator (rotating dots)
    fn draw_processing_icon(&self, ui: &egui::Ui, center: egui::Pos2) {
        let painter = ui.painter();
        let t = ui.ctx().input(|i| i.time);
        let angle = t * 3.0;

        for i in 0..3 {
            let dot_angle = angle + (i as f64 * std::f64::consts::TAU / 3.0);
            let radius = 9.0;
            let dot_pos = egui::pos2(
                center.x + (dot_angle.cos() as f32 * radius),
                center.y + (dot_angle.sin() as f32 * radius),
            );

            let alpha = 1.0 - (i as f32 * 0.3);
            let color = Color32::from_white_alpha((255.0 * alpha) as u8);
            painter.circle_filled(dot_pos, 3.5, color);
        }

        ui.ctx().request_repaint();
    }

    /// Draw the microphone icon
    fn draw_mic_icon(&self, painter: &egui::Painter, center: egui::Pos2) {
        let color = Color32::WHITE;

        // Mic body
        let mic_rect = Rect::from_center_size(
            egui::pos2(center.x, center.y - 3.0),
            Vec2::new(10.0, 16.0),
        );
        painter.rect_filled(mic_rect, 5.0, color);

        // Mic cradle arc, approximated with line segments
        let arc_center = egui::pos2(center.x, center.y + 2.0);
        let arc_radius = 11.0;
        let num_segments = 8;
        for i in 0..num_segments {
            let start_angle = std::f32::consts::PI * (i as f32 / num_segments as f32);
            let end_angle = std::f32::consts::PI * ((i + 1) as f32 / num_segments as f32);

            let start = egui::pos2(
                arc_center.x - arc_radius * start_angle.cos(),
                arc_center.y + arc_radius * start_angle.sin(),
            );
            let end = egui::pos2(
                arc_center.x - arc_radius * end_angle.cos(),
                arc_center.y + arc_radius * end_angle.sin(),
            );

            painter.line_segment([start, end], egui::Stroke::new(2.0, color));
        }

        // Stem and base
        let stem_top = egui::pos2(center.x, arc_center.y + arc_radius);
        let stem_bottom = egui::pos2(center.x, arc_center.y + arc_radius + 5.0);
        painter.line_segment([stem_top, stem_bottom], egui::Stroke::new(2.0, color));
        painter.line_segment(
            [
                egui::pos2(center.x - 6.0, stem_bottom.y),
                egui::pos2(center.x + 6.0, stem_bottom.y),
            ],
            egui::Stroke::new(2.0, color),
        );
    }

    /// Draw pulsing ring animation while listening
    fn draw_pulsing_ring(&self, ui: &egui::Ui, center: egui::Pos2) {
        let painter = ui.painter();
        let t = ui.ctx().input(|i| i.time);
        let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

        let radius = 34.0 + pulse * 9.0;
        let alpha = (1.0 - pulse) * 0.6;

        painter.circle_stroke(
            center,
            radius,
            egui::Stroke::new(
                2.0 + pulse * 2.0,
                self.theme.listening.gamma_multiply(alpha),
            ),
        );

        let pulse2 = (((t * 3.0) + std::f64::consts::PI).sin() * 0.5 + 0.5) as f32;
        let radius2 = 34.0 + pulse2 * 9.0;
        let alpha2 = (1.0 - pulse2) * 0.4;

        painter.circle_stroke(
            center,
            radius2,
            egui::Stroke::new(
                1.5 + pulse2 * 1.5,
                self.theme.listening.gamma_multiply(alpha2),
            ),
        );

        ui.ctx().request_repaint();
    }
}

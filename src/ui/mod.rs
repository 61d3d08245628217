//! GUI implementation with egui/eframe
//!
//! This module provides the desktop user interface for Banter using the
//! eframe framework.

mod app;
pub mod components;
mod theme;

pub use app::BanterApp;
pub use theme::Theme;

use crate::engine::{EngineConfig, Orchestrator};
use anyhow::Context;

/// Run the Banter application
///
/// Builds and starts the engine, then hands its handle to the UI for the
/// lifetime of the window.
pub fn run(config: EngineConfig) -> anyhow::Result<()> {
    let (orchestrator, handle) = Orchestrator::new(config)?;
    let workers = orchestrator.start()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 840.0])
            .with_min_inner_size([540.0, 620.0])
            .with_title("Banter Voice Chat Agent"),
        ..Default::default()
    };

    eframe::run_native(
        "Banter",
        options,
        Box::new(move |cc| Ok(Box::new(BanterApp::new(cc, handle, workers)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("Failed to run the Banter UI")
}

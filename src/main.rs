use anyhow::{Context, Result};
use banter::speech::{SynthesizerKind, VoiceScript};
use banter::EngineConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Banter voice chat agent");

    let mut config = EngineConfig::new().with_synthesizer(pick_synthesizer());

    // A voice script stands in for the microphone; without one the mic
    // control stays disabled and input is typed
    if let Ok(path) = std::env::var("BANTER_SCRIPT") {
        let script = VoiceScript::load(&path)
            .with_context(|| format!("Failed to load voice script from {path}"))?;
        info!("Voice input scripted from {}", path);
        config = config.with_script(script);
    }

    banter::ui::run(config)
}

fn pick_synthesizer() -> SynthesizerKind {
    #[cfg(feature = "system-tts")]
    {
        if banter::speech::system::available() {
            info!("Using system TTS for playback");
            return SynthesizerKind::System;
        }
        tracing::warn!("No system TTS binary found, simulating playback");
    }
    SynthesizerKind::Simulated
}

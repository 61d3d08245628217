//! Speech service seams
//!
//! The engine owns two injected services: a recognizer that captures
//! utterances and a synthesizer that speaks replies. Both are trait objects
//! built by factories from the engine config, so tests and headless runs
//! substitute scripted or simulated backends without touching the engine.

pub mod script;
pub mod scripted;
pub mod simulated;
#[cfg(feature = "system-tts")]
pub mod system;

pub use script::{ScriptTurn, VoiceScript};
pub use scripted::ScriptedRecognizer;
pub use simulated::SimulatedSynthesizer;
#[cfg(feature = "system-tts")]
pub use system::SystemSynthesizer;

use crate::{BanterError, Result};
use crossbeam_channel::Receiver;
use uuid::Uuid;

/// Banner text when no capture backend is configured
pub const UNSUPPORTED_RECOGNITION: &str =
    "Speech recognition is not available on this system. Use the text input instead.";

/// Error payload when no playback backend is configured
pub const UNSUPPORTED_SYNTHESIS: &str = "Speech synthesis is not available on this system.";

/// Events from a capture session
#[derive(Clone, Debug)]
pub enum RecognitionEvent {
    /// Interim hypothesis text, replaces the previous one
    Hypothesis(String),
    /// Finalized utterance for this capture session
    Utterance(String),
    /// Platform-style error code ("no-speech", "audio-capture", ...)
    Error(String),
    /// The capture session is over
    Ended,
}

/// Events from reply playback
#[derive(Clone, Debug)]
pub enum SynthesisEvent {
    /// Playback started
    Started { utterance_id: Uuid },
    /// Playback finished naturally
    Finished { utterance_id: Uuid },
    /// Playback failed
    Error { utterance_id: Uuid, code: String },
}

/// Capture service: one utterance per session, hypotheses along the way
///
/// Every session terminates with `Ended`, whether it produced a finalized
/// utterance, was stopped, or failed.
pub trait SpeechRecognizer: Send {
    /// Begin a capture session
    fn start(&mut self) -> Result<()>;

    /// Abort the capture session
    fn stop(&mut self) -> Result<()>;

    /// Event stream for this recognizer
    fn events(&self) -> Receiver<RecognitionEvent>;
}

/// Playback service: one utterance at a time
///
/// A new `speak` pre-empts the utterance in flight; the pre-empted
/// utterance never emits `Finished`.
pub trait SpeechSynthesizer: Send {
    /// Speak a reply, returning the id its events will carry
    fn speak(&mut self, text: &str) -> Result<Uuid>;

    /// Stop playback and suppress the pending finish event
    fn cancel(&mut self) -> Result<()>;

    /// Event stream for this synthesizer
    fn events(&self) -> Receiver<SynthesisEvent>;
}

/// Capture session knobs
#[derive(Clone, Debug)]
pub struct RecognizerConfig {
    /// BCP-47 language tag for the capture session
    pub locale: String,
    /// Emit hypothesis events while the utterance is still in flight
    pub interim_results: bool,
    /// Keep capturing after a finalized utterance
    pub continuous: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            interim_results: true,
            continuous: false,
        }
    }
}

impl RecognizerConfig {
    /// Set the capture locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Enable or disable interim hypotheses
    pub fn with_interim_results(mut self, interim_results: bool) -> Self {
        self.interim_results = interim_results;
        self
    }

    /// Enable or disable continuous capture
    pub fn with_continuous(mut self, continuous: bool) -> Self {
        self.continuous = continuous;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.locale.trim().is_empty() {
            return Err(BanterError::ConfigError(
                "Recognizer locale must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Playback knobs, fixed for the engine lifetime
#[derive(Clone, Debug)]
pub struct SynthesisConfig {
    /// Speech rate multiplier (1.0 = normal)
    pub rate: f32,
    /// Voice pitch multiplier (1.0 = normal)
    pub pitch: f32,
    /// Playback volume (0.0 to 1.0)
    pub volume: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

impl SynthesisConfig {
    /// Set the speech rate multiplier
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    /// Set the voice pitch multiplier
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    /// Set the playback volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Validate the configuration
    ///
    /// Rate and pitch accept the 0.1 to 10.0 range; volume is 0.0 to 1.0.
    pub fn validate(&self) -> Result<()> {
        if !(0.1..=10.0).contains(&self.rate) {
            return Err(BanterError::ConfigError(format!(
                "Synthesis rate {} out of range (0.1 to 10.0)",
                self.rate
            )));
        }
        if !(0.1..=10.0).contains(&self.pitch) {
            return Err(BanterError::ConfigError(format!(
                "Synthesis pitch {} out of range (0.1 to 10.0)",
                self.pitch
            )));
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(BanterError::ConfigError(format!(
                "Synthesis volume {} out of range (0.0 to 1.0)",
                self.volume
            )));
        }
        Ok(())
    }
}

/// Capture backend selection
#[derive(Clone, Debug, Default)]
pub enum RecognizerKind {
    /// Play back a TOML voice script
    Scripted { script: VoiceScript },
    /// No capture source on this platform
    #[default]
    Unavailable,
}

/// Playback backend selection
#[derive(Clone, Debug, Default)]
pub enum SynthesizerKind {
    /// Shell out to a system TTS binary
    #[cfg(feature = "system-tts")]
    System,
    /// Timing-only playback for tests and headless runs
    #[default]
    Simulated,
    /// No playback on this platform
    Unavailable,
}

/// Build the configured recognizer
///
/// `Unavailable` reports the unsupported-feature error; the caller decides
/// whether that disables the mic control or aborts startup.
pub fn create_recognizer(
    kind: RecognizerKind,
    config: RecognizerConfig,
) -> Result<Box<dyn SpeechRecognizer>> {
    config.validate()?;
    match kind {
        RecognizerKind::Scripted { script } => Ok(Box::new(ScriptedRecognizer::new(script, config))),
        RecognizerKind::Unavailable => {
            Err(BanterError::Unsupported(UNSUPPORTED_RECOGNITION.to_string()))
        }
    }
}

/// Build the configured synthesizer
pub fn create_synthesizer(
    kind: SynthesizerKind,
    config: SynthesisConfig,
) -> Result<Box<dyn SpeechSynthesizer>> {
    config.validate()?;
    match kind {
        #[cfg(feature = "system-tts")]
        SynthesizerKind::System => Ok(Box::new(SystemSynthesizer::new(config)?)),
        SynthesizerKind::Simulated => Ok(Box::new(SimulatedSynthesizer::new(config))),
        SynthesizerKind::Unavailable => {
            Err(BanterError::Unsupported(UNSUPPORTED_SYNTHESIS.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizer_config_defaults() {
        let config = RecognizerConfig::default();
        assert_eq!(config.locale, "en-US");
        assert!(config.interim_results);
        assert!(!config.continuous);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_recognizer_config_builders() {
        let config = RecognizerConfig::default()
            .with_locale("en-GB")
            .with_interim_results(false)
            .with_continuous(true);
        assert_eq!(config.locale, "en-GB");
        assert!(!config.interim_results);
        assert!(config.continuous);
    }

    #[test]
    fn test_recognizer_config_rejects_empty_locale() {
        let config = RecognizerConfig::default().with_locale("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_synthesis_config_defaults() {
        let config = SynthesisConfig::default();
        assert_eq!(config.rate, 1.0);
        assert_eq!(config.pitch, 1.0);
        assert_eq!(config.volume, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_synthesis_config_validation_bounds() {
        assert!(SynthesisConfig::default().with_rate(0.05).validate().is_err());
        assert!(SynthesisConfig::default().with_rate(10.0).validate().is_ok());
        assert!(SynthesisConfig::default().with_pitch(11.0).validate().is_err());
        assert!(SynthesisConfig::default().with_volume(1.5).validate().is_err());
        assert!(SynthesisConfig::default().with_volume(0.0).validate().is_ok());
    }

    #[test]
    fn test_create_recognizer_unavailable() {
        let result = create_recognizer(RecognizerKind::Unavailable, RecognizerConfig::default());
        match result {
            Err(BanterError::Unsupported(msg)) => assert_eq!(msg, UNSUPPORTED_RECOGNITION),
            _ => panic!("Expected Unsupported error"),
        }
    }

    #[test]
    fn test_create_synthesizer_unavailable() {
        let result = create_synthesizer(SynthesizerKind::Unavailable, SynthesisConfig::default());
        assert!(matches!(result, Err(BanterError::Unsupported(_))));
    }

    #[test]
    fn test_create_simulated_synthesizer() {
        let result = create_synthesizer(SynthesizerKind::Simulated, SynthesisConfig::default());
        assert!(result.is_ok());
    }
}

//! Engine configuration
//!
//! Selects the speech backends and carries their knobs plus the channel
//! sizing for the orchestrator loop.

use crate::speech::{
    RecognizerConfig, RecognizerKind, SynthesisConfig, SynthesizerKind, VoiceScript,
};
use crate::{BanterError, Result};

/// Configuration for the voice engine
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Capture backend to build
    pub recognizer: RecognizerKind,

    /// Playback backend to build
    pub synthesizer: SynthesizerKind,

    /// Capture session knobs
    pub recognition: RecognizerConfig,

    /// Playback knobs
    pub synthesis: SynthesisConfig,

    /// Channel buffer size
    pub channel_buffer_size: usize,

    /// Shutdown timeout in milliseconds
    pub shutdown_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recognizer: RecognizerKind::default(),
            synthesizer: SynthesizerKind::default(),
            recognition: RecognizerConfig::default(),
            synthesis: SynthesisConfig::default(),
            channel_buffer_size: 100,
            shutdown_timeout_ms: 5000,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the capture backend
    pub fn with_recognizer(mut self, kind: RecognizerKind) -> Self {
        self.recognizer = kind;
        self
    }

    /// Set the playback backend
    pub fn with_synthesizer(mut self, kind: SynthesizerKind) -> Self {
        self.synthesizer = kind;
        self
    }

    /// Capture utterances from a voice script
    pub fn with_script(mut self, script: VoiceScript) -> Self {
        self.recognizer = RecognizerKind::Scripted { script };
        self
    }

    /// Set the capture session knobs
    pub fn with_recognition(mut self, recognition: RecognizerConfig) -> Self {
        self.recognition = recognition;
        self
    }

    /// Set the playback knobs
    pub fn with_synthesis(mut self, synthesis: SynthesisConfig) -> Self {
        self.synthesis = synthesis;
        self
    }

    /// Set the channel buffer size
    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }

    /// Set the shutdown timeout
    pub fn with_shutdown_timeout_ms(mut self, timeout: u64) -> Self {
        self.shutdown_timeout_ms = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.recognition.validate()?;
        self.synthesis.validate()?;
        if self.channel_buffer_size == 0 {
            return Err(BanterError::ConfigError(
                "Channel buffer size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(matches!(config.recognizer, RecognizerKind::Unavailable));
        assert!(matches!(config.synthesizer, SynthesizerKind::Simulated));
        assert_eq!(config.channel_buffer_size, 100);
        assert_eq!(config.shutdown_timeout_ms, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let script = VoiceScript::from_utterances("greeting", ["hello"]);
        let config = EngineConfig::new()
            .with_script(script)
            .with_channel_buffer_size(200)
            .with_shutdown_timeout_ms(10000);

        assert!(matches!(config.recognizer, RecognizerKind::Scripted { .. }));
        assert_eq!(config.channel_buffer_size, 200);
        assert_eq!(config.shutdown_timeout_ms, 10000);
    }

    #[test]
    fn test_config_rejects_zero_buffer() {
        let config = EngineConfig::new().with_channel_buffer_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_invalid_synthesis() {
        let config =
            EngineConfig::new().with_synthesis(SynthesisConfig::default().with_rate(50.0));
        assert!(config.validate().is_err());
    }
}

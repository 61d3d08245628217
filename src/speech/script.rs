//! Voice script files for the scripted recognizer
//!
//! A script is a TOML file listing capture turns. Each `start()` on the
//! scripted recognizer plays the next turn: an utterance (interim
//! hypotheses followed by the finalized text) or a platform-style error.
//! Once the script is exhausted, further sessions report `no-speech`.
//!
//! ```toml
//! [script]
//! name = "demo conversation"
//!
//! [[turns]]
//! type = "utterance"
//! text = "hello there"
//!
//! [[turns]]
//! type = "error"
//! code = "no-speech"
//! ```

use crate::{BanterError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

fn default_delay_ms() -> u64 {
    300
}

fn default_word_ms() -> u64 {
    120
}

/// A voice script loaded from a TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceScript {
    /// Script metadata
    pub script: ScriptMetadata,
    /// Capture turns, played one per session
    pub turns: Vec<ScriptTurn>,
}

/// Metadata about the script
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptMetadata {
    /// Name of the script
    pub name: String,
    /// Description of the conversation it plays
    #[serde(default)]
    pub description: String,
}

/// A single capture turn
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptTurn {
    /// A spoken utterance, finalized after its interim hypotheses
    Utterance {
        /// The finalized text
        text: String,
        /// Delay before the first hypothesis
        #[serde(default = "default_delay_ms")]
        delay_ms: u64,
        /// Pacing between word-by-word hypotheses
        #[serde(default = "default_word_ms")]
        word_ms: u64,
    },
    /// A platform-style recognition error
    Error {
        /// Raw error code surfaced to the user ("no-speech", "not-allowed", ...)
        code: String,
        /// Delay before the error fires
        #[serde(default = "default_delay_ms")]
        delay_ms: u64,
    },
}

impl VoiceScript {
    /// Load a voice script from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BanterError::ScriptError(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let script: VoiceScript = toml::from_str(&content).map_err(|e| {
            BanterError::ScriptError(format!("Failed to parse '{}': {}", path.display(), e))
        })?;

        script.validate()?;
        Ok(script)
    }

    /// Parse a voice script from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let script: VoiceScript = toml::from_str(content)
            .map_err(|e| BanterError::ScriptError(format!("Failed to parse script: {}", e)))?;
        script.validate()?;
        Ok(script)
    }

    /// Validate the script
    pub fn validate(&self) -> Result<()> {
        if self.turns.is_empty() {
            return Err(BanterError::ScriptError(
                "Voice script must have at least one turn".to_string(),
            ));
        }

        for (index, turn) in self.turns.iter().enumerate() {
            match turn {
                ScriptTurn::Utterance { text, .. } if text.trim().is_empty() => {
                    return Err(BanterError::ScriptError(format!(
                        "Turn {} has an empty utterance",
                        index + 1
                    )));
                }
                ScriptTurn::Error { code, .. } if code.trim().is_empty() => {
                    return Err(BanterError::ScriptError(format!(
                        "Turn {} has an empty error code",
                        index + 1
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Build a one-off script from utterance texts
    ///
    /// Convenience for tests and wiring checks.
    pub fn from_utterances<I, S>(name: &str, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: ScriptMetadata {
                name: name.to_string(),
                description: String::new(),
            },
            turns: texts
                .into_iter()
                .map(|text| ScriptTurn::Utterance {
                    text: text.into(),
                    delay_ms: default_delay_ms(),
                    word_ms: default_word_ms(),
                })
                .collect(),
        }
    }
}

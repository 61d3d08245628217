//! Error types for the Banter application
//!
//! Structured errors for the speech services, the rule engine worker, and the
//! channel plumbing between them.

use thiserror::Error;

/// Banter application errors
#[derive(Error, Debug, Clone)]
pub enum BanterError {
    /// A speech capability is not available on this platform
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Speech recognition error
    #[error("Speech recognition error: {0}")]
    RecognitionError(String),

    /// Speech synthesis error
    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    /// Channel communication error
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// File system I/O error
    #[error("IO error: {0}")]
    IOError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Voice script load or parse error
    #[error("Voice script error: {0}")]
    ScriptError(String),
}

impl From<std::io::Error> for BanterError {
    fn from(e: std::io::Error) -> Self {
        BanterError::IOError(e.to_string())
    }
}

impl BanterError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors allow the session to continue after a manual retry,
    /// while non-recoverable errors disable the feature or require a restart.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Missing platform capability stays missing for the process lifetime
            BanterError::Unsupported(_) => false,
            // Recognition errors clear on the next capture attempt
            BanterError::RecognitionError(_) => true,
            // Synthesis errors clear on the next reply
            BanterError::SynthesisError(_) => true,
            // Channel errors indicate internal issues
            BanterError::ChannelError(_) => false,
            // IO errors may require user intervention
            BanterError::IOError(_) => false,
            // Config errors require user intervention
            BanterError::ConfigError(_) => false,
            // A broken script file stays broken until edited
            BanterError::ScriptError(_) => false,
        }
    }

    /// Get a user-friendly description of the error
    ///
    /// Returns a message suitable for display in the UI.
    pub fn user_message(&self) -> String {
        match self {
            // Unsupported messages are written for the user at construction
            BanterError::Unsupported(msg) => msg.clone(),
            BanterError::RecognitionError(_) => {
                "Speech recognition failed. Please try again.".to_string()
            }
            BanterError::SynthesisError(_) => {
                "Speech synthesis failed. Please try again.".to_string()
            }
            BanterError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            BanterError::IOError(_) => {
                "File system error occurred.".to_string()
            }
            BanterError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            BanterError::ScriptError(_) => {
                "Voice script could not be loaded. Please check the file.".to_string()
            }
        }
    }
}

/// Result type alias for Banter operations
pub type Result<T> = std::result::Result<T, BanterError>;

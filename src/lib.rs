//! Banter: a desktop voice chat agent
//!
//! Captures an utterance, matches it against an ordered rule table, and
//! speaks the reply. Speech capture and playback are injected services, so
//! the whole pipeline runs headless under tests with a scripted recognizer
//! and a simulated synthesizer.

pub mod agent;
pub mod conversation;
pub mod engine;
mod error;
pub mod speech;
pub mod state;
pub mod ui;

pub use engine::{EngineConfig, EngineHandle, Orchestrator};
pub use error::{BanterError, Result};
pub use state::{SessionCommand, SessionEvent, SharedSessionState, VoicePhase};

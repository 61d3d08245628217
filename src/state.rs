//! Session state for the Banter voice agent
//!
//! This module provides a thread-safe shared state that is accessed by:
//! - **Orchestrator**: sole writer, applies transitions from service events
//! - **UI**: reads snapshots for rendering, sends commands
//!
//! The design separates:
//! - **State**: shared data that can be queried synchronously
//! - **Commands**: requests to change state (sent to the orchestrator)
//! - **Events**: notifications for UI updates (repaints, errors)

use parking_lot::RwLock;
use std::sync::Arc;

/// Status line vocabulary shown under the mic control
pub mod status {
    pub const INITIAL: &str = "Click the microphone to start";
    pub const LISTENING: &str = "Listening... Speak now";
    pub const STOPPED_LISTENING: &str = "Stopped listening";
    pub const PROCESSING: &str = "Processing your request...";
    pub const SPEAKING: &str = "Speaking response...";
    pub const SPEAK_AGAIN: &str = "Click the microphone to speak again";
    pub const STOPPED_SPEAKING: &str = "Stopped speaking";
    pub const RECOGNITION_ERROR: &str = "Error occurred. Click to try again.";
    pub const SYNTHESIS_ERROR: &str = "Error speaking. Click to try again.";
}

/// Voice pipeline phase
///
/// At most one voice operation is active at a time; the orchestrator is the
/// only writer and guards every transition, so the phase is authoritative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoicePhase {
    /// Nothing in flight, ready for input
    #[default]
    Idle,
    /// Capturing an utterance from the recognizer
    Listening,
    /// A finalized utterance is with the responder
    Processing,
    /// The reply is being spoken by the synthesizer
    Speaking,
    /// A service reported an error; waiting for a manual retry
    Error,
}

impl VoicePhase {
    /// Check if currently listening
    pub fn is_listening(&self) -> bool {
        matches!(self, VoicePhase::Listening)
    }

    /// Check if a reply is being generated
    pub fn is_processing(&self) -> bool {
        matches!(self, VoicePhase::Processing)
    }

    /// Check if a reply is being spoken
    pub fn is_speaking(&self) -> bool {
        matches!(self, VoicePhase::Speaking)
    }

    /// Check if idle
    pub fn is_idle(&self) -> bool {
        matches!(self, VoicePhase::Idle)
    }

    /// Check if the last operation failed
    pub fn is_error(&self) -> bool {
        matches!(self, VoicePhase::Error)
    }

    /// Check if in an active state (not idle or errored)
    pub fn is_active(&self) -> bool {
        !matches!(self, VoicePhase::Idle | VoicePhase::Error)
    }

    /// Check if a new capture or typed submission may start
    ///
    /// Allowed from `Idle` and from `Error` (manual retry after a failure).
    pub fn can_accept_input(&self) -> bool {
        matches!(self, VoicePhase::Idle | VoicePhase::Error)
    }
}

impl std::fmt::Display for VoicePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoicePhase::Idle => write!(f, "Idle"),
            VoicePhase::Listening => write!(f, "Listening"),
            VoicePhase::Processing => write!(f, "Processing"),
            VoicePhase::Speaking => write!(f, "Speaking"),
            VoicePhase::Error => write!(f, "Error"),
        }
    }
}

/// Unified session state
///
/// Single source of truth for the conversation turn in flight. Shared across
/// threads via `SharedSessionState`.
#[derive(Clone, Debug)]
pub struct SessionState {
    /// Current voice pipeline phase
    pub phase: VoicePhase,
    /// Transcript of the current utterance (interim or finalized)
    pub transcript: String,
    /// The agent's latest reply text
    pub response: String,
    /// Status line text
    pub status: String,
    /// Current error banner (if any)
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Create the initial state
    pub fn new() -> Self {
        Self {
            phase: VoicePhase::Idle,
            transcript: String::new(),
            response: String::new(),
            status: status::INITIAL.to_string(),
            error: None,
        }
    }

    /// Create an immutable snapshot of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            transcript: self.transcript.clone(),
            response: self.response.clone(),
            status: self.status.clone(),
            error: self.error.clone(),
        }
    }

    /// Set an error banner
    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }

    /// Clear the current error banner
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // === State transitions ===

    /// Begin a capture session
    ///
    /// Clears the transcript and banner but keeps the previous reply visible.
    pub fn start_listening(&mut self) {
        self.phase = VoicePhase::Listening;
        self.transcript.clear();
        self.status = status::LISTENING.to_string();
        self.clear_error();
    }

    /// Stop capturing on user request
    pub fn stop_listening(&mut self) {
        self.phase = VoicePhase::Idle;
        self.status = status::STOPPED_LISTENING.to_string();
    }

    /// Update the transcript with an interim hypothesis
    pub fn set_hypothesis(&mut self, text: String) {
        self.transcript = text;
    }

    /// A complete utterance (spoken or typed) is with the responder
    pub fn begin_processing(&mut self, text: String) {
        self.phase = VoicePhase::Processing;
        self.transcript = text;
        self.status = status::PROCESSING.to_string();
        self.clear_error();
    }

    /// Record the reply about to be spoken
    pub fn set_reply(&mut self, text: String) {
        self.response = text;
        self.status = status::SPEAKING.to_string();
    }

    /// Playback of the reply has started
    pub fn begin_speaking(&mut self) {
        self.phase = VoicePhase::Speaking;
    }

    /// The reply has been delivered, return to idle
    pub fn finish_speaking(&mut self) {
        self.phase = VoicePhase::Idle;
        self.status = status::SPEAK_AGAIN.to_string();
    }

    /// Playback cut short on user request
    pub fn stop_speaking(&mut self) {
        self.phase = VoicePhase::Idle;
        self.status = status::STOPPED_SPEAKING.to_string();
    }

    /// The capture session ended without a finalized utterance
    pub fn end_capture(&mut self) {
        self.phase = VoicePhase::Idle;
    }

    /// The recognizer reported an error
    pub fn fail_recognition(&mut self, code: &str) {
        self.phase = VoicePhase::Error;
        self.error = Some(format!("Error: {code}"));
        self.status = status::RECOGNITION_ERROR.to_string();
    }

    /// The synthesizer reported an error
    pub fn fail_synthesis(&mut self, code: &str) {
        self.phase = VoicePhase::Error;
        self.error = Some(format!("Error: {code}"));
        self.status = status::SYNTHESIS_ERROR.to_string();
    }

    /// Reset everything to the initial state
    pub fn reset(&mut self) {
        *self = SessionState::new();
    }
}

/// Immutable snapshot of session state
///
/// Used for thread-safe reads without holding locks across rendering.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub phase: VoicePhase,
    pub transcript: String,
    pub response: String,
    pub status: String,
    pub error: Option<String>,
}

/// Thread-safe shared session state
///
/// Wraps `SessionState` in `Arc<RwLock<>>` for safe concurrent access.
#[derive(Clone)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionState>>,
}

impl Default for SharedSessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedSessionState {
    /// Create a new shared state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState::new())),
        }
    }

    /// Get a read lock on the state
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, SessionState> {
        self.inner.read()
    }

    /// Get a write lock on the state
    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, SessionState> {
        self.inner.write()
    }

    /// Get a snapshot of the current state (no lock held after return)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.read().snapshot()
    }

    // === Convenience read methods ===

    /// Get the current phase
    pub fn phase(&self) -> VoicePhase {
        self.inner.read().phase
    }

    /// Check if capturing
    pub fn is_listening(&self) -> bool {
        self.inner.read().phase.is_listening()
    }

    /// Check if speaking
    pub fn is_speaking(&self) -> bool {
        self.inner.read().phase.is_speaking()
    }

    /// Check if a new capture or typed submission may start
    pub fn can_accept_input(&self) -> bool {
        self.inner.read().phase.can_accept_input()
    }

    /// Get the current status line
    pub fn status(&self) -> String {
        self.inner.read().status.clone()
    }

    /// Get the current error banner (if any)
    pub fn error(&self) -> Option<String> {
        self.inner.read().error.clone()
    }
}

/// Commands that control the session
///
/// Processed by the orchestrator; illegal commands for the current phase are
/// logged and dropped.
#[derive(Clone, Debug)]
pub enum SessionCommand {
    /// Begin a capture session
    StartListening,
    /// Stop the capture session without waiting for a final utterance
    StopListening,
    /// Submit typed text directly to the responder (bypasses capture)
    SubmitText(String),
    /// Cut off the reply being spoken
    StopSpeaking,
    /// Clear the conversation log and reset the session
    ClearConversation,
    /// Shut down the engine and its workers
    Shutdown,
}

/// Events emitted by the engine
///
/// Used for UI repaints and logging. State should be queried from
/// `SharedSessionState` rather than reconstructed from events.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// State has changed (trigger UI repaint)
    StateChanged,
    /// Error occurred
    Error(String),
    /// Shutdown complete
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SessionState::new();
        assert!(state.phase.is_idle());
        assert!(state.transcript.is_empty());
        assert!(state.response.is_empty());
        assert_eq!(state.status, status::INITIAL);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_voice_turn_transitions() {
        let mut state = SessionState::new();

        state.start_listening();
        assert!(state.phase.is_listening());
        assert_eq!(state.status, status::LISTENING);

        state.set_hypothesis("what".to_string());
        state.set_hypothesis("what time".to_string());
        assert_eq!(state.transcript, "what time");
        assert!(state.phase.is_listening());

        state.begin_processing("what time is it".to_string());
        assert!(state.phase.is_processing());
        assert_eq!(state.transcript, "what time is it");
        assert_eq!(state.status, status::PROCESSING);

        state.set_reply("The current time is 3:04 PM.".to_string());
        assert_eq!(state.status, status::SPEAKING);
        assert!(state.phase.is_processing());

        state.begin_speaking();
        assert!(state.phase.is_speaking());

        state.finish_speaking();
        assert!(state.phase.is_idle());
        assert_eq!(state.status, status::SPEAK_AGAIN);
    }

    #[test]
    fn test_start_listening_keeps_previous_reply() {
        let mut state = SessionState::new();
        state.begin_processing("hello".to_string());
        state.set_reply("Hello!".to_string());
        state.begin_speaking();
        state.finish_speaking();

        state.start_listening();
        assert_eq!(state.response, "Hello!");
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn test_stop_listening() {
        let mut state = SessionState::new();
        state.start_listening();
        state.stop_listening();
        assert!(state.phase.is_idle());
        assert_eq!(state.status, status::STOPPED_LISTENING);
    }

    #[test]
    fn test_capture_end_without_utterance_keeps_status() {
        let mut state = SessionState::new();
        state.start_listening();
        state.end_capture();
        assert!(state.phase.is_idle());
        // The status line is deliberately left as-is
        assert_eq!(state.status, status::LISTENING);
    }

    #[test]
    fn test_recognition_error() {
        let mut state = SessionState::new();
        state.start_listening();
        state.fail_recognition("no-speech");
        assert!(state.phase.is_error());
        assert_eq!(state.error, Some("Error: no-speech".to_string()));
        assert_eq!(state.status, status::RECOGNITION_ERROR);
        // A retry is allowed and clears the banner
        assert!(state.phase.can_accept_input());
        state.start_listening();
        assert!(state.phase.is_listening());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_synthesis_error() {
        let mut state = SessionState::new();
        state.begin_processing("tell me a joke".to_string());
        state.set_reply("...".to_string());
        state.begin_speaking();
        state.fail_synthesis("synthesis-failed");
        assert!(state.phase.is_error());
        assert_eq!(state.error, Some("Error: synthesis-failed".to_string()));
        assert_eq!(state.status, status::SYNTHESIS_ERROR);
    }

    #[test]
    fn test_stop_speaking() {
        let mut state = SessionState::new();
        state.begin_processing("hello".to_string());
        state.set_reply("Hello!".to_string());
        state.begin_speaking();
        state.stop_speaking();
        assert!(state.phase.is_idle());
        assert_eq!(state.status, status::STOPPED_SPEAKING);
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut state = SessionState::new();
        state.start_listening();
        state.begin_processing("hello".to_string());
        state.set_reply("Hello!".to_string());
        state.set_error("Error: aborted".to_string());

        state.reset();
        assert!(state.phase.is_idle());
        assert!(state.transcript.is_empty());
        assert!(state.response.is_empty());
        assert_eq!(state.status, status::INITIAL);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_phase_input_gating() {
        assert!(VoicePhase::Idle.can_accept_input());
        assert!(VoicePhase::Error.can_accept_input());
        assert!(!VoicePhase::Listening.can_accept_input());
        assert!(!VoicePhase::Processing.can_accept_input());
        assert!(!VoicePhase::Speaking.can_accept_input());
    }

    #[test]
    fn test_phase_activity() {
        assert!(!VoicePhase::Idle.is_active());
        assert!(!VoicePhase::Error.is_active());
        assert!(VoicePhase::Listening.is_active());
        assert!(VoicePhase::Processing.is_active());
        assert!(VoicePhase::Speaking.is_active());
    }

    #[test]
    fn test_shared_state() {
        let shared = SharedSessionState::new();

        assert!(shared.phase().is_idle());
        assert!(!shared.is_listening());

        {
            let mut state = shared.write();
            state.start_listening();
        }

        assert!(shared.is_listening());
        assert_eq!(shared.status(), status::LISTENING);

        let snapshot = shared.snapshot();
        assert!(snapshot.phase.is_listening());
    }

    #[test]
    fn test_snapshot_is_independent() {
        let shared = SharedSessionState::new();

        let snapshot1 = shared.snapshot();
        assert!(snapshot1.phase.is_idle());

        {
            shared.write().start_listening();
        }

        // snapshot1 should still show idle
        assert!(snapshot1.phase.is_idle());

        // new snapshot shows listening
        let snapshot2 = shared.snapshot();
        assert!(snapshot2.phase.is_listening());
    }

    #[test]
    fn test_session_command_variants() {
        let _start = SessionCommand::StartListening;
        let _stop = SessionCommand::StopListening;
        let _text = SessionCommand::SubmitText("test".to_string());
        let _stop_speaking = SessionCommand::StopSpeaking;
        let _clear = SessionCommand::ClearConversation;
        let _shutdown = SessionCommand::Shutdown;
    }

    #[test]
    fn test_session_event_variants() {
        let _changed = SessionEvent::StateChanged;
        let _error = SessionEvent::Error("test error".to_string());
        let _shutdown = SessionEvent::Shutdown;
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(VoicePhase::Idle.to_string(), "Idle");
        assert_eq!(VoicePhase::Listening.to_string(), "Listening");
        assert_eq!(VoicePhase::Processing.to_string(), "Processing");
        assert_eq!(VoicePhase::Speaking.to_string(), "Speaking");
        assert_eq!(VoicePhase::Error.to_string(), "Error");
    }
}

//! Orchestrator for the voice conversation loop
//!
//! Connects the injected services: recognizer -> responder -> synthesizer.
//!
//! The orchestrator is the only writer of the shared session state. Every
//! transition is guarded on the current phase, so stale events from a
//! pre-empted utterance or an already-stopped capture session are dropped
//! instead of corrupting the state machine.

use crate::agent::{Responder, ResponderEvent, ResponderWorker, RuleContext};
use crate::conversation::{ConversationLog, Message};
use crate::engine::config::EngineConfig;
use crate::speech::{
    create_recognizer, create_synthesizer, RecognitionEvent, SpeechRecognizer, SpeechSynthesizer,
    SynthesisEvent,
};
use crate::state::{SessionCommand, SessionEvent, SharedSessionState};
use crate::{BanterError, Result};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Handle for controlling the engine from the UI or tests
///
/// This provides the public interface for:
/// - Sending commands
/// - Receiving events (for UI repaints)
/// - Querying state (via SharedSessionState)
/// - Reading the conversation log
pub struct EngineHandle {
    /// Command sender for controlling the orchestrator
    command_tx: Sender<SessionCommand>,
    /// Event receiver for UI notifications
    event_rx: Receiver<SessionEvent>,
    /// Shared session state (for direct queries)
    state: SharedSessionState,
    /// Conversation log
    conversation: ConversationLog,
    /// Whether a capture backend was built
    recognition_supported: bool,
}

impl EngineHandle {
    /// Send a command to the orchestrator
    pub fn send_command(&self, cmd: SessionCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| BanterError::ChannelError(format!("Failed to send command: {}", e)))
    }

    /// Begin a capture session
    pub fn start_listening(&self) -> Result<()> {
        self.send_command(SessionCommand::StartListening)
    }

    /// Stop the capture session
    pub fn stop_listening(&self) -> Result<()> {
        self.send_command(SessionCommand::StopListening)
    }

    /// Submit typed text directly to the responder
    pub fn submit_text(&self, text: String) -> Result<()> {
        self.send_command(SessionCommand::SubmitText(text))
    }

    /// Cut off the reply being spoken
    pub fn stop_speaking(&self) -> Result<()> {
        self.send_command(SessionCommand::StopSpeaking)
    }

    /// Clear the conversation log and reset the session
    pub fn clear_conversation(&self) -> Result<()> {
        self.send_command(SessionCommand::ClearConversation)
    }

    /// Request shutdown
    pub fn shutdown(&self) -> Result<()> {
        self.send_command(SessionCommand::Shutdown)
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    pub fn recv_event(&self) -> Result<SessionEvent> {
        self.event_rx
            .recv()
            .map_err(|e| BanterError::ChannelError(format!("Failed to receive event: {}", e)))
    }

    /// Get the shared session state
    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }

    /// Get the conversation log
    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    /// Whether the mic control should be offered at all
    pub fn recognition_supported(&self) -> bool {
        self.recognition_supported
    }

    // === Convenience state query methods ===

    /// Check if capturing
    pub fn is_listening(&self) -> bool {
        self.state.is_listening()
    }

    /// Check if a reply is being spoken
    pub fn is_speaking(&self) -> bool {
        self.state.is_speaking()
    }

    /// Get the current status line
    pub fn status(&self) -> String {
        self.state.status()
    }
}

/// Main orchestrator that coordinates the voice services
///
/// Owns the recognizer and synthesizer, routes their events through the
/// session state machine, and forwards finalized utterances to the
/// responder worker.
pub struct Orchestrator {
    config: EngineConfig,

    // Shared state
    state: SharedSessionState,
    conversation: ConversationLog,

    // Channels for external communication
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,

    // Injected speech services (None when the platform has none)
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,

    // Responder components (to be started)
    responder: Option<Responder>,
    responder_worker: Option<ResponderWorker>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given configuration
    ///
    /// Returns the orchestrator and a handle for controlling it. The
    /// orchestrator must be started with `start()` to begin processing.
    pub fn new(config: EngineConfig) -> Result<(Self, EngineHandle)> {
        Self::with_rule_context(config, RuleContext::new())
    }

    /// Create an orchestrator with an explicit rule context
    ///
    /// Tests pin the responder's clock and RNG seed through this.
    pub fn with_rule_context(
        config: EngineConfig,
        ctx: RuleContext,
    ) -> Result<(Self, EngineHandle)> {
        config.validate()?;
        let buffer_size = config.channel_buffer_size;

        // Create shared state and the conversation log
        let state = SharedSessionState::new();
        let conversation = ConversationLog::new();

        // Create external communication channels
        let (command_tx, command_rx) = bounded(buffer_size);
        let (event_tx, event_rx) = bounded(buffer_size);

        // Build the capture service; an unsupported platform disables the
        // mic control and surfaces the banner, it does not abort startup
        let recognizer =
            match create_recognizer(config.recognizer.clone(), config.recognition.clone()) {
                Ok(recognizer) => Some(recognizer),
                Err(BanterError::Unsupported(msg)) => {
                    warn!("Speech recognition unavailable: {}", msg);
                    state.write().set_error(msg);
                    None
                }
                Err(e) => return Err(e),
            };

        // Build the playback service; without one, replies stay textual
        let synthesizer =
            match create_synthesizer(config.synthesizer.clone(), config.synthesis.clone()) {
                Ok(synthesizer) => Some(synthesizer),
                Err(BanterError::Unsupported(msg)) => {
                    warn!("Speech synthesis unavailable: {}", msg);
                    None
                }
                Err(e) => return Err(e),
            };

        // Create the responder
        let (responder, responder_worker) = Responder::with_context(ctx);

        let handle = EngineHandle {
            command_tx,
            event_rx,
            state: state.clone(),
            conversation: conversation.clone(),
            recognition_supported: recognizer.is_some(),
        };

        let orchestrator = Self {
            config,
            state,
            conversation,
            command_rx,
            event_tx,
            recognizer,
            synthesizer,
            responder: Some(responder),
            responder_worker: Some(responder_worker),
        };

        Ok((orchestrator, handle))
    }

    /// Start the orchestrator and the responder worker
    ///
    /// This consumes the orchestrator and returns join handles for all
    /// worker threads.
    pub fn start(mut self) -> Result<Vec<JoinHandle<()>>> {
        let mut handles = Vec::new();

        // Start the responder worker
        let responder_worker = self
            .responder_worker
            .take()
            .ok_or_else(|| BanterError::ChannelError("Responder worker already taken".into()))?;
        handles.push(responder_worker.start());
        info!("Responder worker started");

        let responder = self
            .responder
            .take()
            .ok_or_else(|| BanterError::ChannelError("Responder already taken".into()))?;

        // Start the main orchestrator loop
        handles.push(self.run_engine_loop(responder));
        info!("Engine loop started");

        Ok(handles)
    }

    /// Run the main engine event loop
    fn run_engine_loop(self, responder: Responder) -> JoinHandle<()> {
        let state = self.state;
        let conversation = self.conversation;
        let command_rx = self.command_rx;
        let event_tx = self.event_tx;
        let shutdown_timeout = Duration::from_millis(self.config.shutdown_timeout_ms);

        let mut recognizer = self.recognizer;
        let mut synthesizer = self.synthesizer;

        // Missing services get a channel nobody sends on so the select
        // arms still exist; the keepalive sender prevents disconnection
        let (recognition_rx, _recognition_keepalive) = match recognizer.as_ref() {
            Some(recognizer) => (recognizer.events(), None),
            None => {
                let (tx, rx) = bounded::<RecognitionEvent>(1);
                (rx, Some(tx))
            }
        };
        let (synthesis_rx, _synthesis_keepalive) = match synthesizer.as_ref() {
            Some(synthesizer) => (synthesizer.events(), None),
            None => {
                let (tx, rx) = bounded::<SynthesisEvent>(1);
                (rx, Some(tx))
            }
        };

        let responder_event_rx = responder.event_receiver();

        thread::spawn(move || {
            info!("Engine main loop starting");

            // Utterance id the synthesis events are expected to carry;
            // events from any other utterance are stale
            let mut current_utterance: Option<Uuid> = None;

            loop {
                select! {
                    // Handle external commands
                    recv(command_rx) -> cmd => {
                        match cmd {
                            Ok(SessionCommand::StartListening) => {
                                let can_start = state.read().phase.can_accept_input();
                                match recognizer.as_mut() {
                                    Some(recognizer) if can_start => {
                                        match recognizer.start() {
                                            Ok(()) => {
                                                state.write().start_listening();
                                                let _ = event_tx.send(SessionEvent::StateChanged);
                                                debug!("Capture session started");
                                            }
                                            Err(e) => {
                                                error!("Failed to start capture: {}", e);
                                                state.write().set_error(
                                                    "Failed to start speech recognition.".to_string(),
                                                );
                                                let _ = event_tx.send(SessionEvent::Error(e.to_string()));
                                            }
                                        }
                                    }
                                    Some(_) => {
                                        warn!("Cannot start listening in {} phase", state.phase());
                                    }
                                    None => {
                                        warn!("Ignoring start: no capture backend");
                                    }
                                }
                            }

                            Ok(SessionCommand::StopListening) => {
                                let can_stop = state.read().phase.is_listening();
                                if can_stop {
                                    if let Some(recognizer) = recognizer.as_mut() {
                                        if let Err(e) = recognizer.stop() {
                                            warn!("Failed to stop capture: {}", e);
                                        }
                                    }
                                    state.write().stop_listening();
                                    let _ = event_tx.send(SessionEvent::StateChanged);
                                    debug!("Capture session stopped");
                                }
                            }

                            Ok(SessionCommand::SubmitText(text)) => {
                                let text = text.trim().to_string();
                                let can_submit = state.read().phase.can_accept_input();
                                if text.is_empty() {
                                    debug!("Ignoring empty text submission");
                                } else if can_submit {
                                    debug!("Text submitted: {}", text);
                                    state.write().begin_processing(text.clone());
                                    conversation.add(Message::user(text.clone()));
                                    if let Err(e) = responder.submit(text, Uuid::new_v4()) {
                                        error!("Failed to send text to responder: {}", e);
                                    }
                                    let _ = event_tx.send(SessionEvent::StateChanged);
                                } else {
                                    warn!("Cannot submit text in {} phase", state.phase());
                                }
                            }

                            Ok(SessionCommand::StopSpeaking) => {
                                let can_stop = state.read().phase.is_speaking();
                                if can_stop {
                                    if let Some(synthesizer) = synthesizer.as_mut() {
                                        if let Err(e) = synthesizer.cancel() {
                                            warn!("Failed to cancel playback: {}", e);
                                        }
                                    }
                                    current_utterance = None;
                                    state.write().stop_speaking();
                                    let _ = event_tx.send(SessionEvent::StateChanged);
                                    debug!("Playback stopped");
                                }
                            }

                            Ok(SessionCommand::ClearConversation) => {
                                // Abort whatever is in flight so the reset
                                // state is not contradicted by late events
                                if state.read().phase.is_listening() {
                                    if let Some(recognizer) = recognizer.as_mut() {
                                        let _ = recognizer.stop();
                                    }
                                }
                                if let Some(synthesizer) = synthesizer.as_mut() {
                                    let _ = synthesizer.cancel();
                                }
                                current_utterance = None;
                                conversation.clear();
                                state.write().reset();
                                let _ = event_tx.send(SessionEvent::StateChanged);
                                debug!("Conversation cleared");
                            }

                            Ok(SessionCommand::Shutdown) => {
                                info!("Shutdown requested");

                                if let Some(recognizer) = recognizer.as_mut() {
                                    let _ = recognizer.stop();
                                }
                                if let Some(synthesizer) = synthesizer.as_mut() {
                                    let _ = synthesizer.cancel();
                                }
                                if let Err(e) = responder.shutdown() {
                                    warn!("Failed to send shutdown to responder: {}", e);
                                }

                                // Wait for the responder to confirm with a timeout
                                let deadline = Instant::now() + shutdown_timeout;
                                loop {
                                    if Instant::now() > deadline {
                                        warn!("Shutdown timeout reached, forcing exit");
                                        break;
                                    }
                                    match responder_event_rx.recv_timeout(Duration::from_millis(100)) {
                                        Ok(ResponderEvent::Shutdown) => {
                                            debug!("Responder shutdown confirmed");
                                            break;
                                        }
                                        Ok(_) => {}
                                        Err(_) => {}
                                    }
                                }

                                let _ = event_tx.send(SessionEvent::Shutdown);
                                info!("Engine shutdown complete");
                                return;
                            }

                            Err(_) => {
                                warn!("Command channel disconnected");
                                break;
                            }
                        }
                    }

                    // Handle capture events
                    recv(recognition_rx) -> event => {
                        match event {
                            Ok(RecognitionEvent::Hypothesis(text)) => {
                                let listening = state.read().phase.is_listening();
                                if listening {
                                    state.write().set_hypothesis(text);
                                    let _ = event_tx.send(SessionEvent::StateChanged);
                                }
                            }

                            Ok(RecognitionEvent::Utterance(text)) => {
                                let listening = state.read().phase.is_listening();
                                if listening {
                                    debug!("Utterance finalized: {}", text);
                                    state.write().begin_processing(text.clone());
                                    conversation.add(Message::user(text.clone()));
                                    if let Err(e) = responder.submit(text, Uuid::new_v4()) {
                                        error!("Failed to send utterance to responder: {}", e);
                                    }
                                    let _ = event_tx.send(SessionEvent::StateChanged);
                                }
                            }

                            Ok(RecognitionEvent::Error(code)) => {
                                let listening = state.read().phase.is_listening();
                                if listening {
                                    error!("Recognition error: {}", code);
                                    state.write().fail_recognition(&code);
                                    let _ = event_tx.send(SessionEvent::Error(
                                        format!("Recognition error: {}", code),
                                    ));
                                }
                            }

                            Ok(RecognitionEvent::Ended) => {
                                let listening = state.read().phase.is_listening();
                                if listening {
                                    state.write().end_capture();
                                    let _ = event_tx.send(SessionEvent::StateChanged);
                                    debug!("Capture session ended without an utterance");
                                }
                            }

                            Err(_) => {
                                warn!("Recognition event channel disconnected");
                            }
                        }
                    }

                    // Handle responder events
                    recv(responder_event_rx) -> event => {
                        match event {
                            Ok(ResponderEvent::Reply { text, request_id }) => {
                                debug!("Reply ready for request {}: {}", request_id, text);
                                conversation.add(Message::agent(text.clone()));
                                state.write().set_reply(text.clone());

                                match synthesizer.as_mut() {
                                    Some(synthesizer) => match synthesizer.speak(&text) {
                                        Ok(utterance_id) => {
                                            current_utterance = Some(utterance_id);
                                        }
                                        Err(e) => {
                                            error!("Failed to start playback: {}", e);
                                            state.write().fail_synthesis("synthesis-failed");
                                            let _ = event_tx.send(SessionEvent::Error(e.to_string()));
                                        }
                                    },
                                    // No playback backend, the reply is
                                    // delivered as text only
                                    None => state.write().finish_speaking(),
                                }

                                let _ = event_tx.send(SessionEvent::StateChanged);
                            }

                            Ok(ResponderEvent::Shutdown) => {
                                debug!("Responder shutdown event received");
                            }

                            Err(_) => {
                                warn!("Responder event channel disconnected");
                            }
                        }
                    }

                    // Handle playback events
                    recv(synthesis_rx) -> event => {
                        match event {
                            Ok(SynthesisEvent::Started { utterance_id }) => {
                                if current_utterance == Some(utterance_id) {
                                    state.write().begin_speaking();
                                    let _ = event_tx.send(SessionEvent::StateChanged);
                                    debug!("Playback started for {}", utterance_id);
                                } else {
                                    debug!("Ignoring stale playback start for {}", utterance_id);
                                }
                            }

                            Ok(SynthesisEvent::Finished { utterance_id }) => {
                                if current_utterance == Some(utterance_id) {
                                    current_utterance = None;
                                    state.write().finish_speaking();
                                    let _ = event_tx.send(SessionEvent::StateChanged);
                                    debug!("Playback finished for {}", utterance_id);
                                } else {
                                    debug!("Ignoring stale playback finish for {}", utterance_id);
                                }
                            }

                            Ok(SynthesisEvent::Error { utterance_id, code }) => {
                                if current_utterance == Some(utterance_id) {
                                    current_utterance = None;
                                    error!("Synthesis error: {}", code);
                                    state.write().fail_synthesis(&code);
                                    let _ = event_tx.send(SessionEvent::Error(
                                        format!("Synthesis error: {}", code),
                                    ));
                                }
                            }

                            Err(_) => {
                                warn!("Synthesis event channel disconnected");
                            }
                        }
                    }

                    // Default timeout to prevent busy-waiting
                    default(Duration::from_millis(10)) => {
                        // No events, continue loop
                    }
                }
            }

            info!("Engine main loop exiting");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::VoiceScript;
    use crate::state::status;

    #[test]
    fn test_orchestrator_creation_without_backends() {
        let (orchestrator, handle) = Orchestrator::new(EngineConfig::default()).unwrap();

        // No capture backend means the mic is off and the banner explains it
        assert!(!handle.recognition_supported());
        let banner = handle.state().error().unwrap();
        assert!(banner.contains("not available"));
        assert_eq!(handle.status(), status::INITIAL);

        drop(orchestrator);
    }

    #[test]
    fn test_orchestrator_creation_with_script() {
        let script = VoiceScript::from_utterances("greetings", ["hello there"]);
        let config = EngineConfig::default().with_script(script);
        let (_, handle) = Orchestrator::new(config).unwrap();

        assert!(handle.recognition_supported());
        assert!(handle.state().error().is_none());
    }

    #[test]
    fn test_orchestrator_rejects_invalid_config() {
        let config = EngineConfig::default().with_channel_buffer_size(0);
        assert!(Orchestrator::new(config).is_err());
    }

    #[test]
    fn test_handle_queries_start_idle() {
        let (_, handle) = Orchestrator::new(EngineConfig::default()).unwrap();

        assert!(!handle.is_listening());
        assert!(!handle.is_speaking());
        assert!(handle.conversation().is_empty());
        assert!(handle.try_recv_event().is_none());
    }
}

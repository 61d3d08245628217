//! Rule-based reply generation
//!
//! The responder turns a finalized utterance into a reply on a dedicated
//! worker thread, keeping the engine loop free to service the speech
//! channels. One reply per request, in request order.

pub mod math;
pub mod rules;

pub use rules::{respond, RuleContext};

use crate::{BanterError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Commands that can be sent to the responder
#[derive(Debug)]
pub enum ResponderCommand {
    /// Produce a reply for a finalized utterance
    Respond { text: String, request_id: Uuid },
    /// Shutdown the responder
    Shutdown,
}

/// Events emitted by the responder
#[derive(Clone, Debug)]
pub enum ResponderEvent {
    /// Reply ready for display and speaking
    Reply { text: String, request_id: Uuid },
    /// Responder has shut down
    Shutdown,
}

/// Handle for the rule-engine worker
///
/// Returns replies over an event channel so the engine loop can multiplex
/// it with the speech services.
pub struct Responder {
    command_tx: Sender<ResponderCommand>,
    event_rx: Receiver<ResponderEvent>,
}

impl Responder {
    /// Create a responder with wall-clock time and an entropy-seeded RNG
    ///
    /// Returns both the handle (for sending commands and receiving events)
    /// and the worker (to be started in a separate thread).
    pub fn new() -> (Self, ResponderWorker) {
        Self::with_context(RuleContext::new())
    }

    /// Create a responder with an explicit rule context
    ///
    /// Tests pin the clock and RNG seed through this.
    pub fn with_context(ctx: RuleContext) -> (Self, ResponderWorker) {
        let (command_tx, command_rx) = bounded(100);
        let (event_tx, event_rx) = bounded(100);

        let responder = Self {
            command_tx,
            event_rx,
        };

        let worker = ResponderWorker {
            command_rx,
            event_tx,
            ctx,
        };

        (responder, worker)
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<ResponderCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<ResponderEvent> {
        self.event_rx.clone()
    }

    /// Submit an utterance for a reply
    pub fn submit(&self, text: String, request_id: Uuid) -> Result<()> {
        self.command_tx
            .send(ResponderCommand::Respond { text, request_id })
            .map_err(|e| BanterError::ChannelError(format!("Failed to send utterance: {}", e)))
    }

    /// Request shutdown
    pub fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(ResponderCommand::Shutdown)
            .map_err(|e| BanterError::ChannelError(format!("Failed to send shutdown: {}", e)))
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ResponderEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    pub fn recv_event(&self) -> Result<ResponderEvent> {
        self.event_rx
            .recv()
            .map_err(|e| BanterError::ChannelError(format!("Failed to receive event: {}", e)))
    }
}

/// Worker that evaluates the rule table in a dedicated thread
pub struct ResponderWorker {
    command_rx: Receiver<ResponderCommand>,
    event_tx: Sender<ResponderEvent>,
    ctx: RuleContext,
}

impl ResponderWorker {
    /// Start the worker thread
    pub fn start(self) -> JoinHandle<()> {
        thread::spawn(move || {
            self.run();
        })
    }

    /// Main worker loop
    fn run(mut self) {
        info!("Responder worker starting");

        loop {
            match self.command_rx.recv() {
                Ok(ResponderCommand::Respond { text, request_id }) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        warn!("Empty utterance received, ignoring");
                        continue;
                    }

                    debug!("Selecting reply for: '{}'", trimmed);
                    let reply = respond(trimmed, &mut self.ctx);

                    if let Err(e) = self.event_tx.send(ResponderEvent::Reply {
                        text: reply,
                        request_id,
                    }) {
                        error!("Failed to send reply event: {}", e);
                        break;
                    }
                }

                Ok(ResponderCommand::Shutdown) => {
                    info!("Responder received shutdown command");
                    let _ = self.event_tx.send(ResponderEvent::Shutdown);
                    break;
                }

                Err(e) => {
                    error!("Responder command channel error: {}", e);
                    break;
                }
            }
        }

        info!("Responder worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn fixed_responder() -> (Responder, ResponderWorker) {
        let now = Local.with_ymd_and_hms(2024, 1, 1, 15, 4, 5).unwrap();
        Responder::with_context(RuleContext::fixed(now, 42))
    }

    #[test]
    fn test_responder_creation() {
        let (responder, _worker) = Responder::new();
        let _sender = responder.command_sender();
        let _receiver = responder.event_receiver();
    }

    #[test]
    fn test_responder_reply_flow() {
        let (responder, worker) = fixed_responder();
        let handle = worker.start();

        let id = Uuid::new_v4();
        responder.submit("hello there".to_string(), id).unwrap();

        let event = responder.recv_event().unwrap();
        match event {
            ResponderEvent::Reply { text, request_id } => {
                assert_eq!(text, "Hello! I'm your voice AI agent. How can I help you today?");
                assert_eq!(request_id, id);
            }
            _ => panic!("Expected Reply event"),
        }

        responder.shutdown().unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_responder_preserves_request_order() {
        let (responder, worker) = fixed_responder();
        let handle = worker.start();

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        responder.submit("what is 2 plus 2".to_string(), first).unwrap();
        responder.submit("goodbye".to_string(), second).unwrap();

        match responder.recv_event().unwrap() {
            ResponderEvent::Reply { text, request_id } => {
                assert_eq!(text, "2 plus 2 equals 4.");
                assert_eq!(request_id, first);
            }
            _ => panic!("Expected Reply event"),
        }
        match responder.recv_event().unwrap() {
            ResponderEvent::Reply { text, request_id } => {
                assert_eq!(text, "Goodbye! Have a great day!");
                assert_eq!(request_id, second);
            }
            _ => panic!("Expected Reply event"),
        }

        responder.shutdown().unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_responder_ignores_empty_utterances() {
        let (responder, worker) = fixed_responder();
        let handle = worker.start();

        responder.submit("".to_string(), Uuid::new_v4()).unwrap();
        responder.submit("   ".to_string(), Uuid::new_v4()).unwrap();
        responder.submit("bye".to_string(), Uuid::new_v4()).unwrap();

        match responder.recv_event().unwrap() {
            ResponderEvent::Reply { text, .. } => {
                assert_eq!(text, "Goodbye! Have a great day!");
            }
            _ => panic!("Expected Reply event"),
        }

        responder.shutdown().unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_responder_shutdown() {
        let (responder, worker) = Responder::new();
        let handle = worker.start();

        responder.shutdown().unwrap();

        let event = responder.recv_event().unwrap();
        assert!(matches!(event, ResponderEvent::Shutdown));

        handle.join().unwrap();
    }
}

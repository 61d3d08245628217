//! Scripted speech recognition
//!
//! Plays back a `VoiceScript` turn by turn: each capture session emits the
//! next turn's interim hypotheses and finalized utterance (or error) on a
//! worker thread, with the pacing the script asks for. Used by tests and
//! by headless runs where no microphone backend exists.

use super::script::{ScriptTurn, VoiceScript};
use super::{RecognitionEvent, RecognizerConfig, SpeechRecognizer};
use crate::{BanterError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Delay before the no-speech error once the script is exhausted
const EXHAUSTED_DELAY: Duration = Duration::from_millis(200);

/// Granularity of cancellation checks during waits
const CANCEL_POLL: Duration = Duration::from_millis(10);

struct SessionControl {
    cancel: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
}

/// Recognizer that reads utterances from a voice script
///
/// Sessions are single-utterance regardless of the `continuous` flag; the
/// script advances one turn per `start()`.
pub struct ScriptedRecognizer {
    turns: Vec<ScriptTurn>,
    cursor: usize,
    config: RecognizerConfig,
    event_tx: Sender<RecognitionEvent>,
    event_rx: Receiver<RecognitionEvent>,
    session: Option<SessionControl>,
}

impl ScriptedRecognizer {
    pub fn new(script: VoiceScript, config: RecognizerConfig) -> Self {
        let (event_tx, event_rx) = bounded(100);
        info!(
            "Scripted recognizer loaded '{}' with {} turns",
            script.script.name,
            script.turns.len()
        );
        Self {
            turns: script.turns,
            cursor: 0,
            config,
            event_tx,
            event_rx,
            session: None,
        }
    }

    /// Number of turns not yet played
    pub fn remaining_turns(&self) -> usize {
        self.turns.len().saturating_sub(self.cursor)
    }

    fn session_active(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |s| !s.done.load(Ordering::SeqCst))
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn start(&mut self) -> Result<()> {
        if self.session_active() {
            return Err(BanterError::RecognitionError(
                "Capture session already in progress".to_string(),
            ));
        }

        let turn = self.turns.get(self.cursor).cloned();
        self.cursor += 1;

        let cancel = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));
        self.session = Some(SessionControl {
            cancel: Arc::clone(&cancel),
            done: Arc::clone(&done),
        });

        let event_tx = self.event_tx.clone();
        let interim = self.config.interim_results;

        thread::spawn(move || {
            run_session(turn, interim, &cancel, &event_tx);
            done.store(true, Ordering::SeqCst);
        });

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(session) = &self.session {
            debug!("Stopping scripted capture session");
            session.cancel.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn events(&self) -> Receiver<RecognitionEvent> {
        self.event_rx.clone()
    }
}

fn run_session(
    turn: Option<ScriptTurn>,
    interim: bool,
    cancel: &AtomicBool,
    event_tx: &Sender<RecognitionEvent>,
) {
    match turn {
        Some(ScriptTurn::Utterance { text, delay_ms, word_ms }) => {
            if wait_unless_cancelled(cancel, Duration::from_millis(delay_ms)) {
                let words: Vec<&str> = text.split_whitespace().collect();
                let mut finished = true;

                for end in 1..=words.len() {
                    if interim {
                        let hypothesis = words[..end].join(" ");
                        if event_tx.send(RecognitionEvent::Hypothesis(hypothesis)).is_err() {
                            finished = false;
                            break;
                        }
                    }
                    if !wait_unless_cancelled(cancel, Duration::from_millis(word_ms)) {
                        finished = false;
                        break;
                    }
                }

                if finished {
                    debug!("Scripted utterance finalized: '{}'", text);
                    let _ = event_tx.send(RecognitionEvent::Utterance(text));
                }
            }
        }
        Some(ScriptTurn::Error { code, delay_ms }) => {
            if wait_unless_cancelled(cancel, Duration::from_millis(delay_ms)) {
                debug!("Scripted recognition error: '{}'", code);
                let _ = event_tx.send(RecognitionEvent::Error(code));
            }
        }
        None => {
            if wait_unless_cancelled(cancel, EXHAUSTED_DELAY) {
                debug!("Voice script exhausted, reporting no-speech");
                let _ = event_tx.send(RecognitionEvent::Error("no-speech".to_string()));
            }
        }
    }

    // Every session closes with Ended, stopped or not
    let _ = event_tx.send(RecognitionEvent::Ended);
}

/// Sleep in short steps, bailing out when the session is cancelled
///
/// Returns false if the cancel flag was raised before the wait elapsed.
fn wait_unless_cancelled(cancel: &AtomicBool, duration: Duration) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }
        let step = remaining.min(CANCEL_POLL);
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
    !cancel.load(Ordering::SeqCst)
}

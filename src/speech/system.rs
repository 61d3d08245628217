//! System speech synthesis
//!
//! Shells out to whichever TTS binary the host provides (`say` on macOS,
//! `espeak-ng` or `espeak` elsewhere). One child process at a time; a new
//! utterance kills the previous child, and a watcher thread translates the
//! exit status into synthesis events.

use super::{SpeechSynthesizer, SynthesisConfig, SynthesisEvent, UNSUPPORTED_SYNTHESIS};
use crate::{BanterError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Words per minute the rate multiplier is applied to
const BASE_WPM: f32 = 175.0;

/// Poll interval for the child-exit watcher
const WATCH_POLL: Duration = Duration::from_millis(25);

/// Argument shape of the detected binary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceStyle {
    /// macOS `say`: rate only, no pitch or volume flags
    Say,
    /// `espeak`/`espeak-ng`: speed, pitch, amplitude
    Espeak,
}

struct ActiveUtterance {
    id: Uuid,
    child: Child,
}

/// Synthesizer backed by a host TTS process
pub struct SystemSynthesizer {
    binary: PathBuf,
    style: VoiceStyle,
    config: SynthesisConfig,
    event_tx: Sender<SynthesisEvent>,
    event_rx: Receiver<SynthesisEvent>,
    current: Arc<Mutex<Option<ActiveUtterance>>>,
}

impl SystemSynthesizer {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        let (binary, style) = find_binary()
            .ok_or_else(|| BanterError::Unsupported(UNSUPPORTED_SYNTHESIS.to_string()))?;
        info!("Using system TTS binary {:?}", binary);
        let (event_tx, event_rx) = bounded(100);
        Ok(Self {
            binary,
            style,
            config,
            event_tx,
            event_rx,
            current: Arc::new(Mutex::new(None)),
        })
    }
}

/// Whether a supported TTS binary is on the PATH
pub fn available() -> bool {
    find_binary().is_some()
}

fn find_binary() -> Option<(PathBuf, VoiceStyle)> {
    for (name, style) in [
        ("say", VoiceStyle::Say),
        ("espeak-ng", VoiceStyle::Espeak),
        ("espeak", VoiceStyle::Espeak),
    ] {
        if let Ok(path) = which::which(name) {
            return Some((path, style));
        }
    }
    None
}

/// Command-line arguments for one utterance
fn speech_args(style: VoiceStyle, config: &SynthesisConfig, text: &str) -> Vec<String> {
    let wpm = (config.rate * BASE_WPM).round() as i64;
    match style {
        VoiceStyle::Say => vec!["-r".to_string(), wpm.to_string(), text.to_string()],
        VoiceStyle::Espeak => {
            // espeak pitch runs 0-99 with 50 neutral, amplitude 0-200 with
            // 100 neutral
            let pitch = ((config.pitch * 50.0).round() as i64).clamp(0, 99);
            let amplitude = ((config.volume * 100.0).round() as i64).clamp(0, 200);
            vec![
                "-s".to_string(),
                wpm.to_string(),
                "-p".to_string(),
                pitch.to_string(),
                "-a".to_string(),
                amplitude.to_string(),
                text.to_string(),
            ]
        }
    }
}

impl SpeechSynthesizer for SystemSynthesizer {
    fn speak(&mut self, text: &str) -> Result<Uuid> {
        // Pre-empt whatever is still playing
        if let Some(mut active) = self.current.lock().take() {
            debug!("Pre-empting utterance {}", active.id);
            let _ = active.child.kill();
            let _ = active.child.wait();
        }

        let utterance_id = Uuid::new_v4();
        let child = Command::new(&self.binary)
            .args(speech_args(self.style, &self.config, text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                BanterError::SynthesisError(format!("Failed to start TTS process: {}", e))
            })?;

        debug!("Speaking utterance {}: '{}'", utterance_id, text);
        *self.current.lock() = Some(ActiveUtterance {
            id: utterance_id,
            child,
        });

        let _ = self.event_tx.send(SynthesisEvent::Started { utterance_id });

        let current = Arc::clone(&self.current);
        let event_tx = self.event_tx.clone();
        thread::spawn(move || watch_child(utterance_id, &current, &event_tx));

        Ok(utterance_id)
    }

    fn cancel(&mut self) -> Result<()> {
        if let Some(mut active) = self.current.lock().take() {
            debug!("Cancelling utterance {}", active.id);
            let _ = active.child.kill();
            let _ = active.child.wait();
        }
        Ok(())
    }

    fn events(&self) -> Receiver<SynthesisEvent> {
        self.event_rx.clone()
    }
}

/// Poll the child until it exits, unless the utterance gets pre-empted
fn watch_child(
    utterance_id: Uuid,
    current: &Mutex<Option<ActiveUtterance>>,
    event_tx: &Sender<SynthesisEvent>,
) {
    loop {
        {
            let mut slot = current.lock();
            match slot.as_mut() {
                Some(active) if active.id == utterance_id => match active.child.try_wait() {
                    Ok(Some(status)) => {
                        *slot = None;
                        drop(slot);
                        if status.success() {
                            let _ = event_tx.send(SynthesisEvent::Finished { utterance_id });
                        } else {
                            warn!("TTS process exited with {}", status);
                            let _ = event_tx.send(SynthesisEvent::Error {
                                utterance_id,
                                code: "synthesis-failed".to_string(),
                            });
                        }
                        return;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Failed to poll TTS process: {}", e);
                        *slot = None;
                        drop(slot);
                        let _ = event_tx.send(SynthesisEvent::Error {
                            utterance_id,
                            code: "synthesis-failed".to_string(),
                        });
                        return;
                    }
                },
                // Pre-empted or cancelled, someone else reaped the child
                _ => return,
            }
        }
        thread::sleep(WATCH_POLL);
    }
}

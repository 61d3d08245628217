//! Simulated speech synthesis
//!
//! Emits the synthesis lifecycle events without producing audio. Playback
//! time is estimated from the word count and the configured speaking rate,
//! so tests can run the full speak/cancel state machine quickly by raising
//! the rate.

use super::{SpeechSynthesizer, SynthesisConfig, SynthesisEvent};
use crate::Result;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Nominal per-word playback time at rate 1.0
const PER_WORD: Duration = Duration::from_millis(150);

/// Granularity of cancellation checks during playback
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Synthesizer that sleeps for the estimated playback time
pub struct SimulatedSynthesizer {
    config: SynthesisConfig,
    event_tx: Sender<SynthesisEvent>,
    event_rx: Receiver<SynthesisEvent>,
    current: Option<Arc<AtomicBool>>,
}

impl SimulatedSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        let (event_tx, event_rx) = bounded(100);
        Self {
            config,
            event_tx,
            event_rx,
            current: None,
        }
    }
}

impl SpeechSynthesizer for SimulatedSynthesizer {
    fn speak(&mut self, text: &str) -> Result<Uuid> {
        // Starting a new utterance pre-empts the one in flight
        if let Some(cancel) = self.current.take() {
            cancel.store(true, Ordering::SeqCst);
        }

        let utterance_id = Uuid::new_v4();
        let duration = utterance_duration(text, self.config.rate);
        debug!(
            "Simulating speech for {}ms: '{}'",
            duration.as_millis(),
            text
        );

        let cancel = Arc::new(AtomicBool::new(false));
        self.current = Some(Arc::clone(&cancel));

        let event_tx = self.event_tx.clone();
        thread::spawn(move || {
            let _ = event_tx.send(SynthesisEvent::Started { utterance_id });

            let mut remaining = duration;
            while !remaining.is_zero() {
                if cancel.load(Ordering::SeqCst) {
                    // Cancelled utterances end silently
                    return;
                }
                let step = remaining.min(CANCEL_POLL);
                thread::sleep(step);
                remaining = remaining.saturating_sub(step);
            }

            if !cancel.load(Ordering::SeqCst) {
                let _ = event_tx.send(SynthesisEvent::Finished { utterance_id });
            }
        });

        Ok(utterance_id)
    }

    fn cancel(&mut self) -> Result<()> {
        if let Some(cancel) = self.current.take() {
            debug!("Cancelling simulated speech");
            cancel.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    fn events(&self) -> Receiver<SynthesisEvent> {
        self.event_rx.clone()
    }
}

/// Estimated playback time for an utterance at the given rate
fn utterance_duration(text: &str, rate: f32) -> Duration {
    let words = text.split_whitespace().count().max(1) as u64;
    let millis = (words * PER_WORD.as_millis() as u64) as f32 / rate.max(0.1);
    Duration::from_millis(millis.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

    fn fast_config() -> SynthesisConfig {
        SynthesisConfig::default().with_rate(10.0)
    }

    #[test]
    fn test_duration_scales_with_words_and_rate() {
        assert_eq!(
            utterance_duration("hello world", 1.0),
            Duration::from_millis(300)
        );
        assert_eq!(utterance_duration("", 1.0), Duration::from_millis(150));
        assert_eq!(
            utterance_duration("hello world", 2.0),
            Duration::from_millis(150)
        );
    }

    #[test]
    fn test_speak_emits_started_then_finished() {
        let mut synth = SimulatedSynthesizer::new(fast_config());
        let events = synth.events();

        let id = synth.speak("hello there").unwrap();

        match events.recv_timeout(EVENT_TIMEOUT).unwrap() {
            SynthesisEvent::Started { utterance_id } => assert_eq!(utterance_id, id),
            other => panic!("expected Started, got {:?}", other),
        }
        match events.recv_timeout(EVENT_TIMEOUT).unwrap() {
            SynthesisEvent::Finished { utterance_id } => assert_eq!(utterance_id, id),
            other => panic!("expected Finished, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_suppresses_finished() {
        let mut synth = SimulatedSynthesizer::new(SynthesisConfig::default().with_rate(0.2));
        let events = synth.events();

        synth.speak("a long sentence that would take a while to play").unwrap();
        assert!(matches!(
            events.recv_timeout(EVENT_TIMEOUT).unwrap(),
            SynthesisEvent::Started { .. }
        ));

        synth.cancel().unwrap();
        assert!(events.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn test_new_utterance_preempts_current() {
        let mut synth = SimulatedSynthesizer::new(SynthesisConfig::default().with_rate(0.2));
        let events = synth.events();

        let first = synth.speak("a long sentence that would take a while to play").unwrap();
        assert!(matches!(
            events.recv_timeout(EVENT_TIMEOUT).unwrap(),
            SynthesisEvent::Started { utterance_id } if utterance_id == first
        ));

        let second = synth.speak("short").unwrap();
        assert!(matches!(
            events.recv_timeout(EVENT_TIMEOUT).unwrap(),
            SynthesisEvent::Started { utterance_id } if utterance_id == second
        ));

        // Only the second utterance runs to completion
        match events.recv_timeout(Duration::from_secs(5)).unwrap() {
            SynthesisEvent::Finished { utterance_id } => assert_eq!(utterance_id, second),
            other => panic!("expected Finished, got {:?}", other),
        }
    }
}

//! Timed chord-progression playback.
//!
//! The sequencer drives the synthesis engine on a clock: one chord per
//! 4/4 measure at a given tempo, with optional metronome ticks. At most
//! one sequence is active at a time; starting a new one always wins.
//! Stopping cancels the pending timer but lets already-started
//! oscillators finish their natural decay.

use crate::audio::synth::AudioEngine;
use crate::theory::{parse_chord, PitchClass};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Beats each chord occupies: 4/4 time, one chord per measure.
pub const BEATS_PER_CHORD: u32 = 4;

/// How long each chord's oscillators decay.
const CHORD_DURATION: Duration = Duration::from_millis(600);

/// Returns the time one chord occupies at `bpm`: a full 4/4 measure.
pub fn chord_interval(bpm: f64) -> Duration {
    Duration::from_secs_f64(60.0 / bpm) * BEATS_PER_CHORD
}

/// Reasons a sequence refuses to start. No side effect occurs.
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("tempo must be a positive, finite BPM (got {0})")]
    InvalidBpm(f64),
    #[error("chord sequence is empty")]
    EmptySequence,
}

/// Per-sequence playback options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceOptions {
    /// Pre-schedule four metronome ticks per measure as each chord
    /// sounds.
    pub metronome: bool,
}

/// Progress notifications delivered to the observer on the playback
/// worker thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    /// A chord just started sounding.
    ChordStarted {
        index: usize,
        chord: String,
        pitches: Vec<PitchClass>,
    },
    /// The sequence ran to completion.
    Finished,
    /// The sequence was stopped or replaced before completing.
    Stopped,
}

/// The one active playback session. Dropping the cancel sender wakes the
/// worker, whose generation check then fails.
struct ActiveSession {
    label: String,
    generation: u64,
    current_index: Arc<AtomicUsize>,
    _cancel: Sender<()>,
}

/// Chord-progression sequencer: Idle -> Playing -> Idle.
pub struct Sequencer {
    engine: Arc<AudioEngine>,
    active: Arc<Mutex<Option<ActiveSession>>>,
    generation: AtomicU64,
}

impl Sequencer {
    pub fn new(engine: Arc<AudioEngine>) -> Self {
        Self {
            engine,
            active: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        }
    }

    /// Starts playing a chord progression at `bpm`.
    ///
    /// The first chord sounds immediately; each subsequent chord follows
    /// after one measure. `label` identifies the sequence (a song
    /// section, for instance): starting the label that is already
    /// playing stops it instead, toggle-style, and returns `Ok(false)`.
    /// Starting a different label replaces the active sequence.
    ///
    /// The observer receives [`SequencerEvent`]s on the worker thread.
    /// After `stop` returns, no further chord will sound; a trailing
    /// `Stopped` event may still be delivered.
    ///
    /// # Errors
    ///
    /// Refuses non-positive or non-finite tempos and empty progressions
    /// without any side effect.
    pub fn start<F>(
        &self,
        label: &str,
        chords: &[String],
        bpm: f64,
        options: SequenceOptions,
        observer: F,
    ) -> Result<bool, SequencerError>
    where
        F: Fn(SequencerEvent) + Send + 'static,
    {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SequencerError::InvalidBpm(bpm));
        }
        if chords.is_empty() {
            return Err(SequencerError::EmptySequence);
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        let current_index = Arc::new(AtomicUsize::new(0));

        {
            let mut active = self.active.lock().unwrap();
            if let Some(previous) = active.take() {
                let toggled_off = previous.label == label;
                drop(previous);
                if toggled_off {
                    tracing::debug!(label, "sequence toggled off");
                    return Ok(false);
                }
                tracing::debug!(label, "replacing active sequence");
            }
            *active = Some(ActiveSession {
                label: label.to_string(),
                generation,
                current_index: Arc::clone(&current_index),
                _cancel: cancel_tx,
            });
        }

        tracing::debug!(label, bpm, chords = chords.len(), "sequence started");

        let engine = Arc::clone(&self.engine);
        let active = Arc::clone(&self.active);
        let chords = chords.to_vec();
        let interval = chord_interval(bpm);
        let beat = interval / BEATS_PER_CHORD;

        thread::spawn(move || {
            for (index, chord) in chords.iter().enumerate() {
                if index > 0 {
                    match cancel_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        _ => {
                            observer(SequencerEvent::Stopped);
                            return;
                        }
                    }
                }

                // Sound the chord only while this session still owns the
                // active slot; `stop` takes the same lock, so after it
                // returns this branch can no longer be reached.
                let event = {
                    let active = active.lock().unwrap();
                    match active.as_ref() {
                        Some(session) if session.generation == generation => {
                            let pitches = parse_chord(chord);
                            engine.play_chord(&pitches, CHORD_DURATION);
                            if options.metronome {
                                for tick in 0..BEATS_PER_CHORD {
                                    engine.play_metronome_click(Some(beat * tick));
                                }
                            }
                            session.current_index.store(index, Ordering::Relaxed);
                            Some(SequencerEvent::ChordStarted {
                                index,
                                chord: chord.clone(),
                                pitches,
                            })
                        }
                        _ => None,
                    }
                };

                match event {
                    Some(event) => observer(event),
                    None => {
                        observer(SequencerEvent::Stopped);
                        return;
                    }
                }
            }

            // Give the final chord its full measure before completing.
            match cancel_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                _ => {
                    observer(SequencerEvent::Stopped);
                    return;
                }
            }

            let finished = {
                let mut active = active.lock().unwrap();
                match active.as_ref() {
                    Some(session) if session.generation == generation => {
                        *active = None;
                        true
                    }
                    _ => false,
                }
            };
            if finished {
                tracing::debug!("sequence finished");
                observer(SequencerEvent::Finished);
            } else {
                observer(SequencerEvent::Stopped);
            }
        });

        Ok(true)
    }

    /// Stops the active sequence, if any. Pending chords are cancelled;
    /// sound already started decays naturally.
    pub fn stop(&self) {
        let session = self.active.lock().unwrap().take();
        if let Some(session) = session {
            tracing::debug!(label = %session.label, "sequence stopped");
        }
    }

    /// Returns whether a sequence is currently playing.
    pub fn is_playing(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }

    /// Returns the label of the playing sequence, if any.
    pub fn playing_label(&self) -> Option<String> {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .map(|session| session.label.clone())
    }

    /// Returns the index of the chord most recently sounded by the
    /// playing sequence, if any.
    pub fn current_index(&self) -> Option<usize> {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .map(|session| session.current_index.load(Ordering::Relaxed))
    }
}

//! maestro - music theory and audio playback engine for song analysis.
//!
//! This library provides the algorithmic core of an interactive
//! song-analysis application: chord-name parsing into pitch sets, scale
//! derivation, fretted-instrument voicings and overlays, waveform
//! synthesis for chords and reference tones, timed chord-progression
//! playback, and a PCM/WAV codec for speech-synthesized audio stems.
//!
//! The surrounding application owns all presentation and I/O: it renders
//! the structured voicing data, keeps the audio output stream alive, and
//! decides what to do with exported WAV bytes.

pub mod audio;
pub mod fretboard;
pub mod theory;

// Re-export commonly used types
pub use audio::{AudioEngine, AudioSampleBuffer, Sequencer, SequencerEvent, StemVoice};
pub use fretboard::{chord_diagram, scale_overlay, InstrumentFamily, Tuning, Voicing};
pub use theory::{parse_chord, scale_notes, PitchClass};

//! Audio subsystem: PCM codec, waveform synthesis, and sequencing.
//!
//! This module covers the sound side of the engine:
//! - Decoding externally supplied base64 PCM and encoding WAV exports
//! - Synthesizing chords, metronome ticks, and tuner reference tones
//!   into a caller-owned rodio output graph
//! - Driving timed chord-progression playback

pub mod pcm;
pub mod sequencer;
pub mod synth;

pub use pcm::{
    decode_base64, decode_pcm, encode_wav, encode_wav_f32, sample_to_i16, AudioSampleBuffer,
    DecodeError, EncodeError, SPEECH_SAMPLE_RATE,
};
pub use sequencer::{
    chord_interval, SequenceOptions, Sequencer, SequencerError, SequencerEvent, BEATS_PER_CHORD,
};
pub use synth::{
    chord_register_octave, frequency_of, pitch_frequency, AudioEngine, StemVoice,
    DEFAULT_OCTAVE, SYNTH_SAMPLE_RATE,
};

//! Real-time synthesis: equal-tempered frequency mapping, waveform
//! sources, and the audio engine that plays chords, metronome ticks,
//! reference tones, and decoded sample buffers.
//!
//! The engine only creates sources within a caller-owned output graph;
//! it never owns the output stream itself. An engine without an attached
//! output no-ops gracefully, which keeps the rest of the application
//! usable on machines with no audio device.

use crate::audio::pcm::AudioSampleBuffer;
use crate::theory::{note_to_pitch_class, PitchClass};
use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Sample rate for synthesized waveforms (44.1 kHz standard).
pub const SYNTH_SAMPLE_RATE: u32 = 44100;

/// Concert pitch: A4 in Hz.
pub const A4_HZ: f64 = 440.0;

/// A4's key number, counting semitones from C0.
const A4_KEY: i32 = 57;

/// Near-silent endpoint of the exponential decay envelopes.
const ENVELOPE_FLOOR: f32 = 1.0e-4;

/// Metronome tick: a clear 880 Hz (A5) sine, 50 ms with a sharp decay.
const CLICK_HZ: f32 = 880.0;
const CLICK_DURATION: Duration = Duration::from_millis(50);

/// Reference-tone envelope: quiet sustained voice for tuning by ear.
const REFERENCE_LEVEL: f32 = 0.2;
const REFERENCE_ATTACK: Duration = Duration::from_millis(50);
const REFERENCE_RELEASE: Duration = Duration::from_millis(100);

/// Octave used when a note name carries no octave digit.
pub const DEFAULT_OCTAVE: u8 = 4;

/// Octave placement policy for chord playback: chords rooted G through B
/// voice one octave lower than the rest. This keeps high-rooted chords
/// from sounding excessively bright next to low-rooted ones; it is an
/// audible design choice, not a tuning requirement.
pub fn chord_register_octave(root: PitchClass) -> u8 {
    if root.index() >= 7 {
        3
    } else {
        4
    }
}

/// Returns the equal-tempered frequency for a key number (semitones
/// from C0).
fn key_frequency(key: i32) -> f64 {
    A4_HZ * 2f64.powf((key - A4_KEY) as f64 / 12.0)
}

/// Returns the frequency of a pitch class in a given octave.
pub fn pitch_frequency(pitch: PitchClass, octave: u8) -> f64 {
    key_frequency(pitch.index() as i32 + 12 * octave as i32)
}

/// Resolves a note name to its equal-tempered frequency in Hz.
///
/// An explicit octave digit in the note string ("A3") wins over
/// `default_octave`. Returns `None` for an unresolvable note name.
///
/// # Examples
///
/// ```
/// use maestro::audio::frequency_of;
///
/// assert_eq!(frequency_of("A4", 4), Some(440.0));
/// assert_eq!(frequency_of("A", 3), Some(220.0));
/// assert_eq!(frequency_of("?", 4), None);
/// ```
pub fn frequency_of(note: &str, default_octave: u8) -> Option<f64> {
    let pitch = note_to_pitch_class(note).ok()?;
    let octave = note
        .chars()
        .find(char::is_ascii_digit)
        .map(|c| c as u8 - b'0')
        .unwrap_or(default_octave);
    Some(pitch_frequency(pitch, octave))
}

/// Basic oscillator shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Waveform {
    Sine,
    Triangle,
}

impl Waveform {
    /// Evaluates the waveform at a phase measured in cycles.
    fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (std::f32::consts::TAU * phase).sin(),
            Waveform::Triangle => {
                let cycle = phase - phase.floor();
                4.0 * (cycle - 0.5).abs() - 1.0
            }
        }
    }
}

fn duration_samples(duration: Duration) -> u32 {
    ((duration.as_secs_f32() * SYNTH_SAMPLE_RATE as f32) as u32).max(1)
}

/// A finite oscillator with an exponential decay from full amplitude to
/// near-silence over its duration. Used for chord notes and metronome
/// ticks. Implements rodio's `Source` as a mono f32 stream.
struct DecayTone {
    waveform: Waveform,
    freq: f32,
    amplitude: f32,
    total_samples: u32,
    position: u32,
}

impl DecayTone {
    fn new(waveform: Waveform, freq: f32, amplitude: f32, duration: Duration) -> Self {
        Self {
            waveform,
            freq,
            amplitude,
            total_samples: duration_samples(duration),
            position: 0,
        }
    }
}

impl Iterator for DecayTone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.position >= self.total_samples {
            return None;
        }
        let t = self.position as f32 / SYNTH_SAMPLE_RATE as f32;
        let progress = self.position as f32 / self.total_samples as f32;
        let gain = ENVELOPE_FLOOR.powf(progress);
        self.position += 1;
        Some(self.waveform.sample(self.freq * t) * gain * self.amplitude)
    }
}

impl Source for DecayTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SYNTH_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.total_samples as f64 / SYNTH_SAMPLE_RATE as f64,
        ))
    }
}

/// Envelope gain for the sustained reference tone: linear attack to the
/// sustain level, then a linear release over the final stretch.
fn sustain_gain(position: u32, total: u32, attack: u32, release: u32) -> f32 {
    let attack = attack.min(total / 2).max(1);
    let release_start = total.saturating_sub(release).max(attack);

    if position < attack {
        REFERENCE_LEVEL * position as f32 / attack as f32
    } else if position >= release_start {
        let remaining = total - position;
        REFERENCE_LEVEL * remaining as f32 / (total - release_start).max(1) as f32
    } else {
        REFERENCE_LEVEL
    }
}

/// A sustained sine voice with attack/sustain/release shaping, used for
/// tuner reference notes.
struct SustainedTone {
    freq: f32,
    total_samples: u32,
    attack_samples: u32,
    release_samples: u32,
    position: u32,
}

impl SustainedTone {
    fn new(freq: f32, duration: Duration) -> Self {
        Self {
            freq,
            total_samples: duration_samples(duration),
            attack_samples: duration_samples(REFERENCE_ATTACK),
            release_samples: duration_samples(REFERENCE_RELEASE),
            position: 0,
        }
    }
}

impl Iterator for SustainedTone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.position >= self.total_samples {
            return None;
        }
        let t = self.position as f32 / SYNTH_SAMPLE_RATE as f32;
        let gain = sustain_gain(
            self.position,
            self.total_samples,
            self.attack_samples,
            self.release_samples,
        );
        self.position += 1;
        Some(Waveform::Sine.sample(self.freq * t) * gain)
    }
}

impl Source for SustainedTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SYNTH_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f64(
            self.total_samples as f64 / SYNTH_SAMPLE_RATE as f64,
        ))
    }
}

/// The synthesis engine.
///
/// Creates oscillator and buffer sources within a caller-owned rodio
/// output graph. Holds the single active reference-tone voice so that at
/// most one reference note sounds at a time.
pub struct AudioEngine {
    output: Option<OutputStreamHandle>,
    reference: Mutex<Option<Sink>>,
}

impl AudioEngine {
    /// Opens the default audio output and attaches an engine to it.
    ///
    /// The returned [`OutputStream`] is the output graph itself; the
    /// caller must keep it alive for as long as audio should play.
    ///
    /// # Errors
    ///
    /// Returns error if no audio output device is available.
    pub fn open() -> Result<(OutputStream, AudioEngine)> {
        let (stream, handle) =
            OutputStream::try_default().context("Failed to open audio output")?;
        Ok((stream, AudioEngine::attached(handle)))
    }

    /// Attaches an engine to an already-initialized output graph.
    pub fn attached(handle: OutputStreamHandle) -> Self {
        Self {
            output: Some(handle),
            reference: Mutex::new(None),
        }
    }

    /// Creates an engine with no audio output. Every play routine
    /// becomes a graceful no-op; useful for headless operation and
    /// tests.
    pub fn disconnected() -> Self {
        Self {
            output: None,
            reference: Mutex::new(None),
        }
    }

    /// Returns whether an output graph is attached.
    pub fn is_connected(&self) -> bool {
        self.output.is_some()
    }

    /// Sounds all notes of a chord simultaneously.
    ///
    /// One triangle-wave oscillator per note, each enveloped with an
    /// exponential decay over `duration`, attenuated by 1/note-count so
    /// the additive sum cannot clip. All oscillators start immediately
    /// and stop on their own.
    pub fn play_chord(&self, notes: &[PitchClass], duration: Duration) {
        let Some(handle) = &self.output else {
            tracing::debug!("no audio output attached; skipping chord");
            return;
        };
        if notes.is_empty() {
            return;
        }

        let master_gain = 1.0 / notes.len() as f32;
        for &note in notes {
            let octave = chord_register_octave(note);
            let freq = pitch_frequency(note, octave) as f32;
            let tone = DecayTone::new(Waveform::Triangle, freq, master_gain, duration);
            if let Err(e) = handle.play_raw(tone) {
                tracing::warn!("chord playback failed: {e}");
                return;
            }
        }
    }

    /// Plays a short metronome tick, optionally delayed.
    ///
    /// A `delay` queues the tick for a future instant, which lets the
    /// sequencer pre-schedule a measure's worth of ticks at once.
    pub fn play_metronome_click(&self, delay: Option<Duration>) {
        let Some(handle) = &self.output else {
            return;
        };
        let tick = DecayTone::new(Waveform::Sine, CLICK_HZ, 1.0, CLICK_DURATION);
        let result = match delay {
            Some(d) if !d.is_zero() => handle.play_raw(tick.delay(d)),
            _ => handle.play_raw(tick),
        };
        if let Err(e) = result {
            tracing::warn!("metronome tick failed: {e}");
        }
    }

    /// Plays a sustained reference note for tuning by ear.
    ///
    /// At most one reference note sounds at a time: starting a new one
    /// atomically stops and replaces the current voice. Returns whether
    /// a voice actually started.
    pub fn play_reference_note(&self, note: &str, duration: Duration) -> bool {
        let Some(freq) = frequency_of(note, DEFAULT_OCTAVE) else {
            tracing::warn!(note, "unresolvable reference note");
            return false;
        };

        let mut voice = self.reference.lock().unwrap();
        if let Some(previous) = voice.take() {
            previous.stop();
        }

        let Some(handle) = &self.output else {
            return false;
        };
        let sink = match Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!("reference note failed: {e}");
                return false;
            }
        };
        sink.append(SustainedTone::new(freq as f32, duration));
        *voice = Some(sink);
        true
    }

    /// Stops the reference note, if one is sounding.
    pub fn stop_reference_note(&self) {
        if let Some(previous) = self.reference.lock().unwrap().take() {
            previous.stop();
        }
    }

    /// Starts playback of a decoded sample buffer and returns a control
    /// handle for it, or `None` when no output is attached.
    pub fn play_samples(&self, buffer: &AudioSampleBuffer) -> Option<StemVoice> {
        let handle = self.output.as_ref()?;
        let sink = match Sink::try_new(handle) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!("sample playback failed: {e}");
                return None;
            }
        };

        let mut interleaved = Vec::with_capacity(buffer.frame_count() * buffer.channel_count());
        for frame in 0..buffer.frame_count() {
            for channel in 0..buffer.channel_count() {
                interleaved.push(buffer.channel(channel)[frame]);
            }
        }

        let voice = StemVoice {
            sink,
            channels: buffer.channel_count() as u16,
            sample_rate: buffer.sample_rate(),
            samples: Arc::new(interleaved),
            looping: AtomicBool::new(false),
        };
        voice.restart();
        Some(voice)
    }
}

/// Control handle for one playing sample buffer (an instrument stem or
/// the main melody). Dropping the handle stops playback.
pub struct StemVoice {
    sink: Sink,
    channels: u16,
    sample_rate: u32,
    samples: Arc<Vec<f32>>,
    looping: AtomicBool,
}

impl StemVoice {
    fn source(&self) -> SamplesBuffer<f32> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.as_ref().clone())
    }

    /// Restarts playback of the retained buffer from the beginning,
    /// honoring the current loop setting.
    pub fn restart(&self) {
        self.sink.stop();
        if self.looping.load(Ordering::Relaxed) {
            self.sink.append(self.source().repeat_infinite());
        } else {
            self.sink.append(self.source());
        }
        self.sink.play();
    }

    /// Stops playback. The voice may be restarted afterwards.
    pub fn stop(&self) {
        self.sink.stop();
    }

    pub fn pause(&self) {
        self.sink.pause();
    }

    pub fn resume(&self) {
        self.sink.play();
    }

    /// Sets the playback volume (1.0 is unity gain).
    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume);
    }

    /// Sets the playback rate (1.0 is normal speed).
    pub fn set_speed(&self, speed: f32) {
        self.sink.set_speed(speed);
    }

    /// Enables or disables looping. Takes effect by restarting playback
    /// of the retained buffer.
    pub fn set_looping(&self, looping: bool) {
        self.looping.store(looping, Ordering::Relaxed);
        self.restart();
    }

    /// True once a non-looping voice has played to the end (or been
    /// stopped).
    pub fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

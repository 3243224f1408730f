//! Music theory primitives: pitch classes, chords, and scales.
//!
//! This module provides the pitch-class arithmetic that the fretboard and
//! audio layers build on. All arithmetic is modulo 12 over the canonical
//! sharp-spelling note table; flat spellings are normalized on input.

mod chord;
mod scale;

pub use chord::{chord_formula, parse_chord, split_chord_name};
pub use scale::{scale_notes, ScaleType};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Canonical note names for the 12 pitch classes, sharp spellings only.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Error for a note name that does not start with a letter A-G.
///
/// Chord and scale parsing swallow this error and return empty sequences;
/// it is surfaced so that internal callers can tell "no note" apart from
/// pitch class 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid note name: {0:?}")]
pub struct InvalidNote(pub String);

/// One of the 12 equal-tempered pitch identities, octave-independent.
///
/// The inner index follows [`NOTE_NAMES`]: C = 0 through B = 11.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PitchClass(u8);

impl PitchClass {
    /// Creates a pitch class from a semitone index, wrapping modulo 12.
    pub fn from_index(index: i32) -> Self {
        Self(index.rem_euclid(12) as u8)
    }

    /// Returns the semitone index (0-11).
    pub fn index(self) -> u8 {
        self.0
    }

    /// Returns the canonical sharp-spelled name, e.g. "C#".
    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }

    /// Transposes by a number of semitones, wrapping modulo 12.
    pub fn transpose(self, semitones: i32) -> Self {
        Self::from_index(self.0 as i32 + semitones)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semitone indices of the natural letters A-G.
fn natural_index(letter: char) -> Option<u8> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Resolves a note name to its pitch class.
///
/// Accepts a letter A-G (case-insensitive) optionally followed by `#` or
/// `b`. A trailing octave digit suffix (as in `"A4"`) is accepted and
/// ignored. Flats normalize by subtracting one semitone modulo 12, so
/// `"Db"` and `"C#"` resolve to the same pitch class.
///
/// # Errors
///
/// Returns [`InvalidNote`] if the name does not start with a letter A-G or
/// carries a suffix other than an accidental and octave digits.
pub fn note_to_pitch_class(name: &str) -> Result<PitchClass, InvalidNote> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();

    let letter = chars.next().ok_or_else(|| InvalidNote(name.to_string()))?;
    let natural = natural_index(letter).ok_or_else(|| InvalidNote(name.to_string()))?;

    let rest = chars.as_str();
    let (accidental, rest) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    if !rest.chars().all(|c| c.is_ascii_digit()) {
        return Err(InvalidNote(name.to_string()));
    }

    Ok(PitchClass::from_index(natural as i32 + accidental))
}

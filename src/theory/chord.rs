//! Chord-name parsing.
//!
//! A chord name splits into a root (one or two characters) and a quality
//! suffix. Qualities map to interval formulas through an immutable lookup
//! table; unknown qualities fall back to the major formula as a usability
//! default, and an unresolvable root yields an empty pitch set so callers
//! can simply render nothing.

use super::{note_to_pitch_class, PitchClass};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Interval formulas in semitones from the root, one per quality token.
static CHORD_FORMULAS: Lazy<HashMap<&'static str, &'static [u8]>> = Lazy::new(|| {
    let entries: [(&str, &[u8]); 11] = [
        // Major: R, 3, 5
        ("", &[0, 4, 7]),
        ("maj", &[0, 4, 7]),
        // Minor: R, b3, 5
        ("m", &[0, 3, 7]),
        ("min", &[0, 3, 7]),
        // Dominant 7: R, 3, 5, b7
        ("7", &[0, 4, 7, 10]),
        // Major 7: R, 3, 5, 7
        ("maj7", &[0, 4, 7, 11]),
        // Minor 7: R, b3, 5, b7
        ("m7", &[0, 3, 7, 10]),
        // Diminished: R, b3, b5
        ("dim", &[0, 3, 6]),
        // Augmented: R, 3, #5
        ("aug", &[0, 4, 8]),
        // Suspended: R, 4, 5 / R, 2, 5
        ("sus4", &[0, 5, 7]),
        ("sus2", &[0, 2, 7]),
    ];
    entries.into_iter().collect()
});

/// Formula used when a quality token is not in the table.
const FALLBACK_FORMULA: &[u8] = &[0, 4, 7];

/// Returns the interval formula for a quality token.
///
/// Unrecognized tokens resolve to the major formula. This is a deliberate
/// lenient default, not an error.
pub fn chord_formula(quality: &str) -> &'static [u8] {
    CHORD_FORMULAS
        .get(quality)
        .copied()
        .unwrap_or(FALLBACK_FORMULA)
}

/// Splits a chord name into root and quality parts.
///
/// The root is two characters exactly when the second character is `#` or
/// `b`, otherwise one character.
pub fn split_chord_name(chord_name: &str) -> (&str, &str) {
    let mut chars = chord_name.chars();
    let Some(first) = chars.next() else {
        return ("", "");
    };
    let root_len = match chars.next() {
        Some(accidental @ ('#' | 'b')) => first.len_utf8() + accidental.len_utf8(),
        _ => first.len_utf8(),
    };
    chord_name.split_at(root_len)
}

/// Parses a chord name into its pitch classes, root first.
///
/// The order of subsequent notes follows the quality's interval formula,
/// not pitch height. An empty or unparseable root returns an empty vector;
/// callers must treat that as "no pitches available".
///
/// # Examples
///
/// ```
/// use maestro::theory::parse_chord;
///
/// let notes = parse_chord("Am");
/// let names: Vec<&str> = notes.iter().map(|n| n.name()).collect();
/// assert_eq!(names, ["A", "C", "E"]);
/// ```
pub fn parse_chord(chord_name: &str) -> Vec<PitchClass> {
    let (root_name, quality) = split_chord_name(chord_name);

    let root = match note_to_pitch_class(root_name) {
        Ok(root) => root,
        Err(_) => return Vec::new(),
    };

    chord_formula(quality)
        .iter()
        .map(|&interval| root.transpose(interval as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::NOTE_NAMES;

    fn names(notes: &[PitchClass]) -> Vec<&'static str> {
        notes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn test_basic_chords() {
        assert_eq!(names(&parse_chord("Cmaj7")), ["C", "E", "G", "B"]);
        assert_eq!(names(&parse_chord("Am")), ["A", "C", "E"]);
        assert_eq!(names(&parse_chord("G7")), ["G", "B", "D", "F"]);
    }

    #[test]
    fn test_flat_roots_normalize() {
        assert_eq!(parse_chord("Bbm"), parse_chord("A#m"));
        assert_eq!(names(&parse_chord("Db"))[0], "C#");
    }

    #[test]
    fn test_empty_and_invalid_root() {
        assert!(parse_chord("").is_empty());
        assert!(parse_chord("Xyz").is_empty());
        assert!(parse_chord("1maj").is_empty());
        assert!(parse_chord("Ém").is_empty());
    }

    #[test]
    fn test_unknown_quality_falls_back_to_major() {
        assert_eq!(names(&parse_chord("Cxyz")), ["C", "E", "G"]);
        assert_eq!(parse_chord("C13"), parse_chord("C"));
    }

    #[test]
    fn test_all_roots_all_qualities() {
        let qualities = [
            "", "maj", "m", "min", "7", "maj7", "m7", "dim", "aug", "sus4", "sus2",
        ];
        for root in NOTE_NAMES {
            for quality in qualities {
                let chord = format!("{root}{quality}");
                let notes = parse_chord(&chord);
                assert_eq!(notes.len(), chord_formula(quality).len(), "{chord}");
                assert_eq!(notes[0].name(), root, "{chord}");
            }
        }
    }

    #[test]
    fn test_split_chord_name() {
        assert_eq!(split_chord_name("C#m7"), ("C#", "m7"));
        assert_eq!(split_chord_name("G"), ("G", ""));
        assert_eq!(split_chord_name("Bbmaj7"), ("Bb", "maj7"));
        assert_eq!(split_chord_name(""), ("", ""));
    }
}

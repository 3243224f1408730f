//! Fretboard overlays: per-string, per-fret membership flags for a note
//! set, used to highlight a chord or scale across the neck.

use super::tuning::Tuning;
use crate::theory::{note_to_pitch_class, PitchClass};
use serde::Serialize;

/// Frets shown per string, counting the open position (fret 0).
pub const OVERLAY_FRETS: u8 = 5;

/// One fret position on one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverlayCell {
    pub fret: u8,
    /// The sounding pitch class at this position.
    pub pitch: PitchClass,
    /// True when the pitch belongs to the highlighted note set.
    pub in_set: bool,
    /// True when the pitch is the set's first note. Rendered distinctly.
    pub is_tonic: bool,
}

/// One string's worth of overlay cells, open fret first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringOverlay {
    /// The open-string note name as supplied by the tuning.
    pub open_note: String,
    /// Empty when the open-string note cannot be resolved, meaning
    /// nothing to highlight on this string.
    pub cells: Vec<OverlayCell>,
}

/// Highlight data for a whole fretboard, low string first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FretboardOverlay {
    pub strings: Vec<StringOverlay>,
}

/// Computes membership flags for every string and fret 0 through
/// [`OVERLAY_FRETS`].
///
/// The first note in `notes` is the tonic. An empty note set, or an
/// unresolvable open-string name, produces rows with nothing flagged,
/// never an error: an empty overlay simply means nothing to highlight.
pub fn scale_overlay(notes: &[PitchClass], tuning: &Tuning) -> FretboardOverlay {
    let tonic = notes.first().copied();

    let strings = tuning
        .normalized_notes()
        .into_iter()
        .map(|open_note| {
            let cells = match note_to_pitch_class(&open_note) {
                Ok(open_pitch) => (0..=OVERLAY_FRETS)
                    .map(|fret| {
                        let pitch = open_pitch.transpose(fret as i32);
                        OverlayCell {
                            fret,
                            pitch,
                            in_set: notes.contains(&pitch),
                            is_tonic: tonic == Some(pitch),
                        }
                    })
                    .collect(),
                Err(_) => Vec::new(),
            };
            StringOverlay { open_note, cells }
        })
        .collect();

    FretboardOverlay { strings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fretboard::tuning::STANDARD_GUITAR;
    use crate::theory::parse_chord;

    #[test]
    fn test_chord_overlay_on_standard_guitar() {
        let tuning = Tuning::new(STANDARD_GUITAR);
        let overlay = scale_overlay(&parse_chord("Em"), &tuning);

        assert_eq!(overlay.strings.len(), 6);
        for string in &overlay.strings {
            assert_eq!(string.cells.len(), OVERLAY_FRETS as usize + 1);
        }

        // Open low E is the tonic of Em.
        let low_e = &overlay.strings[0].cells[0];
        assert!(low_e.in_set);
        assert!(low_e.is_tonic);

        // Open B (fifth of Em) is in the set but not the tonic.
        let open_b = &overlay.strings[4].cells[0];
        assert!(open_b.in_set);
        assert!(!open_b.is_tonic);

        // F on the low string (fret 1) is not in Em.
        assert!(!overlay.strings[0].cells[1].in_set);
    }

    #[test]
    fn test_empty_note_set_flags_nothing() {
        let tuning = Tuning::new(STANDARD_GUITAR);
        let overlay = scale_overlay(&[], &tuning);
        for string in &overlay.strings {
            assert!(string.cells.iter().all(|c| !c.in_set && !c.is_tonic));
        }
    }

    #[test]
    fn test_unknown_open_string_is_silent() {
        let tuning = Tuning::new(["E", "?", "D", "G"]);
        let overlay = scale_overlay(&parse_chord("C"), &tuning);
        assert!(overlay.strings[1].cells.is_empty());
        assert!(!overlay.strings[0].cells.is_empty());
    }
}

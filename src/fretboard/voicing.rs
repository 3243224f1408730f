//! Chord voicings: fixed patterns for standard guitar tuning and a
//! scan-based fallback that places the chord root on every string.

use super::tuning::Tuning;
use crate::theory::{note_to_pitch_class, split_chord_name};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Frets scanned per string when searching for a root note. Every pitch
/// class appears within one octave, so 12 frets always suffice when the
/// open-string note is known.
const SCAN_FRETS: u8 = 12;

/// One string's position within a voicing. Fret 0 is the open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StringFret {
    Muted,
    Fret(u8),
}

impl StringFret {
    /// True for a fretted, non-open position.
    pub fn is_fretted(self) -> bool {
        matches!(self, StringFret::Fret(f) if f > 0)
    }
}

/// A concrete mapping of a chord onto fret positions, one per string,
/// ordered low string first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voicing {
    pub chord: String,
    pub frets: Vec<StringFret>,
}

/// Fixed voicings for standard guitar tuning, low string first.
/// -1 marks a muted string.
static STANDARD_GUITAR_VOICINGS: Lazy<HashMap<&'static str, [i8; 6]>> = Lazy::new(|| {
    let entries: [(&str, [i8; 6]); 35] = [
        ("A", [-1, 0, 2, 2, 2, 0]),
        ("Am", [-1, 0, 2, 2, 1, 0]),
        ("A7", [-1, 0, 2, 0, 2, 0]),
        ("Amaj7", [-1, 0, 2, 1, 2, 0]),
        ("Asus4", [-1, 0, 2, 2, 3, 0]),
        ("A#", [6, 8, 8, 7, 6, 6]),
        ("A#m", [6, 8, 8, 6, 6, 6]),
        ("B", [-1, 2, 4, 4, 4, 2]),
        ("Bm", [-1, 2, 4, 4, 3, 2]),
        ("B7", [-1, 2, 1, 2, 0, 2]),
        ("C", [-1, 3, 2, 0, 1, 0]),
        ("Cmaj7", [-1, 3, 2, 0, 0, 0]),
        ("C7", [-1, 3, 2, 3, 1, 0]),
        ("C#m", [-1, 4, 6, 6, 5, 4]),
        ("D", [-1, -1, 0, 2, 3, 2]),
        ("Dm", [-1, -1, 0, 2, 3, 1]),
        ("D7", [-1, -1, 0, 2, 1, 2]),
        ("Dmaj7", [-1, -1, 0, 2, 2, 2]),
        ("Dsus4", [-1, -1, 0, 2, 3, 3]),
        ("D#", [-1, 6, 8, 8, 8, 6]),
        ("D#m", [-1, 6, 8, 8, 7, 6]),
        ("E", [0, 2, 2, 1, 0, 0]),
        ("Em", [0, 2, 2, 0, 0, 0]),
        ("E7", [0, 2, 0, 1, 0, 0]),
        ("F", [1, 3, 3, 2, 1, 1]),
        ("Fm", [1, 3, 3, 1, 1, 1]),
        ("Fmaj7", [-1, -1, 3, 2, 1, 0]),
        ("F#", [2, 4, 4, 3, 2, 2]),
        ("F#m", [2, 4, 4, 2, 2, 2]),
        ("G", [3, 2, 0, 0, 0, 3]),
        ("G7", [3, 2, 0, 0, 0, 1]),
        ("Gmaj7", [3, -1, 0, 0, 0, 2]),
        ("G#", [4, 6, 6, 5, 4, 4]),
        ("G#m", [4, 6, 6, 4, 4, 4]),
        ("Dsus2", [-1, -1, 0, 2, 3, 0]),
    ];
    entries.into_iter().collect()
});

fn fixed_voicing(chord_name: &str) -> Option<Vec<StringFret>> {
    let pattern = STANDARD_GUITAR_VOICINGS.get(chord_name)?;
    Some(
        pattern
            .iter()
            .map(|&f| {
                if f < 0 {
                    StringFret::Muted
                } else {
                    StringFret::Fret(f as u8)
                }
            })
            .collect(),
    )
}

/// Places the chord root on each string at its lowest fret within one
/// octave. Strings whose open note cannot be resolved are marked muted.
fn scan_voicing(chord_name: &str, tuning: &Tuning) -> Option<Vec<StringFret>> {
    let (root_name, _) = split_chord_name(chord_name);
    let root = note_to_pitch_class(root_name).ok()?;

    let frets = tuning
        .normalized_notes()
        .iter()
        .map(|open| match note_to_pitch_class(open) {
            // A fret always exists within one octave; Muted is unreachable
            // here but kept as the contract for strings without a root.
            Ok(open_pitch) => (0..SCAN_FRETS)
                .find(|&f| open_pitch.transpose(f as i32) == root)
                .map_or(StringFret::Muted, StringFret::Fret),
            Err(_) => StringFret::Muted,
        })
        .collect();

    Some(frets)
}

/// Computes a voicing for a chord on a given tuning.
///
/// The fixed lookup table applies only when the tuning equals canonical
/// standard guitar tuning and the chord name has an entry; any other
/// tuning, and table misses, fall through to the scan-based
/// single-root-per-string placement. Returns `None` when the chord name
/// has no resolvable root, in which case the caller renders nothing.
///
/// This is a pure function: identical inputs always yield identical
/// voicings.
pub fn chord_diagram(chord_name: &str, tuning: &Tuning) -> Option<Voicing> {
    let frets = if tuning.is_standard_guitar() {
        fixed_voicing(chord_name).or_else(|| scan_voicing(chord_name, tuning))?
    } else {
        scan_voicing(chord_name, tuning)?
    };

    Some(Voicing {
        chord: chord_name.to_string(),
        frets,
    })
}

/// A barre spanning adjacent strings at one fret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BarreSpan {
    /// True fret number of the bar.
    pub fret: u8,
    /// Lowest-string index covered by the bar.
    pub first_string: usize,
    /// Highest-string index covered by the bar.
    pub last_string: usize,
}

/// Per-string display marker within a rebased diagram window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    Muted,
    Open,
    Dot {
        /// True fret number.
        fret: u8,
        /// Fret position within the display window, 1-based.
        display_fret: u8,
    },
}

/// Rendering data derived from a voicing: the rebased fret window, an
/// optional barre, and one marker per string. Handed to an external
/// rendering collaborator; contains no layout or styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramLayout {
    /// True fret number displayed as the window's first fret. 1 unless the
    /// voicing sits entirely above the nut.
    pub base_fret: u8,
    pub barre: Option<BarreSpan>,
    pub markers: Vec<Marker>,
}

impl DiagramLayout {
    /// Computes the display layout for a voicing.
    ///
    /// When every fretted string sits at fret 2 or higher, the window is
    /// rebased so the lowest used fret displays as fret 1 and `base_fret`
    /// carries the true fret number. A barre spans from the first to the
    /// last string at the base fret, and is reported only when at least
    /// two strings sit at it and every string in between is fretted at or
    /// above it; an open or muted string inside the span rules the barre
    /// out, so a fret number recurring on unrelated strings does not
    /// produce one. Strings under the barre keep their dot markers so
    /// renderers may draw either representation.
    pub fn from_voicing(voicing: &Voicing) -> Self {
        let min_fret = voicing
            .frets
            .iter()
            .filter_map(|f| match f {
                StringFret::Fret(fret) if *fret > 0 => Some(*fret),
                _ => None,
            })
            .min();

        let base_fret = match min_fret {
            Some(min) if min > 1 => min,
            _ => 1,
        };

        let markers = voicing
            .frets
            .iter()
            .map(|f| match f {
                StringFret::Muted => Marker::Muted,
                StringFret::Fret(0) => Marker::Open,
                StringFret::Fret(fret) => Marker::Dot {
                    fret: *fret,
                    display_fret: if base_fret > 1 {
                        fret - base_fret + 1
                    } else {
                        *fret
                    },
                },
            })
            .collect();

        let barre = if base_fret > 1 {
            barre_span(&voicing.frets, base_fret)
        } else {
            None
        };

        DiagramLayout {
            base_fret,
            barre,
            markers,
        }
    }
}

/// Finds the barre span at `fret`: first to last string sitting at it,
/// with every string in between fretted at or above it. Spans of a single
/// string, or spans crossing an open or muted string, are not barres.
fn barre_span(frets: &[StringFret], fret: u8) -> Option<BarreSpan> {
    let at_fret: Vec<usize> = frets
        .iter()
        .enumerate()
        .filter(|(_, f)| **f == StringFret::Fret(fret))
        .map(|(i, _)| i)
        .collect();

    let (&first, &last) = (at_fret.first()?, at_fret.last()?);
    if first == last {
        return None;
    }

    let coverable = frets[first..=last]
        .iter()
        .all(|f| matches!(f, StringFret::Fret(n) if *n >= fret));
    if !coverable {
        return None;
    }

    Some(BarreSpan {
        fret,
        first_string: first,
        last_string: last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fretboard::tuning::{STANDARD_BASS, STANDARD_GUITAR};

    fn standard_guitar() -> Tuning {
        Tuning::new(STANDARD_GUITAR)
    }

    #[test]
    fn test_fixed_voicing_for_standard_tuning() {
        let voicing = chord_diagram("E", &standard_guitar()).unwrap();
        assert_eq!(
            voicing.frets,
            vec![
                StringFret::Fret(0),
                StringFret::Fret(2),
                StringFret::Fret(2),
                StringFret::Fret(1),
                StringFret::Fret(0),
                StringFret::Fret(0),
            ]
        );
    }

    #[test]
    fn test_non_standard_tuning_uses_scan() {
        let drop_d = Tuning::new(["D", "A", "D", "G", "B", "E"]);
        let voicing = chord_diagram("E", &drop_d).unwrap();
        // Low D string reaches E at fret 2; no table pattern applies.
        assert_eq!(voicing.frets[0], StringFret::Fret(2));
        assert_eq!(voicing.frets.len(), 6);
    }

    #[test]
    fn test_bass_root_placement() {
        let bass = Tuning::new(STANDARD_BASS);
        let voicing = chord_diagram("C", &bass).unwrap();
        // C on E, A, D, G strings: frets 8, 3, 10, 5.
        assert_eq!(
            voicing.frets,
            vec![
                StringFret::Fret(8),
                StringFret::Fret(3),
                StringFret::Fret(10),
                StringFret::Fret(5),
            ]
        );
    }

    #[test]
    fn test_unresolvable_root_yields_none() {
        assert!(chord_diagram("Xyz", &standard_guitar()).is_none());
        assert!(chord_diagram("", &Tuning::new(STANDARD_BASS)).is_none());
    }

    #[test]
    fn test_diagram_is_pure() {
        let tuning = standard_guitar();
        assert_eq!(chord_diagram("Am", &tuning), chord_diagram("Am", &tuning));
    }

    #[test]
    fn test_open_voicing_layout() {
        let voicing = chord_diagram("Am", &standard_guitar()).unwrap();
        let layout = DiagramLayout::from_voicing(&voicing);
        assert_eq!(layout.base_fret, 1);
        assert!(layout.barre.is_none());
        assert_eq!(layout.markers[0], Marker::Muted);
        assert_eq!(layout.markers[1], Marker::Open);
    }

    #[test]
    fn test_barre_chord_rebased_window() {
        // B major: x 2 4 4 4 2, barre across strings 1..=5 at fret 2.
        let voicing = chord_diagram("B", &standard_guitar()).unwrap();
        let layout = DiagramLayout::from_voicing(&voicing);
        assert_eq!(layout.base_fret, 2);
        assert_eq!(
            layout.barre,
            Some(BarreSpan {
                fret: 2,
                first_string: 1,
                last_string: 5,
            })
        );
        // Fret 4 displays as window position 3.
        assert_eq!(
            layout.markers[2],
            Marker::Dot {
                fret: 4,
                display_fret: 3,
            }
        );
    }

    #[test]
    fn test_open_g_rebases_without_barre() {
        // G major: 3 2 0 0 0 3. The lowest fretted fret is 2, so the
        // window rebases, but only one string sits at fret 2.
        let voicing = chord_diagram("G", &standard_guitar()).unwrap();
        let layout = DiagramLayout::from_voicing(&voicing);
        assert_eq!(layout.base_fret, 2);
        assert!(layout.barre.is_none());
    }

    #[test]
    fn test_no_barre_across_open_strings() {
        // The base fret recurs on the outer strings, but the open strings
        // between them could not sit under a bar.
        let voicing = Voicing {
            chord: "test".to_string(),
            frets: vec![
                StringFret::Fret(3),
                StringFret::Fret(0),
                StringFret::Fret(0),
                StringFret::Fret(0),
                StringFret::Fret(0),
                StringFret::Fret(3),
            ],
        };
        let layout = DiagramLayout::from_voicing(&voicing);
        assert_eq!(layout.base_fret, 3);
        assert!(layout.barre.is_none());
    }

    #[test]
    fn test_full_barre_f_major() {
        let voicing = chord_diagram("F", &standard_guitar()).unwrap();
        let layout = DiagramLayout::from_voicing(&voicing);
        assert_eq!(layout.base_fret, 1);
        // F sits at the nut, so no rebasing and no barre is reported;
        // the shape is still fully described by its markers.
        assert!(layout.barre.is_none());
    }
}

//! Scale derivation from a key string such as "A minor" or "C".

use super::{note_to_pitch_class, PitchClass};

/// Interval formula for the major scale.
const MAJOR_FORMULA: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Interval formula for the natural minor scale.
const MINOR_FORMULA: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

/// The two supported scale types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleType {
    Major,
    Minor,
}

impl ScaleType {
    /// Normalizes a free-text mode label, defaulting to major.
    ///
    /// Case-insensitive; recognizes the Portuguese spellings used by the
    /// surrounding application ("menor", "maior") alongside the English
    /// ones. Anything unrecognized is treated as major.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "minor" | "min" | "menor" => ScaleType::Minor,
            _ => ScaleType::Major,
        }
    }

    /// Returns the scale's interval formula in semitones from the tonic.
    pub fn formula(self) -> &'static [u8; 7] {
        match self {
            ScaleType::Major => &MAJOR_FORMULA,
            ScaleType::Minor => &MINOR_FORMULA,
        }
    }
}

/// Derives the seven scale notes for a key string, tonic first.
///
/// The input format is `"<RootNote> [<mode>]"`; the mode is optional and
/// defaults to major when omitted or unrecognized. An unparseable root
/// returns an empty vector, mirroring [`parse_chord`](super::parse_chord).
///
/// # Examples
///
/// ```
/// use maestro::theory::scale_notes;
///
/// let names: Vec<&str> = scale_notes("A minor").iter().map(|n| n.name()).collect();
/// assert_eq!(names, ["A", "B", "C", "D", "E", "F", "G"]);
/// ```
pub fn scale_notes(key: &str) -> Vec<PitchClass> {
    let mut parts = key.split_whitespace();

    let root_name = match parts.next() {
        Some(root) => root,
        None => return Vec::new(),
    };
    let root = match note_to_pitch_class(root_name) {
        Ok(root) => root,
        Err(_) => return Vec::new(),
    };

    let scale_type = parts
        .next()
        .map(ScaleType::from_label)
        .unwrap_or(ScaleType::Major);

    scale_type
        .formula()
        .iter()
        .map(|&interval| root.transpose(interval as i32))
        .collect()
}

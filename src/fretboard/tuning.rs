//! Instrument tunings and instrument-family classification.

use serde::{Deserialize, Serialize};

/// Canonical standard guitar tuning, low string first.
pub const STANDARD_GUITAR: [&str; 6] = ["E", "A", "D", "G", "B", "E"];

/// Canonical standard bass tuning, low string first.
pub const STANDARD_BASS: [&str; 4] = ["E", "A", "D", "G"];

/// Instrument-label substrings that classify as bass.
/// English and Portuguese terms, matched case-insensitively.
const BASS_SYNONYMS: [&str; 3] = ["bass", "baixo", "contrabaixo"];

/// Fretted-instrument families the voicing engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentFamily {
    Guitar,
    Bass,
}

impl InstrumentFamily {
    /// Classifies an instrument label by substring match.
    ///
    /// Defaults to guitar for missing or unrecognized labels.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return InstrumentFamily::Guitar;
        };
        let lower = label.to_lowercase();
        if BASS_SYNONYMS.iter().any(|term| lower.contains(term)) {
            InstrumentFamily::Bass
        } else {
            InstrumentFamily::Guitar
        }
    }
}

/// An ordered sequence of open-string note names, low string first.
///
/// Note names may carry octave digits ("E2"); they are stripped when the
/// tuning is compared or mapped to pitch classes. Any string count is
/// accepted, so non-standard and user-defined tunings compute correctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tuning {
    strings: Vec<String>,
}

impl Tuning {
    /// Creates a tuning from open-string note names.
    pub fn new<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the open-string names as supplied.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Returns the number of strings.
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Returns the open-string names stripped of octave digits and
    /// uppercased, the form used for tuning comparisons.
    pub fn normalized_notes(&self) -> Vec<String> {
        self.strings
            .iter()
            .map(|note| {
                note.chars()
                    .filter(|c| !c.is_ascii_digit())
                    .collect::<String>()
                    .trim()
                    .to_uppercase()
            })
            .collect()
    }

    /// True when this tuning's note sequence equals canonical standard
    /// guitar tuning. Only then does the fixed voicing table apply.
    pub fn is_standard_guitar(&self) -> bool {
        self.normalized_notes() == STANDARD_GUITAR
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::new(STANDARD_GUITAR)
    }
}

/// A tuning with a user-facing display name.
#[derive(Debug, Clone, Copy)]
pub struct NamedTuning {
    pub name: &'static str,
    pub notes: &'static [&'static str],
}

impl NamedTuning {
    /// Materializes this entry as a [`Tuning`].
    pub fn tuning(&self) -> Tuning {
        Tuning::new(self.notes.iter().copied())
    }
}

const GUITAR_TUNINGS: [NamedTuning; 3] = [
    NamedTuning {
        name: "Standard (EADGBe)",
        notes: &["E", "A", "D", "G", "B", "E"],
    },
    NamedTuning {
        name: "Drop D (DADGBe)",
        notes: &["D", "A", "D", "G", "B", "E"],
    },
    NamedTuning {
        name: "Open G (DGDGBd)",
        notes: &["D", "G", "D", "G", "B", "D"],
    },
];

const BASS_TUNINGS: [NamedTuning; 2] = [
    NamedTuning {
        name: "Standard (EADG)",
        notes: &["E", "A", "D", "G"],
    },
    NamedTuning {
        name: "Drop D (DADG)",
        notes: &["D", "A", "D", "G"],
    },
];

/// Returns the built-in tunings for an instrument family.
/// The first entry is the family's default.
pub fn named_tunings(family: InstrumentFamily) -> &'static [NamedTuning] {
    match family {
        InstrumentFamily::Guitar => &GUITAR_TUNINGS,
        InstrumentFamily::Bass => &BASS_TUNINGS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_label() {
        assert_eq!(
            InstrumentFamily::from_label(Some("Bass Guitar")),
            InstrumentFamily::Bass
        );
        assert_eq!(
            InstrumentFamily::from_label(Some("Contrabaixo")),
            InstrumentFamily::Bass
        );
        assert_eq!(
            InstrumentFamily::from_label(Some("Violão")),
            InstrumentFamily::Guitar
        );
        assert_eq!(InstrumentFamily::from_label(None), InstrumentFamily::Guitar);
    }

    #[test]
    fn test_standard_guitar_detection() {
        assert!(Tuning::new(STANDARD_GUITAR).is_standard_guitar());
        // Octave digits and case are normalized away
        assert!(Tuning::new(["E2", "A2", "D3", "G3", "B3", "e4"]).is_standard_guitar());
        assert!(!Tuning::new(["D", "A", "D", "G", "B", "E"]).is_standard_guitar());
        assert!(!Tuning::new(STANDARD_BASS).is_standard_guitar());
    }

    #[test]
    fn test_named_tunings_defaults() {
        assert!(named_tunings(InstrumentFamily::Guitar)[0]
            .tuning()
            .is_standard_guitar());
        assert_eq!(named_tunings(InstrumentFamily::Bass)[0].tuning().string_count(), 4);
    }

    #[test]
    fn test_tuning_from_settings_json() {
        // Tunings arrive from user settings as plain JSON arrays.
        let tuning: Tuning = serde_json::from_str(r#"["D","A","D","G","B","E"]"#).unwrap();
        assert_eq!(tuning.string_count(), 6);
        assert!(!tuning.is_standard_guitar());
    }
}

//! Fretted-instrument voicing engine.
//!
//! Maps chords and scales onto a string tuning: fixed voicing patterns for
//! standard guitar tuning, scan-based root placement for everything else,
//! and highlight overlays for fretboard rendering. All outputs are plain
//! data handed to an external rendering collaborator.

mod overlay;
mod tuning;
mod voicing;

pub use overlay::{scale_overlay, FretboardOverlay, OverlayCell, StringOverlay, OVERLAY_FRETS};
pub use tuning::{
    named_tunings, InstrumentFamily, NamedTuning, Tuning, STANDARD_BASS, STANDARD_GUITAR,
};
pub use voicing::{chord_diagram, BarreSpan, DiagramLayout, Marker, StringFret, Voicing};

//! Recording and playback of note takes, plus the metronome.
//!
//! Everything here is driven by the audio clock (a running sample counter
//! converted to seconds), not wall-clock timers, so playback timing is exact
//! regardless of callback size or UI frame rate.

/// Recorded note sequence with sorted, loopable playback.
pub mod arrangement;
/// Tap-tempo estimation and the tick generator.
pub mod metronome;
/// Timestamped note capture.
pub mod recorder;

pub use arrangement::{Arrangement, NoteEvent};
pub use metronome::{Metronome, TapTempo};
pub use recorder::Recorder;

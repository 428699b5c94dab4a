pub mod dsp;
pub mod graph; // Composable audio graph nodes
pub mod keymap;
pub mod session; // Note recording, arrangement playback, metronome
pub mod synth; // Voice management and polyphony

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Longest supported delay: 2 seconds at 96 kHz.
pub(crate) const MAX_DELAY_SAMPLES: usize = 192_000;

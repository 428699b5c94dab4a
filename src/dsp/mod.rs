//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free after construction and safe to run
//! inside the audio callback. They stay focused on the signal math; the graph
//! layer adds note events, routing, and parameter plumbing on top.

/// Time-domain delay line with optional interpolated reads.
pub mod delay;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Phase-accumulator oscillator and its waveform selector.
pub mod oscillator;
/// Decaying-reflections reverb tank.
pub mod reverb;

pub use envelope::EnvelopeStage;
pub use oscillator::Waveform;

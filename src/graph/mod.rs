//! Audio-processing graph nodes.
//!
//! Nodes wrap the low-level DSP primitives with what the synthesizer needs to
//! route them: note events, in-place block processing, and the serial effects
//! rack that mirrors the front panel's chorus/delay/reverb toggles.

/// Chorus effect (LFO-modulated short delay).
pub mod chorus;
/// Feedback echo effect.
pub mod delay;
/// Core traits shared by all graph nodes.
pub mod node;
/// The toggleable serial effects chain.
pub mod rack;
/// Reverb effect node.
pub mod reverb;

pub use node::{GraphNode, RenderCtx};
pub use rack::EffectsRack;

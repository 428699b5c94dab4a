/// Context passed to graph nodes during rendering.
///
/// - `sample_rate`: audio sample rate (e.g. 48000.0)
/// - `frequency`: pitch to render, in Hz
/// - `velocity`: intensity 0.0..=1.0 (keyboard presses are always 1.0)
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
}

impl RenderCtx {
    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity,
        }
    }
}

/// Core trait for audio processing graph nodes.
///
/// Sources fill the buffer; effects transform it in place. Either way the
/// node sees one block at a time, never longer than `MAX_BLOCK_SIZE`.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);
}

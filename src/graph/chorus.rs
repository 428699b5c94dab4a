use crate::dsp::delay::DelayLine;
use crate::graph::node::{GraphNode, RenderCtx};
use std::f32::consts::TAU;

/*
Chorus
======

A copy of the signal goes through a short delay whose time is swept by a sine
LFO. As the delay time moves, the copy's pitch bends slightly up and down;
blended with the dry signal it sounds like several players on the same part.

The panel exposes a single depth fader. Depth scales both the center delay
time and the LFO excursion around it, so one control moves the effect from a
faint shimmer to an obvious warble. The LFO rate is fixed at 1 Hz, the rate
the original circuit ran its modulator at.
*/

/// LFO sweep rate in Hz.
const LFO_RATE_HZ: f32 = 1.0;
/// Center delay range covered by the depth fader, in ms.
const MIN_CENTER_MS: f32 = 5.0;
const MAX_CENTER_MS: f32 = 35.0;
/// LFO excursion as a fraction of the center delay. Matches the original
/// circuit's modulator gain of 0.32.
const SWEEP_RATIO: f32 = 0.32;
/// Equal dry/wet blend.
const MIX: f32 = 0.5;

pub struct ChorusNode {
    line: DelayLine,
    lfo_phase: f32,
    center_ms: f32,
}

impl ChorusNode {
    /// `depth` is the panel fader position, 0.0..=1.0.
    pub fn new(depth: f32) -> Self {
        let mut node = Self {
            line: DelayLine::new(),
            lfo_phase: 0.0,
            center_ms: MIN_CENTER_MS,
        };
        node.set_depth(depth);
        node
    }

    pub fn set_depth(&mut self, depth: f32) {
        let depth = depth.clamp(0.0, 1.0);
        self.center_ms = MIN_CENTER_MS + (MAX_CENTER_MS - MIN_CENTER_MS) * depth;
    }

    pub fn depth(&self) -> f32 {
        (self.center_ms - MIN_CENTER_MS) / (MAX_CENTER_MS - MIN_CENTER_MS)
    }

    pub fn reset(&mut self) {
        self.line.reset();
        self.lfo_phase = 0.0;
    }
}

impl GraphNode for ChorusNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let phase_inc = TAU * LFO_RATE_HZ / ctx.sample_rate;

        for sample in out.iter_mut() {
            let sweep = self.lfo_phase.sin() * self.center_ms * SWEEP_RATIO;
            let delay_ms = self.center_ms + sweep;
            let delay_samples = (delay_ms * ctx.sample_rate / 1000.0).max(1.0);

            let wet = self.line.read_interpolated(delay_samples);
            self.line.write(*sample);

            *sample = *sample * (1.0 - MIX) + wet * MIX;

            self.lfo_phase += phase_inc;
            if self.lfo_phase >= TAU {
                self.lfo_phase -= TAU;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(48_000.0, 440.0, 1.0)
    }

    #[test]
    fn thickens_a_steady_tone() {
        let mut node = ChorusNode::new(0.5);
        let mut buffer: Vec<f32> = (0..4096)
            .map(|i| (TAU * 220.0 * i as f32 / 48_000.0).sin())
            .collect();
        let dry = buffer.clone();

        node.render_block(&mut buffer, &ctx());

        // Past the initial delay fill the output must differ from the input
        assert!(buffer[2048..]
            .iter()
            .zip(&dry[2048..])
            .any(|(a, b)| (a - b).abs() > 1e-3));
        assert!(buffer.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn output_level_stays_bounded() {
        let mut node = ChorusNode::new(1.0);
        let mut buffer = vec![1.0f32; 8192];
        node.render_block(&mut buffer, &ctx());
        assert!(buffer.iter().all(|s| s.abs() <= 1.5));
    }

    #[test]
    fn depth_fader_round_trips() {
        let mut node = ChorusNode::new(0.0);
        node.set_depth(0.75);
        assert!((node.depth() - 0.75).abs() < 1e-6);
    }
}

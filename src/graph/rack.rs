use crate::graph::chorus::ChorusNode;
use crate::graph::delay::DelayNode;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::reverb::ReverbNode;

/// The serial effects chain on the mix bus: chorus -> delay -> reverb, each
/// with its own panel toggle.
///
/// Parameter changes are accepted while an effect is switched off and take
/// effect when it comes back on. Switching an effect off clears its internal
/// state, so re-enabling it starts clean instead of replaying a stale tail.
pub struct EffectsRack {
    chorus: ChorusNode,
    delay: DelayNode,
    reverb: ReverbNode,
    chorus_on: bool,
    delay_on: bool,
    reverb_on: bool,
}

impl EffectsRack {
    pub fn new(sample_rate: f32) -> Self {
        // Panel defaults: 300 ms echo, 1 s reverb tail, light chorus
        Self {
            chorus: ChorusNode::new(0.2),
            delay: DelayNode::new(0.3),
            reverb: ReverbNode::new(sample_rate, 1.0),
            chorus_on: false,
            delay_on: false,
            reverb_on: false,
        }
    }

    pub fn set_chorus_enabled(&mut self, enabled: bool) {
        if self.chorus_on && !enabled {
            self.chorus.reset();
        }
        self.chorus_on = enabled;
    }

    pub fn set_delay_enabled(&mut self, enabled: bool) {
        if self.delay_on && !enabled {
            self.delay.reset();
        }
        self.delay_on = enabled;
    }

    pub fn set_reverb_enabled(&mut self, enabled: bool) {
        if self.reverb_on && !enabled {
            self.reverb.reset();
        }
        self.reverb_on = enabled;
    }

    pub fn set_chorus_depth(&mut self, depth: f32) {
        self.chorus.set_depth(depth);
    }

    pub fn set_delay_time(&mut self, seconds: f32) {
        self.delay.set_time(seconds);
    }

    pub fn set_reverb_decay(&mut self, seconds: f32) {
        self.reverb.set_decay(seconds);
    }

    pub fn chorus_enabled(&self) -> bool {
        self.chorus_on
    }

    pub fn delay_enabled(&self) -> bool {
        self.delay_on
    }

    pub fn reverb_enabled(&self) -> bool {
        self.reverb_on
    }

    pub fn chorus_depth(&self) -> f32 {
        self.chorus.depth()
    }

    pub fn delay_time(&self) -> f32 {
        self.delay.time()
    }

    pub fn reverb_decay(&self) -> f32 {
        self.reverb.decay()
    }
}

impl GraphNode for EffectsRack {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if self.chorus_on {
            self.chorus.render_block(out, ctx);
        }
        if self.delay_on {
            self.delay.render_block(out, ctx);
        }
        if self.reverb_on {
            self.reverb.render_block(out, ctx);
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
    fn all_off_is_a_passthrough() {
        let mut rack = EffectsRack::new(48_000.0);
        let mut buffer = vec![0.3f32; 64];
        rack.render_block(&mut buffer, &ctx());
        assert!(buffer.iter().all(|&s| s == 0.3));
    }

    #[test]
    fn enabling_delay_adds_echoes() {
        let mut rack = EffectsRack::new(48_000.0);
        rack.set_delay_enabled(true);
        rack.set_delay_time(0.01);

        let mut buffer = vec![0.0f32; 1024];
        buffer[0] = 1.0;
        rack.render_block(&mut buffer, &ctx());

        // 10 ms at 48 kHz = 480 samples
        assert!(buffer[480].abs() > 0.5, "echo expected at the delay time");
    }

    #[test]
    fn disabling_an_effect_clears_its_tail() {
        let mut rack = EffectsRack::new(48_000.0);
        rack.set_delay_enabled(true);
        rack.set_delay_time(0.01);

        let mut buffer = vec![1.0f32; 64];
        rack.render_block(&mut buffer, &ctx());

        // Toggle off and back on: the line must start silent
        rack.set_delay_enabled(false);
        rack.set_delay_enabled(true);

        let mut silence = vec![0.0f32; 1024];
        rack.render_block(&mut silence, &ctx());
        assert!(silence.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn parameters_stick_while_disabled() {
        let mut rack = EffectsRack::new(48_000.0);
        rack.set_delay_time(0.5);
        rack.set_reverb_decay(2.5);
        rack.set_chorus_depth(0.9);

        assert!((rack.delay_time() - 0.5).abs() < 1e-6);
        assert!((rack.reverb_decay() - 2.5).abs() < 1e-6);
        assert!((rack.chorus_depth() - 0.9).abs() < 1e-3);
    }
}

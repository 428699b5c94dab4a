use crate::dsp::reverb::ReverbTank;
use crate::graph::node::{GraphNode, RenderCtx};

/// Wet level blended into the output. The dry path always passes at unity so
/// toggling reverb never ducks the direct sound.
const WET_LEVEL: f32 = 0.4;

/// Reverb effect. The panel fader sets the tail decay time in seconds.
pub struct ReverbNode {
    tank: ReverbTank,
    decay_seconds: f32,
}

impl ReverbNode {
    pub fn new(sample_rate: f32, decay_seconds: f32) -> Self {
        let decay_seconds = decay_seconds.clamp(0.1, 5.0);
        Self {
            tank: ReverbTank::new(sample_rate, decay_seconds),
            decay_seconds,
        }
    }

    pub fn set_decay(&mut self, decay_seconds: f32) {
        self.decay_seconds = decay_seconds.clamp(0.1, 5.0);
        self.tank.set_decay(self.decay_seconds);
    }

    pub fn decay(&self) -> f32 {
        self.decay_seconds
    }

    pub fn reset(&mut self) {
        self.tank.reset();
    }
}

impl GraphNode for ReverbNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            let dry = *sample;
            let wet = self.tank.process(dry);
            *sample = dry + wet * WET_LEVEL;
        }
    }
}

use crate::dsp::delay::DelayLine;
use crate::graph::node::{GraphNode, RenderCtx};

/// Feedback gain for the echo repeats. Matches the fixed 0.4 on the panel's
/// delay circuit; anything close to 1.0 self-oscillates.
const FEEDBACK: f32 = 0.4;

/// Feedback echo. The delay fader sets the echo time in seconds; each repeat
/// comes back at `FEEDBACK` of the previous one.
pub struct DelayNode {
    line: DelayLine,
    delay_seconds: f32,
}

impl DelayNode {
    pub fn new(delay_seconds: f32) -> Self {
        Self {
            line: DelayLine::new(),
            delay_seconds: delay_seconds.clamp(0.01, 1.0),
        }
    }

    /// Change the echo time. Takes effect immediately; the line is not
    /// cleared, so existing repeats shift rather than cut out.
    pub fn set_time(&mut self, delay_seconds: f32) {
        self.delay_seconds = delay_seconds.clamp(0.01, 1.0);
    }

    pub fn time(&self) -> f32 {
        self.delay_seconds
    }

    pub fn reset(&mut self) {
        self.line.reset();
    }
}

impl GraphNode for DelayNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let delay_samples = ((self.delay_seconds * ctx.sample_rate) as usize).max(1);

        for sample in out.iter_mut() {
            let dry = *sample;
            let delayed = self.line.read(delay_samples);

            // Echoes feed back into the line so they repeat and decay
            self.line.write(dry + delayed * FEEDBACK);
            *sample = dry + delayed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(1_000.0, 440.0, 1.0)
    }

    #[test]
    fn echo_appears_after_the_delay_time() {
        // 50 ms at 1 kHz = 50 samples
        let mut node = DelayNode::new(0.05);

        let mut buffer = vec![0.0f32; 128];
        buffer[0] = 1.0;
        node.render_block(&mut buffer, &ctx());

        assert_eq!(buffer[0], 1.0, "dry signal passes through");
        assert!(buffer[50] > 0.9, "first echo at the delay time");
        assert!(
            buffer[100] > 0.3 && buffer[100] < buffer[50],
            "second echo quieter than the first"
        );
    }

    #[test]
    fn repeats_decay_toward_silence() {
        let mut node = DelayNode::new(0.02);
        let mut buffer = vec![0.0f32; 20];
        buffer[0] = 1.0;
        node.render_block(&mut buffer, &ctx());

        // Run long enough for many repeats to have decayed
        let mut last = f32::MAX;
        for _ in 0..50 {
            let mut block = vec![0.0f32; 20];
            node.render_block(&mut block, &ctx());
            let peak = block.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
            assert!(peak <= last + 1e-6);
            last = peak;
        }
        assert!(last < 0.05, "echoes should have died out, peak {last}");
    }
}

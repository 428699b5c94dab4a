/*
Reverb Tank
===========

A decaying-reflections reverb: four parallel feedback comb filters build the
reverb tail, two series allpass filters smear it into a dense wash. The
front-panel control is a single decay time in seconds; each comb's feedback
gain is derived from it with the RT60 relation

    feedback = 0.001 ^ (comb_delay_seconds / decay_seconds)

so the tail falls 60 dB in the configured time regardless of comb length.

Comb delay times are mutually prime so the echoes from the four lines never
line up, which would otherwise ring at one pitch. A one-pole lowpass in each
comb's feedback path darkens successive reflections the way air and walls do.
*/

/// Comb delay times in milliseconds (mutually prime ratios).
const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
/// Allpass delay times in milliseconds.
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];
/// Allpass diffusion gain.
const DIFFUSION: f32 = 0.5;
/// Feedback-path lowpass amount (0 = bright, 1 = dark).
const DAMPING: f32 = 0.3;

struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
    lowpass_state: f32,
}

impl Comb {
    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
            feedback: 0.0,
            lowpass_state: 0.0,
        }
    }

    fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.pos];

        // Darken the feedback path before re-injecting it
        self.lowpass_state = output * (1.0 - DAMPING) + self.lowpass_state * DAMPING;
        self.buffer[self.pos] = input + self.lowpass_state * self.feedback;

        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.lowpass_state = 0.0;
        self.pos = 0;
    }
}

struct Allpass {
    buffer: Vec<f32>,
    pos: usize,
}

impl Allpass {
    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
        }
    }

    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        let output = delayed - DIFFUSION * input;
        self.buffer[self.pos] = input + DIFFUSION * output;

        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

/// Schroeder-style reverb driven by a single decay-time control.
pub struct ReverbTank {
    combs: [Comb; 4],
    allpasses: [Allpass; 2],
    sample_rate: f32,
}

impl ReverbTank {
    pub fn new(sample_rate: f32, decay_seconds: f32) -> Self {
        let to_samples = |ms: f32| (ms * sample_rate / 1000.0) as usize;

        let mut tank = Self {
            combs: [
                Comb::new(to_samples(COMB_DELAYS_MS[0])),
                Comb::new(to_samples(COMB_DELAYS_MS[1])),
                Comb::new(to_samples(COMB_DELAYS_MS[2])),
                Comb::new(to_samples(COMB_DELAYS_MS[3])),
            ],
            allpasses: [
                Allpass::new(to_samples(ALLPASS_DELAYS_MS[0])),
                Allpass::new(to_samples(ALLPASS_DELAYS_MS[1])),
            ],
            sample_rate,
        };
        tank.set_decay(decay_seconds);
        tank
    }

    /// Set the tail length: time for the reverb to fall by 60 dB.
    pub fn set_decay(&mut self, decay_seconds: f32) {
        let decay_seconds = decay_seconds.clamp(0.05, 10.0);
        for comb in &mut self.combs {
            let delay_seconds = comb.delay_samples() as f32 / self.sample_rate;
            let feedback = 0.001_f32.powf(delay_seconds / decay_seconds);
            comb.feedback = feedback.min(0.98);
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let mut wet = 0.0;
        for comb in &mut self.combs {
            wet += comb.process(input);
        }
        wet *= 0.25;

        for allpass in &mut self.allpasses {
            wet = allpass.process(wet);
        }
        wet
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

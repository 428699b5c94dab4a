use crate::MAX_DELAY_SAMPLES;

/// Circular delay line, pre-allocated at the maximum supported length.
///
/// Reads are expressed as "n samples ago" relative to the write head. The
/// interpolated read exists for the chorus, whose delay time is swept by an
/// LFO between sample positions.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new() -> Self {
        Self {
            buffer: vec![0.0; MAX_DELAY_SAMPLES],
            write_pos: 0,
        }
    }

    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % MAX_DELAY_SAMPLES;
    }

    /// The sample written `delay_samples` writes ago.
    pub fn read(&self, delay_samples: usize) -> f32 {
        let delay_samples = delay_samples.clamp(1, MAX_DELAY_SAMPLES - 1);
        let read_pos = (self.write_pos + MAX_DELAY_SAMPLES - delay_samples) % MAX_DELAY_SAMPLES;
        self.buffer[read_pos]
    }

    /// Linearly interpolated read at a fractional delay.
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let delay_samples = delay_samples.clamp(1.0, (MAX_DELAY_SAMPLES - 2) as f32);
        let whole = delay_samples.floor() as usize;
        let frac = delay_samples - whole as f32;

        let a = self.read(whole);
        let b = self.read(whole + 1);
        a * (1.0 - frac) + b * frac
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}

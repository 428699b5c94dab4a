use std::f32::consts::TAU;

/*
Metronome
=========

Two independent pieces:

TapTempo turns a series of button taps into a BPM estimate. Taps more than
two seconds apart start a fresh measurement, only the most recent four taps
count, and the estimate is 60000 divided by the mean inter-tap gap in
milliseconds. Two taps are enough for a first reading.

Metronome renders the tick itself: a 1 kHz sine ping, starting at 0.5 gain
and decaying exponentially to 0.001 over 100 ms, one per beat, mixed into the
master output. Ticks are spaced by a sample countdown so they never drift the
way an interval timer does. Switching the metronome on (or changing the BPM
while it runs) ticks immediately, matching how the original restarted its
interval.
*/

/// Taps further apart than this start a new measurement (ms).
const TAP_RESET_MS: u64 = 2_000;
/// Number of recent taps that contribute to the estimate.
const TAP_WINDOW: usize = 4;

/// Tap-tempo BPM estimator.
pub struct TapTempo {
    taps: Vec<u64>,
    last_tap_ms: u64,
}

impl TapTempo {
    pub fn new() -> Self {
        Self {
            taps: Vec::with_capacity(TAP_WINDOW),
            last_tap_ms: 0,
        }
    }

    /// Register a tap at `now_ms` and return the BPM estimate once at least
    /// two taps are in the window.
    pub fn tap(&mut self, now_ms: u64) -> Option<u16> {
        if now_ms.saturating_sub(self.last_tap_ms) > TAP_RESET_MS {
            self.taps.clear();
        }
        self.taps.push(now_ms);
        self.last_tap_ms = now_ms;

        if self.taps.len() > TAP_WINDOW {
            let drop = self.taps.len() - TAP_WINDOW;
            self.taps.drain(..drop);
        }

        if self.taps.len() < 2 {
            return None;
        }

        let intervals: Vec<u64> = self.taps.windows(2).map(|w| w[1] - w[0]).collect();
        let mean = intervals.iter().sum::<u64>() as f64 / intervals.len() as f64;
        Some((60_000.0 / mean).round() as u16)
    }
}

impl Default for TapTempo {
    fn default() -> Self {
        Self::new()
    }
}

/// Tick pitch and envelope, from the original click circuit.
const TICK_FREQ_HZ: f32 = 1_000.0;
const TICK_GAIN: f32 = 0.5;
const TICK_FLOOR: f32 = 0.001;
const TICK_SECONDS: f32 = 0.1;

pub const DEFAULT_BPM: u16 = 120;
pub const MIN_BPM: u16 = 20;
pub const MAX_BPM: u16 = 300;

/// Beat-clocked tick generator.
pub struct Metronome {
    enabled: bool,
    bpm: u16,
    /// Samples until the next tick fires.
    countdown: u64,
    /// Remaining samples of the currently sounding tick (0 = quiet).
    tick_remaining: u32,
    tick_phase: f32,
    tick_level: f32,
    tick_coeff: f32,
}

impl Metronome {
    pub fn new() -> Self {
        Self {
            enabled: false,
            bpm: DEFAULT_BPM,
            countdown: 0,
            tick_remaining: 0,
            tick_phase: 0.0,
            tick_level: 0.0,
            tick_coeff: 1.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    /// Enable ticks first-beat-immediately; a sounding tick is left to finish
    /// its decay when disabling.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            self.countdown = 0;
        }
    }

    pub fn toggle(&mut self) {
        self.set_enabled(!self.enabled);
    }

    /// Change the tempo. While running, the beat grid restarts right away.
    pub fn set_bpm(&mut self, bpm: u16) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        if self.enabled {
            self.countdown = 0;
        }
    }

    fn samples_per_beat(&self, sample_rate: f32) -> u64 {
        ((60.0 / self.bpm as f32) * sample_rate).round().max(1.0) as u64
    }

    fn start_tick(&mut self, sample_rate: f32) {
        self.tick_remaining = (TICK_SECONDS * sample_rate) as u32;
        self.tick_phase = 0.0;
        self.tick_level = TICK_GAIN;
        // Reach the floor exactly at the end of the tick
        self.tick_coeff =
            (TICK_FLOOR / TICK_GAIN).powf(1.0 / self.tick_remaining.max(1) as f32);
    }

    /// Mix ticks into a block of audio.
    pub fn render_into(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            if self.enabled {
                if self.countdown == 0 {
                    self.start_tick(sample_rate);
                    self.countdown = self.samples_per_beat(sample_rate);
                }
                self.countdown -= 1;
            }

            if self.tick_remaining > 0 {
                *sample += (TAU * self.tick_phase).sin() * self.tick_level;
                self.tick_phase += TICK_FREQ_HZ / sample_rate;
                if self.tick_phase >= 1.0 {
                    self.tick_phase -= 1.0;
                }
                self.tick_level *= self.tick_coeff;
                self.tick_remaining -= 1;
            }
        }
    }
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new()
    }
}

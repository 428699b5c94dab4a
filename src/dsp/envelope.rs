use crate::{graph::node::RenderCtx, MIN_TIME};

/*
ADSR Envelope
=============

Per-note amplitude shaping. The gain curve is built from literal ramps, the
same shape the front panel describes:

  - Attack:  linear ramp 0 -> 1 over `attack` seconds
  - Decay:   linear ramp 1 -> `sustain` over `decay` seconds
  - Sustain: hold at `sustain` while the key is down
  - Release: exponential ramp from the current level down to the -60 dB
             floor (0.001) over `release` seconds

Attack and decay are linear because they are short and the ear barely notices
the difference there. Release is exponential because a linear fade-out is
audibly "lumpy" at the tail; a constant per-sample ratio sounds like a note
dying away naturally.

Release can begin from ANY stage and always starts at the current level, so
letting go of a key mid-attack never clicks. A zero attack time is allowed
and jumps straight to full level (the classic organ-style instant onset).

The release ratio is snapshotted at note-off:

    coeff = (floor / level)^(1 / (release_seconds * sample_rate))

Multiplying by `coeff` once per sample lands exactly on the floor after the
configured release time, at which point the envelope returns to Idle.
*/

/// Floor for the exponential release ramp (-60 dB).
const RELEASE_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Envelope timing parameters, in seconds (sustain is a level, 0..1).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Adsr {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(MIN_TIME),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(MIN_TIME),
        }
    }
}

impl Default for Adsr {
    /// The original front panel defaults: instant attack, one second decay
    /// into full sustain, one second release.
    fn default() -> Self {
        Self::new(0.0, 1.0, 1.0, 1.0)
    }
}

pub struct Envelope {
    params: Adsr,
    stage: EnvelopeStage,
    level: f32,
    /// Per-sample multiplier for the release ramp, snapshotted at note-off.
    release_coeff: f32,
}

impl Envelope {
    pub fn new(params: Adsr) -> Self {
        Self {
            params,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            release_coeff: 1.0,
        }
    }

    /// Gate high: restart the attack from zero for a clean retrigger.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
    }

    /// Gate low: begin the exponential release from the current level.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        if self.stage == EnvelopeStage::Idle {
            return;
        }
        if self.level <= RELEASE_FLOOR {
            self.level = 0.0;
            self.stage = EnvelopeStage::Idle;
            return;
        }

        let release_samples = (self.params.release * ctx.sample_rate).max(1.0);
        self.release_coeff = (RELEASE_FLOOR / self.level).powf(1.0 / release_samples);
        self.stage = EnvelopeStage::Release;
    }

    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                if self.params.attack <= MIN_TIME {
                    self.level = 1.0;
                } else {
                    self.level += 1.0 / (self.params.attack * ctx.sample_rate);
                }

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                let drop = 1.0 - self.params.sustain;
                self.level -= drop / (self.params.decay * ctx.sample_rate);

                if self.level <= self.params.sustain {
                    self.level = self.params.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeStage::Release => {
                self.level *= self.release_coeff;

                if self.level <= RELEASE_FLOOR {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Multiply a block of audio by the envelope, advancing it per sample.
    pub fn apply(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_sample(ctx);
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
    }
}

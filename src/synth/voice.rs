use crate::dsp::envelope::{Adsr, Envelope};
use crate::dsp::oscillator::{Oscillator, Waveform};
use crate::graph::node::RenderCtx;
use crate::keymap::{self, NoteId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// One oscillator + envelope pair, allocated per note-on.
///
/// Keyboard notes are held until an explicit note-off. Arrangement playback
/// has no note-off events, so those notes carry a gate time after which the
/// voice releases itself (the recorded instrument always stopped a played-back
/// note after its attack + decay had run).
pub struct Voice {
    note: NoteId,
    state: VoiceState,
    age: u64,
    sample_rate: f32,
    osc: Oscillator,
    env: Envelope,
    /// Samples left until self-release, for gated (playback) notes.
    gate_remaining: Option<u64>,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            note: 0,
            state: VoiceState::Free,
            age: 0,
            sample_rate,
            osc: Oscillator::new(Waveform::Sine),
            env: Envelope::new(Adsr::default()),
            gate_remaining: None,
        }
    }

    /// Start the voice. `gate_seconds` of `None` means "held until note-off".
    pub fn start(
        &mut self,
        note: NoteId,
        waveform: Waveform,
        adsr: Adsr,
        age: u64,
        gate_seconds: Option<f64>,
    ) {
        self.note = note;
        self.state = VoiceState::Active;
        self.age = age;
        self.osc.set_waveform(waveform);
        self.osc.reset();
        self.env = Envelope::new(adsr);
        self.env.note_on();
        self.gate_remaining = gate_seconds.map(|g| (g * self.sample_rate as f64) as u64);
    }

    pub fn release(&mut self) {
        if self.state == VoiceState::Active {
            self.state = VoiceState::Releasing;
            self.env.note_off(&self.ctx());
            self.gate_remaining = None;
        }
    }

    /// Render one block. Returns to `Free` once the envelope finishes.
    pub fn render(&mut self, out: &mut [f32]) {
        let ctx = self.ctx();
        self.osc.render(out, &ctx);
        self.env.apply(out, &ctx);

        // Gated notes release themselves once the gate has elapsed.
        // Block-granular is close enough: blocks are a few ms.
        let mut gate_elapsed = false;
        if let Some(remaining) = &mut self.gate_remaining {
            *remaining = remaining.saturating_sub(out.len() as u64);
            gate_elapsed = *remaining == 0;
        }
        if gate_elapsed {
            self.release();
        }

        if self.state == VoiceState::Releasing && !self.env.is_active() {
            self.free();
        }
    }

    fn ctx(&self) -> RenderCtx {
        RenderCtx::from_freq(self.sample_rate, keymap::frequency(self.note), 1.0)
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, VoiceState::Active | VoiceState::Releasing)
    }

    pub fn free(&mut self) {
        self.state = VoiceState::Free;
        self.env.reset();
        self.gate_remaining = None;
    }

    pub fn note(&self) -> NoteId {
        self.note
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }
}

use crate::dsp::envelope::Adsr;
use crate::dsp::oscillator::Waveform;
use crate::graph::node::{GraphNode, RenderCtx};
use crate::graph::rack::EffectsRack;
use crate::session::arrangement::{Arrangement, NoteEvent};
use crate::session::metronome::Metronome;
use crate::session::recorder::Recorder;
use crate::synth::message::{Command, MessageReceiver};
use crate::synth::patch::PATCHES;
use crate::synth::voice::{Voice, VoiceState};
use crate::MAX_BLOCK_SIZE;

/// Default polyphony. Two hands on a typing keyboard rarely exceed this.
const NUM_VOICES: usize = 8;

/// Copy-only status pushed to the UI every callback.
#[derive(Debug, Clone, Copy)]
pub struct EngineStatus {
    pub playhead: f64,
    pub take_duration: f64,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_recording: bool,
    pub metronome_on: bool,
    pub bpm: u16,
    pub waveform: Waveform,
    pub patch_index: usize,
    pub chorus_on: bool,
    pub delay_on: bool,
    pub reverb_on: bool,
    pub chorus_depth: f32,
    pub delay_time: f32,
    pub reverb_decay: f32,
    pub active_voices: u8,
}

/// Arrangement contents handed to the UI whenever the take changes
/// (recording stopped, note moved or removed).
#[derive(Debug, Clone)]
pub struct TakeSnapshot {
    pub notes: Vec<NoteEvent>,
    pub duration: f64,
}

/// The audio-thread side of the synthesizer: voices, effects rack, recorder,
/// arrangement playback, and metronome, all clocked by a sample counter.
///
/// One `render_block` call does everything a callback block needs: drain the
/// command ring, advance arrangement playback, mix voices, add metronome
/// ticks, and run the mix through the effects chain.
pub struct Engine<R: MessageReceiver> {
    voices: Vec<Voice>,
    rx: R,
    rack: EffectsRack,
    metronome: Metronome,
    recorder: Recorder,
    arrangement: Arrangement,
    waveform: Waveform,
    adsr: Adsr,
    patch_index: usize,
    sample_rate: f32,
    clock_samples: u64,
    temp_buffer: Vec<f32>,
    take_dirty: bool,
}

impl<R: MessageReceiver> Engine<R> {
    pub fn new(sample_rate: f32, rx: R) -> Self {
        let default_patch = PATCHES[0];
        Self {
            voices: (0..NUM_VOICES).map(|_| Voice::new(sample_rate)).collect(),
            rx,
            rack: EffectsRack::new(sample_rate),
            metronome: Metronome::new(),
            recorder: Recorder::new(),
            arrangement: Arrangement::new(),
            waveform: default_patch.waveform,
            adsr: default_patch.adsr,
            patch_index: 0,
            sample_rate,
            clock_samples: 0,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
            take_dirty: false,
        }
    }

    /// Audio clock in seconds, used for recording timestamps.
    pub fn clock_seconds(&self) -> f64 {
        self.clock_samples as f64 / self.sample_rate as f64
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(cmd) = self.rx.pop() {
            self.handle_command(cmd);
        }

        // Arrangement playback: fire recorded notes into voices. Played-back
        // notes are gated at attack + decay, after which they release,
        // matching the recorded instrument's fixed note length.
        let gate = (self.adsr.attack + self.adsr.decay).max(0.05) as f64;
        let dt = out.len() as f64 / self.sample_rate as f64;
        let Self {
            arrangement,
            voices,
            waveform,
            adsr,
            clock_samples,
            ..
        } = self;
        arrangement.advance(dt, |note| {
            if let Some(voice) = allocate(voices) {
                voice.start(note, *waveform, *adsr, *clock_samples, Some(gate));
            }
        });

        // Mix voices
        out.fill(0.0);
        for voice in &mut self.voices {
            if voice.is_active() {
                let block = &mut self.temp_buffer[..out.len()];
                block.fill(0.0);
                voice.render(block);

                for (o, v) in out.iter_mut().zip(block.iter()) {
                    *o += v;
                }
            }
        }

        self.metronome.render_into(out, self.sample_rate);

        let master_ctx = RenderCtx::from_freq(self.sample_rate, 0.0, 1.0);
        self.rack.render_block(out, &master_ctx);

        self.clock_samples += out.len() as u64;
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::NoteOn { note } => {
                self.recorder.capture(note, self.clock_seconds());
                let age = self.clock_samples;
                let (waveform, adsr) = (self.waveform, self.adsr);
                if let Some(voice) = allocate(&mut self.voices) {
                    voice.start(note, waveform, adsr, age, None);
                }
            }
            Command::NoteOff { note } => {
                if let Some(voice) = self
                    .voices
                    .iter_mut()
                    .find(|v| v.note() == note && v.state() == VoiceState::Active)
                {
                    voice.release();
                }
            }
            Command::AllNotesOff => {
                for voice in &mut self.voices {
                    if voice.is_active() {
                        voice.release();
                    }
                }
            }

            Command::SetWaveform(waveform) => self.waveform = waveform,
            Command::SetPatch(index) => {
                let patch = PATCHES[index % PATCHES.len()];
                self.patch_index = index % PATCHES.len();
                self.waveform = patch.waveform;
                self.adsr = patch.adsr;
            }

            Command::EnableChorus(on) => self.rack.set_chorus_enabled(on),
            Command::EnableDelay(on) => self.rack.set_delay_enabled(on),
            Command::EnableReverb(on) => self.rack.set_reverb_enabled(on),
            Command::SetChorusDepth(depth) => self.rack.set_chorus_depth(depth),
            Command::SetDelayTime(seconds) => self.rack.set_delay_time(seconds),
            Command::SetReverbDecay(seconds) => self.rack.set_reverb_decay(seconds),

            Command::StartRecording => {
                self.arrangement.stop();
                self.recorder.start(self.clock_seconds());
            }
            Command::StopRecording => {
                self.recorder.stop(self.clock_seconds());
                self.arrangement
                    .set_take(self.recorder.notes().to_vec(), self.recorder.duration());
                self.take_dirty = true;
            }
            Command::Play => {
                self.arrangement.play();
            }
            Command::Stop => self.arrangement.stop(),
            Command::SetLooping(looping) => self.arrangement.set_looping(looping),
            Command::RemoveNote { index } => {
                self.arrangement.remove_note(index);
                self.take_dirty = true;
            }
            Command::MoveNote { index, time } => {
                self.arrangement.move_note(index, time);
                self.take_dirty = true;
            }

            Command::ToggleMetronome => self.metronome.toggle(),
            Command::SetBpm(bpm) => self.metronome.set_bpm(bpm),
        }
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            playhead: self.arrangement.playhead(),
            take_duration: self.arrangement.duration(),
            is_playing: self.arrangement.is_playing(),
            is_looping: self.arrangement.is_looping(),
            is_recording: self.recorder.is_recording(),
            metronome_on: self.metronome.is_enabled(),
            bpm: self.metronome.bpm(),
            waveform: self.waveform,
            patch_index: self.patch_index,
            chorus_on: self.rack.chorus_enabled(),
            delay_on: self.rack.delay_enabled(),
            reverb_on: self.rack.reverb_enabled(),
            chorus_depth: self.rack.chorus_depth(),
            delay_time: self.rack.delay_time(),
            reverb_decay: self.rack.reverb_decay(),
            active_voices: self.voices.iter().filter(|v| v.is_active()).count() as u8,
        }
    }

    /// Take the pending arrangement snapshot, if an edit or a new recording
    /// changed it since the last call. Allocates, but only on edits.
    pub fn take_snapshot(&mut self) -> Option<TakeSnapshot> {
        if !self.take_dirty {
            return None;
        }
        self.take_dirty = false;
        Some(TakeSnapshot {
            notes: self.arrangement.notes().to_vec(),
            duration: self.arrangement.duration(),
        })
    }
}

/// Find a voice to start: any free one, else steal the oldest releasing one.
/// An all-Active pool drops the new note rather than cutting a held key.
fn allocate(voices: &mut [Voice]) -> Option<&mut Voice> {
    if let Some(idx) = voices.iter().position(|v| v.is_free()) {
        return Some(&mut voices[idx]);
    }

    voices
        .iter_mut()
        .filter(|v| v.state() == VoiceState::Releasing)
        .min_by_key(|v| v.age())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    const SR: f32 = 8_000.0;
    const BLOCK: usize = 64;

    fn engine_with(commands: &[Command]) -> Engine<VecDeque<Command>> {
        Engine::new(SR, commands.iter().copied().collect())
    }

    fn render_seconds(engine: &mut Engine<VecDeque<Command>>, seconds: f64) -> Vec<f32> {
        let blocks = (seconds * SR as f64 / BLOCK as f64).ceil() as usize;
        let mut all = Vec::with_capacity(blocks * BLOCK);
        for _ in 0..blocks {
            let mut block = [0.0f32; BLOCK];
            engine.render_block(&mut block);
            all.extend_from_slice(&block);
        }
        all
    }

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }

    #[test]
    fn note_on_makes_sound_and_note_off_ends_it() {
        let mut engine = engine_with(&[Command::NoteOn { note: 12 }]);
        let sounding = render_seconds(&mut engine, 0.1);
        assert!(peak(&sounding) > 0.1);

        engine.handle_command(Command::NoteOff { note: 12 });
        // Organ release is 1 s; after 1.5 s of rendering it must be silent
        let tail = render_seconds(&mut engine, 1.5);
        assert!(peak(&tail[tail.len() - BLOCK..]) < 1e-3);
        assert_eq!(engine.status().active_voices, 0);
    }

    #[test]
    fn recording_and_playback_replays_the_take() {
        let mut engine = engine_with(&[Command::StartRecording]);
        render_seconds(&mut engine, 0.05);

        engine.handle_command(Command::NoteOn { note: 12 });
        engine.handle_command(Command::NoteOff { note: 12 });
        render_seconds(&mut engine, 0.2);
        engine.handle_command(Command::StopRecording);

        let snapshot = engine.take_snapshot().expect("new take available");
        assert_eq!(snapshot.notes.len(), 1);
        assert_eq!(snapshot.notes[0].note, 12);

        // Let the recorded note fade, then play the take back
        render_seconds(&mut engine, 2.0);
        let quiet = render_seconds(&mut engine, 0.05);
        assert!(peak(&quiet) < 1e-3);

        engine.handle_command(Command::Play);
        let playback = render_seconds(&mut engine, 0.2);
        assert!(peak(&playback) > 0.1, "playback must retrigger the note");
    }

    #[test]
    fn looping_replays_until_switched_off() {
        let mut engine = engine_with(&[Command::StartRecording]);
        engine.render_block(&mut [0.0f32; BLOCK]);
        engine.handle_command(Command::NoteOn { note: 20 });
        engine.handle_command(Command::NoteOff { note: 20 });
        render_seconds(&mut engine, 0.3);
        engine.handle_command(Command::StopRecording);

        engine.handle_command(Command::SetLooping(true));
        assert!(engine.status().is_playing);
        assert!(engine.status().is_looping);

        // Still playing after several loop lengths
        render_seconds(&mut engine, 2.0);
        assert!(engine.status().is_playing);

        engine.handle_command(Command::SetLooping(false));
        assert!(!engine.status().is_playing);
    }

    #[test]
    fn patch_selection_changes_waveform_and_envelope() {
        let mut engine = engine_with(&[Command::SetPatch(2)]);
        engine.render_block(&mut [0.0f32; BLOCK]);

        let status = engine.status();
        assert_eq!(status.patch_index, 2);
        assert_eq!(status.waveform, PATCHES[2].waveform);

        // Patch 2 is the pluck: zero sustain, so a held note must ring out
        // on its own, unlike the default organ
        engine.handle_command(Command::NoteOn { note: 12 });
        let audio = render_seconds(&mut engine, 0.5);
        assert!(peak(&audio[..BLOCK * 4]) > 0.1, "pluck onset audible");
        assert!(
            peak(&audio[audio.len() - BLOCK..]) < 1e-3,
            "zero-sustain patch must decay while the key is held"
        );
    }

    #[test]
    fn full_pool_drops_the_new_note_instead_of_cutting_a_held_key() {
        let mut engine = engine_with(&[]);
        for note in 0..NUM_VOICES as u8 {
            engine.handle_command(Command::NoteOn { note });
            engine.render_block(&mut [0.0f32; BLOCK]);
        }
        assert_eq!(engine.status().active_voices, NUM_VOICES as u8);

        // Every voice is held; a ninth key has nowhere to go
        engine.handle_command(Command::NoteOn { note: 30 });
        engine.render_block(&mut [0.0f32; BLOCK]);

        assert_eq!(engine.status().active_voices, NUM_VOICES as u8);
        assert!(engine.voices.iter().all(|v| v.note() != 30));
        let audio = render_seconds(&mut engine, 0.05);
        assert!(peak(&audio) > 0.1, "held notes must keep sounding");
    }

    #[test]
    fn steals_the_oldest_releasing_voice_when_none_are_free() {
        let mut engine = engine_with(&[]);
        // A block between note-ons gives every voice a distinct age
        for note in 0..NUM_VOICES as u8 {
            engine.handle_command(Command::NoteOn { note });
            engine.render_block(&mut [0.0f32; BLOCK]);
        }

        // Two keys come up; the voice for note 2 started first, so it is
        // the older of the two releasing voices
        engine.handle_command(Command::NoteOff { note: 2 });
        engine.handle_command(Command::NoteOff { note: 5 });
        engine.render_block(&mut [0.0f32; BLOCK]);

        engine.handle_command(Command::NoteOn { note: 30 });
        engine.render_block(&mut [0.0f32; BLOCK]);

        assert!(engine
            .voices
            .iter()
            .any(|v| v.note() == 30 && v.state() == VoiceState::Active));
        assert!(engine.voices.iter().all(|v| v.note() != 2), "oldest releasing voice stolen");
        assert!(engine
            .voices
            .iter()
            .any(|v| v.note() == 5 && v.state() == VoiceState::Releasing));
        assert_eq!(engine.status().active_voices, NUM_VOICES as u8);
    }

    #[test]
    fn new_notes_pick_up_the_current_waveform() {
        let mut engine = engine_with(&[Command::NoteOn { note: 12 }]);
        let sine = render_seconds(&mut engine, 0.05);
        engine.handle_command(Command::AllNotesOff);
        render_seconds(&mut engine, 1.5);

        engine.handle_command(Command::SetWaveform(Waveform::Square));
        engine.handle_command(Command::NoteOn { note: 12 });
        let square = render_seconds(&mut engine, 0.05);

        // Organ sustain holds full level, so a square note pins every sample
        // to the rails while the sine sweeps through zero
        assert!(square.iter().all(|&s| s.abs() > 0.99));
        assert!(sine.iter().any(|&s| s.abs() < 0.2));
        assert!(sine
            .iter()
            .zip(&square)
            .any(|(a, b)| (a - b).abs() > 0.5));
    }

    #[test]
    fn effect_toggles_show_up_in_status() {
        let mut engine = engine_with(&[
            Command::EnableDelay(true),
            Command::SetDelayTime(0.25),
            Command::EnableReverb(true),
        ]);
        engine.render_block(&mut [0.0f32; BLOCK]);

        let status = engine.status();
        assert!(status.delay_on);
        assert!(status.reverb_on);
        assert!(!status.chorus_on);
        assert!((status.delay_time - 0.25).abs() < 1e-6);
    }

    #[test]
    fn chord_uses_one_voice_per_note() {
        let mut engine = engine_with(&[
            Command::NoteOn { note: 12 },
            Command::NoteOn { note: 16 },
            Command::NoteOn { note: 19 },
        ]);
        engine.render_block(&mut [0.0f32; BLOCK]);
        assert_eq!(engine.status().active_voices, 3);
    }

    #[test]
    fn metronome_toggle_ticks_and_tempo_changes() {
        let mut engine = engine_with(&[Command::ToggleMetronome, Command::SetBpm(240)]);
        let audio = render_seconds(&mut engine, 0.6);

        // 240 BPM at 8 kHz: ticks every 2000 samples, so a 0.6 s span holds
        // at least two tick onsets
        let status = engine.status();
        assert!(status.metronome_on);
        assert_eq!(status.bpm, 240);
        assert!(peak(&audio[..200]) > 0.1);
        assert!(peak(&audio[2_000..2_200]) > 0.1);
    }
}

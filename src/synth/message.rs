use crate::dsp::oscillator::Waveform;
use crate::keymap::NoteId;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control messages from the UI thread to the audio engine.
///
/// Everything is `Copy` so the ring buffer never moves heap data across the
/// thread boundary.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    NoteOn { note: NoteId },
    NoteOff { note: NoteId },
    AllNotesOff,

    SetWaveform(Waveform),
    SetPatch(usize),

    EnableChorus(bool),
    EnableDelay(bool),
    EnableReverb(bool),
    SetChorusDepth(f32),
    SetDelayTime(f32),
    SetReverbDecay(f32),

    StartRecording,
    StopRecording,
    Play,
    Stop,
    SetLooping(bool),
    RemoveNote { index: usize },
    MoveNote { index: usize, time: f64 },

    ToggleMetronome,
    SetBpm(u16),
}

pub trait MessageReceiver: Send {
    fn pop(&mut self) -> Option<Command>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<Command> {
    fn pop(&mut self) -> Option<Command> {
        Consumer::pop(self).ok()
    }
}

/// In-memory receiver for tests.
impl MessageReceiver for std::collections::VecDeque<Command> {
    fn pop(&mut self) -> Option<Command> {
        self.pop_front()
    }
}

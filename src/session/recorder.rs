use crate::keymap::NoteId;
use crate::session::arrangement::NoteEvent;

/// Captures timestamped notes while armed.
///
/// Timestamps come from the caller's audio clock and are stored relative to
/// the moment recording started, so a take always begins near zero no matter
/// when it was made. Starting a new recording discards the previous take.
pub struct Recorder {
    recording: bool,
    start_time: f64,
    stop_time: f64,
    notes: Vec<NoteEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            recording: false,
            start_time: 0.0,
            stop_time: 0.0,
            notes: Vec::new(),
        }
    }

    pub fn start(&mut self, now: f64) {
        self.notes.clear();
        self.recording = true;
        self.start_time = now;
        self.stop_time = now;
    }

    pub fn stop(&mut self, now: f64) {
        self.recording = false;
        self.stop_time = now;
    }

    /// Record a note-on. Ignored while not recording.
    pub fn capture(&mut self, note: NoteId, now: f64) {
        if self.recording {
            self.notes.push(NoteEvent {
                note,
                time: (now - self.start_time).max(0.0),
            });
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Length of the take: recording stop minus recording start.
    pub fn duration(&self) -> f64 {
        (self.stop_time - self.start_time).max(0.0)
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

use crate::keymap::NoteId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Arrangement
===========

A recorded take and its playback engine. The take is a list of {note, time}
events with times in seconds from the recording start, plus the recorded
duration (stop minus start), which is also the loop length.

Playback is clocked by the audio thread: `advance` is called once per render
block with the block's length in seconds and fires every event whose time has
been reached. Starting playback rewinds to zero, so a restart implicitly
cancels whatever the previous run still had pending. In loop mode the
position wraps at the recorded duration and the event cursor rewinds, endlessly
re-arming the take; any events sitting exactly at the loop boundary fire
before the wrap.

Edits (remove a note, move a note to a new time) keep the list sorted. An
edit during playback re-derives the event cursor from the current position so
already-played events are not repeated and newly-early events are not skipped
into.
*/

/// One recorded note: which key, and when (seconds from recording start).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub note: NoteId,
    pub time: f64,
}

/// A take only loops sensibly if it has some length; shorter recordings fall
/// back to the last note time plus this pad.
const MIN_LOOP_SECONDS: f64 = 0.05;

pub struct Arrangement {
    notes: Vec<NoteEvent>,
    duration: f64,
    playing: bool,
    looping: bool,
    /// Seconds into the take.
    position: f64,
    /// Index of the next unfired event.
    cursor: usize,
}

impl Arrangement {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            duration: 0.0,
            playing: false,
            looping: false,
            position: 0.0,
            cursor: 0,
        }
    }

    /// Replace the take, typically right after the recorder stops.
    pub fn set_take(&mut self, mut notes: Vec<NoteEvent>, duration: f64) {
        notes.sort_by(|a, b| a.time.total_cmp(&b.time));

        let last_note_time = notes.last().map(|n| n.time).unwrap_or(0.0);
        self.duration = duration.max(last_note_time + MIN_LOOP_SECONDS);
        self.notes = notes;
        self.stop();
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn remove_note(&mut self, index: usize) {
        if index < self.notes.len() {
            self.notes.remove(index);
            self.resync_cursor();
        }
    }

    /// Move a note to a new time, clamped into the take. The list stays
    /// sorted, so the note's index may change.
    pub fn move_note(&mut self, index: usize, new_time: f64) {
        if let Some(event) = self.notes.get_mut(index) {
            event.time = new_time.clamp(0.0, self.duration);
            self.notes.sort_by(|a, b| a.time.total_cmp(&b.time));
            self.resync_cursor();
        }
    }

    /// Start playback from the top. Returns false if there is nothing to play.
    pub fn play(&mut self) -> bool {
        if self.notes.is_empty() {
            return false;
        }
        self.position = 0.0;
        self.cursor = 0;
        self.playing = true;
        true
    }

    /// Stop playback and drop anything still pending.
    pub fn stop(&mut self) {
        self.playing = false;
        self.position = 0.0;
        self.cursor = 0;
    }

    /// Turning looping on also starts playback; turning it off stops.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        if looping {
            self.play();
        } else {
            self.stop();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Current playhead position in seconds (0 while stopped).
    pub fn playhead(&self) -> f64 {
        self.position
    }

    /// Advance the playback clock by `dt` seconds, firing every note whose
    /// time arrives. Called from the audio thread once per block.
    pub fn advance(&mut self, dt: f64, mut trigger: impl FnMut(NoteId)) {
        if !self.playing {
            return;
        }

        self.position += dt;

        loop {
            // Fire everything due up to the current position (capped at the
            // take length so boundary events fire before a loop wrap).
            let fire_until = self.position.min(self.duration);
            while self.cursor < self.notes.len() && self.notes[self.cursor].time <= fire_until {
                trigger(self.notes[self.cursor].note);
                self.cursor += 1;
            }

            if self.position < self.duration {
                break;
            }

            if self.looping {
                self.position -= self.duration;
                self.cursor = 0;
            } else {
                self.stop();
                break;
            }
        }
    }

    /// Point the event cursor at the first event past the playhead.
    fn resync_cursor(&mut self) {
        if self.playing {
            self.cursor = self
                .notes
                .iter()
                .position(|n| n.time > self.position)
                .unwrap_or(self.notes.len());
        }
    }
}

impl Default for Arrangement {
    fn default() -> Self {
        Self::new()
    }
}

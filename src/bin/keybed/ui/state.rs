//! Shared state the UI thread keeps between frames.
//!
//! The audio thread is the source of truth. The UI applies each incoming
//! status and take snapshot on top of its own optimistic edits, so a laggy
//! status never makes a keypress feel dropped.

use keybed::keymap::{NoteId, NOTE_COUNT};
use keybed::session::NoteEvent;
use keybed::synth::{EngineStatus, TakeSnapshot};

/// Everything the widgets read when drawing a frame.
pub struct UiState {
    /// Latest engine status, patched locally after each sent command.
    pub status: EngineStatus,
    /// Current arrangement contents.
    pub take_notes: Vec<NoteEvent>,
    pub take_duration: f64,
    /// Timeline selection, an index into `take_notes`.
    pub selected: Option<usize>,
    /// Keys currently held on the musical keyboard.
    pub held: [bool; NOTE_COUNT],
}

impl UiState {
    pub fn new(status: EngineStatus) -> Self {
        Self {
            status,
            take_notes: Vec::new(),
            take_duration: 0.0,
            selected: None,
            held: [false; NOTE_COUNT],
        }
    }

    pub fn apply_status(&mut self, status: EngineStatus) {
        self.status = status;
    }

    pub fn apply_take(&mut self, take: TakeSnapshot) {
        self.take_notes = take.notes;
        self.take_duration = take.duration;
        self.selected = match self.selected {
            _ if self.take_notes.is_empty() => None,
            Some(i) => Some(i.min(self.take_notes.len() - 1)),
            None => None,
        };
    }

    pub fn is_held(&self, note: NoteId) -> bool {
        self.held.get(note as usize).copied().unwrap_or(false)
    }

    pub fn set_held(&mut self, note: NoteId, held: bool) {
        if let Some(slot) = self.held.get_mut(note as usize) {
            *slot = held;
        }
    }

    /// Move the timeline selection by `delta` rows, clamped to the take.
    pub fn move_selection(&mut self, delta: i32) {
        if self.take_notes.is_empty() {
            self.selected = None;
            return;
        }
        let last = self.take_notes.len() - 1;
        self.selected = Some(match self.selected {
            None => {
                if delta >= 0 {
                    0
                } else {
                    last
                }
            }
            Some(i) => (i as i64 + delta as i64).clamp(0, last as i64) as usize,
        });
    }

    pub fn selected_event(&self) -> Option<(usize, NoteEvent)> {
        let i = self.selected?;
        self.take_notes.get(i).map(|&e| (i, e))
    }
}

//! On-screen keyboard widget
//!
//! Three octaves drawn as two rows of key caps, sharps above naturals,
//! labelled with the typing-keyboard character that plays each note.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keybed::keymap::{self, NoteId, NOTE_COUNT};

use super::UiState;

/// Semitone offsets of the natural notes within an octave.
const NATURALS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Width of one key cap in terminal cells.
const KEY_WIDTH: usize = 3;

fn key_style(state: &UiState, note: NoteId, mapped: bool) -> Style {
    if state.is_held(note) {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if mapped {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn key_cap(state: &UiState, note: NoteId) -> Span<'static> {
    let label = keymap::char_for_note(note);
    let text = format!(" {} ", label.unwrap_or('·'));
    Span::styled(text, key_style(state, note, label.is_some()))
}

/// Render the keyboard with held keys highlighted.
pub fn render_keyboard(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().title(" Keyboard ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || (inner.width as usize) < 7 * KEY_WIDTH {
        return;
    }

    let octaves = NOTE_COUNT / 12;

    // Sharps sit in the gap after their natural; E and B have none.
    let mut sharp_spans = vec![Span::raw(" ".repeat(KEY_WIDTH / 2 + 1))];
    let mut natural_spans = Vec::new();
    let mut marker_spans = Vec::new();

    for octave in 0..octaves {
        for (w, &semitone) in NATURALS.iter().enumerate() {
            let note = (octave * 12) as u8 + semitone;
            natural_spans.push(key_cap(state, note));

            if w == 2 || w == 6 {
                sharp_spans.push(Span::raw(" ".repeat(KEY_WIDTH)));
            } else {
                sharp_spans.push(key_cap(state, note + 1));
            }

            // Octave markers under each C
            marker_spans.push(Span::styled(
                if semitone == 0 {
                    format!("{:<width$}", keymap::name(note), width = KEY_WIDTH)
                } else {
                    " ".repeat(KEY_WIDTH)
                },
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    let lines = vec![
        Line::from(sharp_spans),
        Line::from(natural_spans),
        Line::from(marker_spans),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

//! Arrangement timeline widget - recorded notes with playhead and selection

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keybed::keymap;

use super::UiState;

/// Render the arrangement: a time ruler, a lane of note markers, and a
/// scrolling event list with the current selection highlighted.
pub fn render_timeline(frame: &mut Frame, area: Rect, state: &UiState) {
    let title = if state.status.is_recording {
        " Arrangement ● REC "
    } else {
        " Arrangement "
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || inner.width < 20 {
        return;
    }

    if state.take_notes.is_empty() {
        let hint = Paragraph::new(" no take yet - press Space and play something ")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
        return;
    }

    let width = inner.width as usize;
    let duration = state.take_duration.max(f64::EPSILON);
    let to_col = |time: f64| ((time / duration) * (width - 1) as f64) as usize;

    let mut lines = Vec::new();

    // Ruler with the playhead
    let playhead_col = if state.status.is_playing {
        Some(to_col(state.status.playhead))
    } else {
        None
    };
    let mut ruler: Vec<char> = vec!['─'; width];
    for second in 0..=duration as usize {
        let col = to_col(second as f64);
        ruler[col] = '┬';
    }
    if let Some(col) = playhead_col {
        ruler[col] = '▼';
    }
    lines.push(Line::from(Span::styled(
        ruler.into_iter().collect::<String>(),
        if playhead_col.is_some() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        },
    )));

    // Note lane
    let selected = state.selected;
    let mut lane: Vec<(char, bool)> = vec![('·', false); width];
    for (i, event) in state.take_notes.iter().enumerate() {
        let col = to_col(event.time);
        lane[col] = ('◆', selected == Some(i));
    }
    lines.push(Line::from(
        lane.into_iter()
            .map(|(c, sel)| {
                Span::styled(
                    c.to_string(),
                    if sel {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else if c == '◆' {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    },
                )
            })
            .collect::<Vec<_>>(),
    ));

    // Event list, scrolled to keep the selection visible
    let list_rows = inner.height as usize - lines.len();
    let first = match selected {
        Some(i) if i >= list_rows => i + 1 - list_rows,
        _ => 0,
    };
    for (i, event) in state
        .take_notes
        .iter()
        .enumerate()
        .skip(first)
        .take(list_rows)
    {
        let is_selected = selected == Some(i);
        let marker = if is_selected { '>' } else { ' ' };
        let text = format!(
            " {} {:>2}. {:<4} at {:>5.2}s",
            marker,
            i + 1,
            keymap::name(event.note),
            event.time,
        );
        lines.push(Line::from(Span::styled(
            text,
            if is_selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            },
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

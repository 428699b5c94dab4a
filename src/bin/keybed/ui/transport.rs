//! Transport bar widget - patch, tempo, transport state, and output levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keybed::synth::patch::PATCHES;

use super::UiState;

/// Output level summary computed from the scope buffer.
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

fn on_off(on: bool) -> Color {
    if on {
        Color::Green
    } else {
        Color::DarkGray
    }
}

/// Render the transport bar.
pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    state: &UiState,
    stats: &AudioStats,
    release_events: bool,
) {
    let block = Block::default().title(" keybed ").borders(Borders::ALL);
    let status = &state.status;

    let patch = PATCHES[status.patch_index % PATCHES.len()];

    let transport = if status.is_recording {
        ("● REC", Color::Red)
    } else if status.is_playing && status.is_looping {
        ("↻ LOOP", Color::Green)
    } else if status.is_playing {
        ("▶ PLAY", Color::Green)
    } else {
        ("■ STOP", Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", patch.name, status.waveform.glyph()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(format!("{}  ", transport.0), Style::default().fg(transport.1)),
        Span::styled(
            format!("{:>5.2}s  ", status.playhead),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("♩ {} {}  ", status.bpm, if status.metronome_on { "on" } else { "off" }),
            Style::default().fg(on_off(status.metronome_on)),
        ),
        Span::styled(
            format!("cho {:.2}  ", status.chorus_depth),
            Style::default().fg(on_off(status.chorus_on)),
        ),
        Span::styled(
            format!("dly {:.2}s  ", status.delay_time),
            Style::default().fg(on_off(status.delay_on)),
        ),
        Span::styled(
            format!("rev {:.1}s  ", status.reverb_decay),
            Style::default().fg(on_off(status.reverb_on)),
        ),
        Span::styled(
            format!("voices {}  ", status.active_voices),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("peak {:.2} rms {:.2}  ", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            if release_events { "" } else { "(timed notes)" },
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

//! Waveform oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Render the most recent slice of output as an oscilloscope trace.
///
/// Only as many samples as the braille resolution can show are plotted;
/// anything denser just aliases into noise.
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let block = Block::default().title(" Waveform ").borders(Borders::ALL);

    let points = (area.width as usize * 2).clamp(16, audio_buffer.len().max(16));
    let tail = &audio_buffer[audio_buffer.len().saturating_sub(points)..];

    let data: Vec<(f64, f64)> = tail
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64, sample as f64))
        .collect();

    let trace = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![trace])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, tail.len().max(1) as f64 - 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .labels(vec!["-1", "0", "+1"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

//! Spectrum analyzer widget
//!
//! Windowed FFT of the scope buffer, sampled at log-spaced frequencies so
//! each octave gets equal screen width.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Number of log-spaced frequency points to display
const SPECTRUM_POINTS: usize = 64;

/// Lowest displayed frequency. An octave below C3.
const MIN_FREQ_HZ: f64 = 65.0;

/// Display floor in dB
const DB_FLOOR: f64 = -90.0;

/// FFT-based spectrum analyzer. Reused across frames so the plan, window,
/// and scratch buffers are only allocated once.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin feeding each display point
    taps: Vec<usize>,
    /// (log2 frequency, magnitude dB) pairs for the chart
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        // Hann window keeps single notes from smearing across the display
        let denom = fft_size.saturating_sub(1).max(1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let nyquist = (sample_rate as f64 / 2.0).max(MIN_FREQ_HZ * 2.0);
        let half = (fft_size / 2).max(1);

        let mut taps = Vec::with_capacity(SPECTRUM_POINTS);
        let mut points = Vec::with_capacity(SPECTRUM_POINTS);
        for i in 0..SPECTRUM_POINTS {
            let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
            let freq = MIN_FREQ_HZ * (nyquist / MIN_FREQ_HZ).powf(t);
            let bin = (freq * fft_size as f64 / sample_rate as f64).round() as usize;
            taps.push(bin.clamp(1, half - 1));
            points.push((freq.log2(), DB_FLOOR));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            taps,
            points,
        }
    }

    /// Recompute the spectrum from a scope buffer of exactly the FFT size.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (point, &bin) in self.points.iter_mut().zip(&self.taps) {
            let power = self.scratch[bin].norm_sqr().max(1e-12) as f64;
            // Normalize so a full-scale sine sits near 0 dB
            let db = 10.0 * power.log10() - 20.0 * (self.window.len() as f64 / 2.0).log10();
            point.1 = db.max(DB_FLOOR);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Render the spectrum chart.
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let (x_min, x_max) = match (spectrum.first(), spectrum.last()) {
        (Some(&(lo, _)), Some(&(hi, _))) if hi > lo => (lo, hi),
        _ => (0.0, 1.0),
    };

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([x_min, x_max])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([DB_FLOOR, 10.0])
                .labels(vec!["-90", "-50", "-10"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

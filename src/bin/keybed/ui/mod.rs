//! TUI module for keybed
//!
//! Turns the terminal into a playable keyboard with live visualization of
//! the audio output and the recorded arrangement.

pub mod state;

mod keyboard;
mod spectrum;
mod timeline;
mod transport;
mod waveform;

use std::io;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::supports_keyboard_enhancement;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    widgets::Block,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};

use keybed::keymap::{self, NoteId};
use keybed::session::TapTempo;
use keybed::synth::patch::PATCHES;
use keybed::synth::{Command, EngineStatus, TakeSnapshot};

pub use state::UiState;

use keyboard::render_keyboard;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use timeline::render_timeline;
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size (scope window and FFT size)
const VIS_BUFFER_SIZE: usize = 1024;

/// Held-note lifetime when the terminal cannot report key releases.
const FALLBACK_NOTE_MS: u64 = 400;

/// How far the arrow keys nudge a selected note, in seconds.
const NUDGE_SECONDS: f64 = 0.1;

/// UI application: owns the terminal-side ends of all the rings.
pub struct UiApp {
    cmd_tx: Producer<Command>,
    audio_rx: Consumer<f32>,
    status_rx: Consumer<EngineStatus>,
    take_rx: Consumer<TakeSnapshot>,
    state: UiState,
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    tap: TapTempo,
    started: Instant,
    /// True if the terminal reports key release events.
    release_events: bool,
    /// (note, auto-release deadline) pairs for the fallback path.
    pending_release: Vec<(NoteId, Instant)>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        cmd_tx: Producer<Command>,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<EngineStatus>,
        take_rx: Consumer<TakeSnapshot>,
        initial_status: EngineStatus,
        sample_rate: f32,
    ) -> Self {
        Self {
            cmd_tx,
            audio_rx,
            status_rx,
            take_rx,
            state: UiState::new(initial_status),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            analyzer: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            tap: TapTempo::new(),
            started: Instant::now(),
            release_events: false,
            pending_release: Vec::new(),
            should_quit: false,
        }
    }

    /// Run the UI event loop.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        // Kitty-protocol terminals tell us when a key comes back up, which
        // turns the typing keyboard into a real sustain-capable keybed.
        self.release_events = supports_keyboard_enhancement().unwrap_or(false);
        if self.release_events {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = self.event_loop(terminal);

        if self.release_events {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_engine();
            self.expire_held_notes();

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking input poll, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    match key.kind {
                        KeyEventKind::Press => self.handle_press(key.code),
                        KeyEventKind::Repeat => self.handle_repeat(key.code),
                        KeyEventKind::Release => self.handle_release(key.code),
                    }
                }
            }
        }

        self.send(Command::AllNotesOff);
        Ok(())
    }

    /// Drain the scope ring, keeping the most recent window.
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }
        if received {
            let len = self.audio_buffer.len();
            if len > VIS_BUFFER_SIZE {
                self.audio_buffer.drain(0..len - VIS_BUFFER_SIZE);
            }
            self.analyzer.update(&self.audio_buffer);
        }
    }

    /// Pick up the latest status and any arrangement snapshot.
    fn poll_engine(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.state.apply_status(status);
        }
        while let Ok(take) = self.take_rx.pop() {
            self.state.apply_take(take);
        }
    }

    fn send(&mut self, cmd: Command) {
        // A full ring means hundreds of unprocessed commands; dropping one
        // keypress there is the least bad option.
        let _ = self.cmd_tx.push(cmd);
    }

    fn handle_press(&mut self, key: KeyCode) {
        if let KeyCode::Char(c) = key {
            if let Some(note) = keymap::note_for_char(c) {
                self.note_down(note);
                return;
            }
        }

        let status = self.state.status;
        match key {
            KeyCode::Esc => self.should_quit = true,

            KeyCode::Char('o') => {
                let waveform = status.waveform.prev();
                self.state.status.waveform = waveform;
                self.send(Command::SetWaveform(waveform));
            }
            KeyCode::Char('p') => {
                let waveform = status.waveform.next();
                self.state.status.waveform = waveform;
                self.send(Command::SetWaveform(waveform));
            }
            KeyCode::Char('a') => {
                let index = (status.patch_index + 1) % PATCHES.len();
                self.state.status.patch_index = index;
                self.state.status.waveform = PATCHES[index].waveform;
                self.send(Command::SetPatch(index));
            }

            KeyCode::Char('8') => {
                self.state.status.delay_on = !status.delay_on;
                self.send(Command::EnableDelay(!status.delay_on));
            }
            KeyCode::Char('9') => {
                self.state.status.reverb_on = !status.reverb_on;
                self.send(Command::EnableReverb(!status.reverb_on));
            }
            KeyCode::Char('0') => {
                self.state.status.chorus_on = !status.chorus_on;
                self.send(Command::EnableChorus(!status.chorus_on));
            }
            KeyCode::Char('[') => self.adjust_delay(-0.05),
            KeyCode::Char(']') => self.adjust_delay(0.05),
            KeyCode::Char('-') => self.adjust_reverb(-0.25),
            KeyCode::Char('=') => self.adjust_reverb(0.25),
            KeyCode::Char(',') => self.adjust_chorus(-0.05),
            KeyCode::Char('.') => self.adjust_chorus(0.05),

            KeyCode::Char('k') => {
                self.state.status.metronome_on = !status.metronome_on;
                self.send(Command::ToggleMetronome);
            }
            KeyCode::Char('i') => {
                let now_ms = self.started.elapsed().as_millis() as u64;
                if let Some(bpm) = self.tap.tap(now_ms) {
                    self.state.status.bpm = bpm;
                    self.send(Command::SetBpm(bpm));
                }
            }

            KeyCode::Char(' ') => {
                if status.is_recording {
                    self.state.status.is_recording = false;
                    self.send(Command::StopRecording);
                } else {
                    self.state.status.is_recording = true;
                    self.send(Command::StartRecording);
                }
            }
            KeyCode::Enter => self.send(Command::Play),
            KeyCode::Backspace => self.send(Command::Stop),
            KeyCode::Char('l') => {
                self.state.status.is_looping = !status.is_looping;
                self.send(Command::SetLooping(!status.is_looping));
            }

            KeyCode::Up => self.state.move_selection(-1),
            KeyCode::Down => self.state.move_selection(1),
            KeyCode::Left => self.nudge_selected(-NUDGE_SECONDS),
            KeyCode::Right => self.nudge_selected(NUDGE_SECONDS),
            KeyCode::Delete => {
                if let Some((index, _)) = self.state.selected_event() {
                    self.send(Command::RemoveNote { index });
                }
            }

            _ => {}
        }
    }

    fn handle_repeat(&mut self, key: KeyCode) {
        // Key repeat only matters for the fallback release timer; refresh it
        // so an OS-held key does not retrigger or die early.
        if let KeyCode::Char(c) = key {
            if let Some(note) = keymap::note_for_char(c) {
                self.refresh_deadline(note);
            }
        }
    }

    fn handle_release(&mut self, key: KeyCode) {
        if let KeyCode::Char(c) = key {
            if let Some(note) = keymap::note_for_char(c) {
                self.note_up(note);
            }
        }
    }

    fn note_down(&mut self, note: NoteId) {
        if self.state.is_held(note) {
            // OS key repeat on terminals without release events
            self.refresh_deadline(note);
            return;
        }
        self.state.set_held(note, true);
        self.send(Command::NoteOn { note });
        if !self.release_events {
            self.pending_release
                .push((note, Instant::now() + Duration::from_millis(FALLBACK_NOTE_MS)));
        }
    }

    fn note_up(&mut self, note: NoteId) {
        if !self.state.is_held(note) {
            return;
        }
        self.state.set_held(note, false);
        self.pending_release.retain(|(n, _)| *n != note);
        self.send(Command::NoteOff { note });
    }

    fn refresh_deadline(&mut self, note: NoteId) {
        let deadline = Instant::now() + Duration::from_millis(FALLBACK_NOTE_MS);
        for entry in &mut self.pending_release {
            if entry.0 == note {
                entry.1 = deadline;
            }
        }
    }

    /// Release fallback-held notes whose deadline passed.
    fn expire_held_notes(&mut self) {
        let now = Instant::now();
        let expired: Vec<NoteId> = self
            .pending_release
            .iter()
            .filter(|(_, deadline)| *deadline <= now)
            .map(|(note, _)| *note)
            .collect();
        for note in expired {
            self.note_up(note);
        }
    }

    fn adjust_delay(&mut self, delta: f32) {
        let time = (self.state.status.delay_time + delta).clamp(0.01, 1.0);
        self.state.status.delay_time = time;
        self.send(Command::SetDelayTime(time));
    }

    fn adjust_reverb(&mut self, delta: f32) {
        let decay = (self.state.status.reverb_decay + delta).clamp(0.1, 5.0);
        self.state.status.reverb_decay = decay;
        self.send(Command::SetReverbDecay(decay));
    }

    fn adjust_chorus(&mut self, delta: f32) {
        let depth = (self.state.status.chorus_depth + delta).clamp(0.0, 1.0);
        self.state.status.chorus_depth = depth;
        self.send(Command::SetChorusDepth(depth));
    }

    fn nudge_selected(&mut self, delta: f64) {
        if let Some((index, event)) = self.state.selected_event() {
            let time = (event.time + delta).clamp(0.0, self.state.take_duration);
            self.send(Command::MoveNote { index, time });
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Transport bar
                Constraint::Length(7),  // Keyboard
                Constraint::Min(6),     // Arrangement timeline
                Constraint::Length(10), // Scope + spectrum
                Constraint::Length(2),  // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], &self.state, &stats, self.release_events);
        render_keyboard(frame, chunks[1], &self.state);
        render_timeline(frame, chunks[2], &self.state);

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[3]);
        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(frame, scopes[1], self.analyzer.data());

        let help = ratatui::widgets::Paragraph::new(vec![
            ratatui::text::Line::from(
                " play: zxcvbnm + qwertyu rows   O/P wave   A patch   8/9/0 dly/rev/cho on   [ ] dly   - = rev   , . cho",
            ),
            ratatui::text::Line::from(
                " Space rec   Enter play   Bksp stop   L loop   K metronome   I tap tempo   Up/Dn/Lt/Rt/Del edit   Esc quit",
            ),
        ])
        .style(ratatui::style::Style::default().fg(ratatui::style::Color::DarkGray))
        .block(Block::default());
        frame.render_widget(help, chunks[4]);
    }
}

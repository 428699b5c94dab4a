//! Keybed - audio stream setup and application runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use keybed::synth::{Command, Engine, EngineStatus, TakeSnapshot};
use keybed::MAX_BLOCK_SIZE;

use super::ui::UiApp;

/// Command ring capacity. A keypress burst never comes close to this.
const COMMAND_RING: usize = 256;
/// Audio scope ring capacity, a few callbacks' worth of samples.
const AUDIO_RING: usize = 8192;
const STATUS_RING: usize = 64;
const TAKE_RING: usize = 8;

/// Main application: owns nothing until `run`, which wires the audio
/// callback to the TUI through lock-free rings and takes over the terminal.
pub struct Keybed;

impl Keybed {
    pub fn new() -> Self {
        Self
    }

    /// Run the application (takes over the terminal, plays audio).
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        // UI -> audio: commands. Audio -> UI: scope samples, status, takes.
        let (cmd_tx, cmd_rx) = RingBuffer::<Command>::new(COMMAND_RING);
        let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(AUDIO_RING);
        let (mut status_tx, status_rx) = RingBuffer::<EngineStatus>::new(STATUS_RING);
        let (mut take_tx, take_rx) = RingBuffer::<TakeSnapshot>::new(TAKE_RING);

        let mut engine = Engine::new(sample_rate, cmd_rx);
        let initial_status = engine.status();

        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames];

                    engine.render_block(block);

                    // Mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    // Feed the visualizers. Dropped samples are fine, the
                    // scope only ever shows the most recent window.
                    for &s in block.iter() {
                        if audio_tx.push(s).is_err() {
                            break;
                        }
                    }

                    frames_written += frames;
                }

                let _ = status_tx.push(engine.status());
                if let Some(take) = engine.take_snapshot() {
                    let _ = take_tx.push(take);
                }
            },
            |err| eprintln!("audio error: {}", err),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(
            cmd_tx,
            audio_rx,
            status_rx,
            take_rx,
            initial_status,
            sample_rate,
        )
        .run(&mut terminal);
        ratatui::restore();

        result
    }
}

impl Default for Keybed {
    fn default() -> Self {
        Self::new()
    }
}

//! End-to-end rendering checks for the full synthesizer stack.
//!
//! These drive the engine through the same command ring the UI uses and
//! make sure the output stays finite, bounded, and musically sensible.

use rtrb::{Consumer, Producer, RingBuffer};

use keybed::synth::{Command, Engine};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 256;

fn engine() -> (Engine<Consumer<Command>>, Producer<Command>) {
    let (tx, rx) = RingBuffer::new(64);
    (Engine::new(SAMPLE_RATE, rx), tx)
}

fn send(tx: &mut Producer<Command>, commands: &[Command]) {
    for &cmd in commands {
        tx.push(cmd).expect("command ring full");
    }
}

fn render(engine: &mut Engine<Consumer<Command>>, blocks: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(blocks * BLOCK);
    for _ in 0..blocks {
        let mut block = [0.0f32; BLOCK];
        engine.render_block(&mut block);
        out.extend_from_slice(&block);
    }
    out
}

fn render_seconds(engine: &mut Engine<Consumer<Command>>, seconds: f64) -> Vec<f32> {
    render(engine, (seconds * SAMPLE_RATE as f64 / BLOCK as f64).ceil() as usize)
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
}

#[test]
fn idle_engine_renders_silence() {
    let (mut engine, _tx) = engine();
    let audio = render(&mut engine, 20);
    assert!(audio.iter().all(|&s| s == 0.0));
}

#[test]
fn held_chord_through_all_effects_stays_finite_and_bounded() {
    let (mut engine, mut tx) = engine();
    send(
        &mut tx,
        &[
            Command::NoteOn { note: 12 },
            Command::NoteOn { note: 16 },
            Command::NoteOn { note: 19 },
            Command::EnableChorus(true),
            Command::EnableDelay(true),
            Command::EnableReverb(true),
        ],
    );

    let audio = render_seconds(&mut engine, 2.0);

    assert!(audio.iter().all(|s| s.is_finite()));
    assert!(peak(&audio) > 0.1, "chord must be audible");
    // Three voices plus additive effects should still sit well under this
    assert!(peak(&audio) < 8.0, "output must stay bounded");
}

#[test]
fn release_tail_decays_to_silence_with_reverb_running() {
    let (mut engine, mut tx) = engine();
    send(
        &mut tx,
        &[
            Command::NoteOn { note: 24 },
            Command::EnableReverb(true),
            Command::SetReverbDecay(0.5),
        ],
    );
    render_seconds(&mut engine, 0.5);
    assert!(engine.status().active_voices > 0);

    send(&mut tx, &[Command::AllNotesOff]);

    // Organ release is 1s and the reverb decay 0.5s; after 4s the tail
    // must be fully gone.
    let audio = render_seconds(&mut engine, 4.0);
    let tail = &audio[audio.len() - BLOCK..];
    assert!(peak(tail) < 1e-3, "tail must die out, got {}", peak(tail));
    assert_eq!(engine.status().active_voices, 0);
}

#[test]
fn recorded_take_loops_and_keeps_playing() {
    let (mut engine, mut tx) = engine();
    send(&mut tx, &[Command::StartRecording]);
    render(&mut engine, 1);

    // Two notes roughly a quarter second apart
    send(&mut tx, &[Command::NoteOn { note: 0 }, Command::NoteOff { note: 0 }]);
    render_seconds(&mut engine, 0.25);
    send(&mut tx, &[Command::NoteOn { note: 7 }, Command::NoteOff { note: 7 }]);
    render_seconds(&mut engine, 0.25);
    send(&mut tx, &[Command::StopRecording]);
    render(&mut engine, 1);

    let take = engine.take_snapshot().expect("recording produced a take");
    assert_eq!(take.notes.len(), 2);
    assert!(take.notes[0].time < take.notes[1].time);

    send(&mut tx, &[Command::SetLooping(true)]);
    render(&mut engine, 1);
    assert!(engine.status().is_playing);

    // Several loop lengths later playback must still be running
    let audio = render_seconds(&mut engine, take.duration * 3.0);
    assert!(engine.status().is_playing);
    assert!(peak(&audio) > 0.1, "looped take must be audible");
}

#[test]
fn note_edits_show_up_in_the_next_snapshot() {
    let (mut engine, mut tx) = engine();
    send(&mut tx, &[Command::StartRecording]);
    render(&mut engine, 1);
    send(&mut tx, &[Command::NoteOn { note: 5 }, Command::NoteOff { note: 5 }]);
    render_seconds(&mut engine, 0.25);
    send(&mut tx, &[Command::NoteOn { note: 9 }, Command::NoteOff { note: 9 }]);
    render_seconds(&mut engine, 0.25);
    send(&mut tx, &[Command::StopRecording]);
    render(&mut engine, 1);

    let take = engine.take_snapshot().expect("take after recording");
    assert_eq!(take.notes.len(), 2);

    send(&mut tx, &[Command::RemoveNote { index: 0 }]);
    render(&mut engine, 1);
    let take = engine.take_snapshot().expect("take after removal");
    assert_eq!(take.notes.len(), 1);
    assert_eq!(take.notes[0].note, 9);

    send(&mut tx, &[Command::MoveNote { index: 0, time: 0.0 }]);
    render(&mut engine, 1);
    let take = engine.take_snapshot().expect("take after move");
    assert!(take.notes[0].time.abs() < 1e-9);
}

#[test]
fn metronome_ticks_on_the_beat_grid() {
    let (mut engine, mut tx) = engine();
    send(&mut tx, &[Command::ToggleMetronome, Command::SetBpm(120)]);

    // 120 BPM at 48kHz: ticks at samples 0, 24000, 48000
    let audio = render_seconds(&mut engine, 1.1);
    assert!(peak(&audio[..1_000]) > 0.1, "immediate tick on enable");
    assert!(peak(&audio[24_000..25_000]) > 0.1, "tick on beat two");
    // Between ticks (0.1s decay, check well after) it must be quiet
    assert!(peak(&audio[15_000..20_000]) < 1e-3);
}

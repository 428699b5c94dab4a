//! Benchmarks for the synthesizer's DSP hot path.
//!
//! Run with: cargo bench
//!
//! Everything here runs inside the audio callback, so each measurement
//! should sit far below the block deadline (64 samples at 48kHz = 1.33ms).

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use keybed::dsp::envelope::{Adsr, Envelope};
use keybed::dsp::oscillator::{Oscillator, Waveform};
use keybed::dsp::reverb::ReverbTank;
use keybed::graph::node::{GraphNode, RenderCtx};
use keybed::graph::rack::EffectsRack;
use keybed::synth::{Command, Engine};

/// Common audio callback block sizes.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

const SAMPLE_RATE: f32 = 48_000.0;

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in Waveform::ALL {
            let mut osc = Oscillator::new(waveform);
            group.bench_with_input(
                BenchmarkId::new(waveform.label(), size),
                &size,
                |b, _| {
                    b.iter(|| osc.render(black_box(&mut buffer), black_box(&ctx)));
                },
            );
        }
    }

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let ctx = RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![1.0f32; size];
        let mut env = Envelope::new(Adsr::new(0.01, 0.3, 0.7, 0.4));
        env.note_on();

        group.bench_with_input(BenchmarkId::new("apply", size), &size, |b, _| {
            b.iter(|| env.apply(black_box(&mut buffer), black_box(&ctx)));
        });
    }

    group.finish();
}

fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        let input = vec![0.25f32; size];
        let mut tank = ReverbTank::new(SAMPLE_RATE, 1.0);

        group.bench_with_input(BenchmarkId::new("tank", size), &size, |b, _| {
            b.iter(|| {
                for &s in &input {
                    black_box(tank.process(black_box(s)));
                }
            });
        });
    }

    group.finish();
}

fn bench_effects_rack(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/effects_rack");
    let ctx = RenderCtx::from_freq(SAMPLE_RATE, 0.0, 1.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.1f32; size];
        let mut rack = EffectsRack::new(SAMPLE_RATE);
        rack.set_chorus_enabled(true);
        rack.set_delay_enabled(true);
        rack.set_reverb_enabled(true);

        group.bench_with_input(BenchmarkId::new("full_chain", size), &size, |b, _| {
            b.iter(|| rack.render_block(black_box(&mut buffer), black_box(&ctx)));
        });
    }

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Worst realistic case: full chord, all effects, metronome running
        let commands: VecDeque<Command> = [
            Command::NoteOn { note: 12 },
            Command::NoteOn { note: 16 },
            Command::NoteOn { note: 19 },
            Command::NoteOn { note: 23 },
            Command::EnableChorus(true),
            Command::EnableDelay(true),
            Command::EnableReverb(true),
            Command::ToggleMetronome,
        ]
        .into_iter()
        .collect();
        let mut engine = Engine::new(SAMPLE_RATE, commands);
        engine.render_block(&mut buffer);

        group.bench_with_input(BenchmarkId::new("chord_all_fx", size), &size, |b, _| {
            b.iter(|| engine.render_block(black_box(&mut buffer)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_oscillator,
    bench_envelope,
    bench_reverb,
    bench_effects_rack,
    bench_engine,
);
criterion_main!(benches);

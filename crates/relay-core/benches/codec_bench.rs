//! Criterion benchmarks for the relay JSON codec.
//!
//! Measures encode and decode latency for every command type, plus the
//! PCM16 + base64 encoding of one full 100 ms audio chunk, which is the
//! hottest path while the microphone is on.
//!
//! Run with:
//! ```bash
//! cargo bench --package relay-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relay_core::{
    decode_frame, encode_chunk, encode_command, CaptureConfig, KeyName, MouseButton, RelayCommand,
    ScrollDirection,
};

// ── Command fixtures ──────────────────────────────────────────────────────────

fn speech_like_samples(n: usize) -> Vec<i16> {
    (0..n)
        .map(|i| (((i as f32) * 0.07).sin() * 12_000.0) as i16)
        .collect()
}

fn fixtures() -> Vec<(&'static str, RelayCommand)> {
    let chunk = speech_like_samples(CaptureConfig::default().samples_per_chunk());
    vec![
        ("MouseMove", RelayCommand::MouseMove { dx: 14, dy: -6 }),
        (
            "MouseClick",
            RelayCommand::MouseClick {
                button: MouseButton::Left,
            },
        ),
        (
            "MouseScroll",
            RelayCommand::MouseScroll {
                direction: ScrollDirection::Down,
            },
        ),
        (
            "KeyPress",
            RelayCommand::KeyPress {
                key: KeyName::Enter,
            },
        ),
        (
            "TextType",
            RelayCommand::TextType {
                text: "the quick brown fox jumps over the lazy dog".to_string(),
            },
        ),
        (
            "AudioChunk(100ms)",
            RelayCommand::AudioChunk {
                data: encode_chunk(&chunk).unwrap_or_default(),
            },
        ),
    ]
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

/// Benchmarks `encode_command` for every command type.
fn bench_encode(c: &mut Criterion) {
    let commands = fixtures();
    let mut group = c.benchmark_group("encode_command");
    for (name, cmd) in &commands {
        group.bench_with_input(BenchmarkId::new("cmd", name), cmd, |b, cmd| {
            b.iter(|| encode_command(black_box(cmd)).expect("encode must succeed"))
        });
    }
    group.finish();
}

/// Benchmarks `decode_frame` for every command type from pre-encoded frames.
fn bench_decode(c: &mut Criterion) {
    let frames: Vec<(&str, String)> = fixtures()
        .into_iter()
        .map(|(name, cmd)| (name, encode_command(&cmd).expect("encode must succeed")))
        .collect();

    let mut group = c.benchmark_group("decode_frame");
    for (name, frame) in &frames {
        group.bench_with_input(BenchmarkId::new("cmd", name), frame, |b, frame| {
            b.iter(|| decode_frame(black_box(frame)).expect("decode must succeed"))
        });
    }
    group.finish();
}

/// Benchmarks PCM16 + base64 encoding of one default-sized audio chunk.
fn bench_audio_chunk(c: &mut Criterion) {
    let samples = speech_like_samples(CaptureConfig::default().samples_per_chunk());
    c.bench_function("encode_chunk/1600_samples", |b| {
        b.iter(|| encode_chunk(black_box(&samples)))
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_audio_chunk);
criterion_main!(benches);

//! Criterion benchmarks for the environment engine
//!
//! Run with: cargo bench -p earshot-engine
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use earshot_core::ProcessSpec;
use earshot_engine::{EngineParams, EnvironmentEngine, ImpulseLibrary, PROFILES};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZE: usize = 512;

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

/// Decaying noise burst, one second long.
fn synthetic_impulse() -> Vec<f32> {
    let len = SAMPLE_RATE as usize;
    let mut state = 0x2468_ace1_u32;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let white = state as f32 / u32::MAX as f32 - 0.5;
            white * (-(i as f32) / (0.2 * SAMPLE_RATE)).exp()
        })
        .collect()
}

fn library_with_impulses() -> ImpulseLibrary {
    let mut library = ImpulseLibrary::new();
    let ir = synthetic_impulse();
    for profile in &PROFILES {
        if let Some(reference) = profile.impulse {
            // Encoding a finite buffer cannot fail.
            let _ = library.insert_samples(reference.key, &[ir.clone(), ir.clone()], 48000);
        }
    }
    library
}

fn bench_profiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("Profiles");
    let input = generate_test_signal(BLOCK_SIZE);

    for (label, library) in [
        ("dry", ImpulseLibrary::new()),
        ("convolved", library_with_impulses()),
    ] {
        for (index, profile) in PROFILES.iter().enumerate() {
            group.bench_with_input(
                BenchmarkId::new(label, profile.slug),
                &index,
                |b, &index| {
                    let params = Arc::new(EngineParams::new());
                    params.set_profile(index);
                    let mut engine = EnvironmentEngine::new(params);
                    engine.prepare(ProcessSpec::new(SAMPLE_RATE, BLOCK_SIZE, 2), &library);
                    let mut left = input.clone();
                    let mut right = input.clone();
                    b.iter(|| {
                        left.copy_from_slice(&input);
                        right.copy_from_slice(&input);
                        engine.process(black_box(&mut [&mut left[..], &mut right[..]]));
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("Noise");
    for &amount in &[0.0f32, 0.5, 1.0] {
        group.bench_with_input(
            BenchmarkId::new("bypass_with_noise", amount),
            &amount,
            |b, &amount| {
                let params = Arc::new(EngineParams::new());
                params.set_noise_amount(amount);
                let mut engine = EnvironmentEngine::new(params);
                engine.prepare(
                    ProcessSpec::new(SAMPLE_RATE, BLOCK_SIZE, 2),
                    &ImpulseLibrary::new(),
                );
                let mut left = vec![0.0; BLOCK_SIZE];
                let mut right = vec![0.0; BLOCK_SIZE];
                b.iter(|| {
                    engine.process(black_box(&mut [&mut left[..], &mut right[..]]));
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_profiles, bench_noise);
criterion_main!(benches);

//! # Weather Frame Benchmark
//!
//! REQUIREMENTS:
//! - 4000 primary drops plus splash volumes in one frame
//! - 0 allocations once the effect is active
//!
//! Run with: `cargo bench --package squall_weather`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use squall_shared::Vec3;
use squall_weather::particles::PARTICLE_SHADER;
use squall_weather::{
    EffectVolume, FrameInput, PolyBuffers, ShaderTable, UniformHeights, View, VolumeKind,
    WeatherContext, WeatherSettings,
};

const FRAME_MS: u32 = 16;

fn materials() -> ShaderTable {
    ShaderTable::with_names([
        "gfx/misc/raindrop",
        "gfx/misc/raindrop1",
        "gfx/misc/raindrop2",
        "gfx/misc/snow",
        PARTICLE_SHADER,
    ])
}

/// A context that has been running long enough for every slot to be live.
fn warmed(effect: &str, world: &UniformHeights, view: View) -> (WeatherContext, u32) {
    let mut registry = materials();
    let mut ctx = WeatherContext::new(&WeatherSettings::default());
    ctx.init_particles(&mut registry);
    ctx.activate_str(effect, 0, &mut registry)
        .expect("benchmark effect string is valid");
    for i in 0..8 {
        let x = 100.0 + 150.0 * i as f32;
        ctx.add_volume(EffectVolume::new(
            Vec3::new(x, -64.0, 0.0),
            Vec3::new(x + 128.0, 64.0, 256.0),
            VolumeKind::Streak,
        ));
    }

    let mut buffers = PolyBuffers::new();
    let mut time = 0;
    for _ in 0..600 {
        buffers.clear();
        let input = FrameInput {
            time,
            view,
            paused: false,
            density: 1.0,
        };
        ctx.add_atmospheric_effects(&input, world, &mut buffers);
        time += FRAME_MS;
    }
    (ctx, time)
}

fn bench_full_frame(c: &mut Criterion) {
    let world = UniformHeights::open(0.0, 2048.0);
    let view = View::looking(Vec3::new(0.0, 0.0, 64.0), Vec3::X, 90.0, 90.0);
    let mut group = c.benchmark_group("weather_frame");

    for effect in ["T=RAIN,D=4000", "T=SNOW,D=4000"] {
        let (mut ctx, mut time) = warmed(effect, &world, view);
        let mut buffers = PolyBuffers::new();
        group.bench_with_input(BenchmarkId::from_parameter(effect), &effect, |b, _| {
            b.iter(|| {
                buffers.clear();
                let input = FrameInput {
                    time,
                    view,
                    paused: false,
                    density: 1.0,
                };
                ctx.add_atmospheric_effects(&input, &world, &mut buffers);
                time += FRAME_MS;
                black_box(buffers.triangle_count())
            });
        });
    }

    group.finish();
}

fn bench_paused_frame(c: &mut Criterion) {
    let world = UniformHeights::open(0.0, 2048.0);
    let view = View::looking(Vec3::new(0.0, 0.0, 64.0), Vec3::X, 90.0, 90.0);
    let (mut ctx, time) = warmed("T=RAIN,D=4000", &world, view);
    let mut buffers = PolyBuffers::new();

    c.bench_function("weather_frame_paused", |b| {
        b.iter(|| {
            buffers.clear();
            let input = FrameInput {
                time,
                view,
                paused: true,
                density: 1.0,
            };
            ctx.add_atmospheric_effects(&input, &world, &mut buffers);
            black_box(buffers.triangle_count())
        });
    });
}

criterion_group!(benches, bench_full_frame, bench_paused_frame);
criterion_main!(benches);

//! # Profile Follower Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use drive_lib::{
    follower::{Params, ProfileFollower},
    profile::{MotionProfile, Point},
};

fn follower_benchmark(c: &mut Criterion) {
    // ---- Build a long cruise profile ----

    let points: Vec<Point> = (0..1000)
        .map(|i| Point {
            dt: 0.02,
            position: i as f64 * 0.1,
            velocity: 5.0,
            acceleration: 0.0,
            heading: 0.1,
            ..Default::default()
        })
        .collect();
    let profile = Arc::new(MotionProfile::new(points));

    let params = Params::symmetric(0.01, 0.02, 0.005, 1.0, 0.1);
    let mut follower = ProfileFollower::new(profile.clone(), profile, &params);

    // ---- Benchmark the per-tick signal computation ----

    let mut time_s = 0.0;
    c.bench_function("follower_get", |b| {
        b.iter(|| {
            time_s = (time_s + 0.02) % 20.0;
            black_box(follower.get(black_box(0.05), time_s))
        })
    });
}

criterion_group!(benches, follower_benchmark);
criterion_main!(benches);

//! Physics engine benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench physics
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench physics -- broadphase

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rein2d::physics::broadphase::AabbBroadphase;
use rein2d::physics::math::Dir2;
use rein2d::physics::narrowphase::detect_collision;
use rein2d::physics::ray::Ray2d;
use rein2d::physics::shape::WorldShape;
use rein2d::physics::solver::solve_contacts;
use rein2d::{PhysicsConfig, Shape, Transform2d};
use rein2d_bench::*;

fn posed(shape: &Shape, position: Vec2, rotation: f32) -> WorldShape {
    shape.to_world(
        &Transform2d::from_position_rotation(position, rotation),
        Vec2::ZERO,
    )
}

// ---------------------------------------------------------------------------
// Broadphase
// ---------------------------------------------------------------------------

fn bench_broadphase(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("broadphase/dense_scene");
        for &n in &[100, 500, 1000] {
            let (world, physics) = setup_scene(n).expect("scene setup");
            let proxies = collect_proxies(&world, &physics);
            let broadphase = AabbBroadphase::new();
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| broadphase.find_pairs(&proxies));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("broadphase/sparse");
        for &n in &[100, 500, 1000] {
            let proxies = setup_sparse_proxies(n);
            let broadphase = AabbBroadphase::new();
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| broadphase.find_pairs(&proxies));
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Narrowphase
// ---------------------------------------------------------------------------

fn bench_narrowphase(c: &mut Criterion) {
    let circle = Shape::circle(1.0).expect("circle");
    let bbox = Shape::rectangle(Vec2::splat(1.0)).expect("box");
    let edge = Shape::edge(Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)).expect("edge");

    {
        let mut group = c.benchmark_group("narrowphase/circle_circle");
        let a = posed(&circle, Vec2::ZERO, 0.0);
        let hit = posed(&circle, Vec2::new(1.5, 0.0), 0.0);
        let miss = posed(&circle, Vec2::new(5.0, 0.0), 0.0);
        group.bench_function("intersecting", |b| b.iter(|| detect_collision(&a, &hit)));
        group.bench_function("separated", |b| b.iter(|| detect_collision(&a, &miss)));
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/box_box");
        let a = posed(&bbox, Vec2::ZERO, 0.0);
        let hit = posed(&bbox, Vec2::new(1.5, 0.2), 0.0);
        let miss = posed(&bbox, Vec2::new(5.0, 0.0), 0.0);
        let rotated = posed(&bbox, Vec2::new(1.5, 0.0), 0.785);
        group.bench_function("intersecting", |b| b.iter(|| detect_collision(&a, &hit)));
        group.bench_function("separated", |b| b.iter(|| detect_collision(&a, &miss)));
        group.bench_function("rotated", |b| b.iter(|| detect_collision(&a, &rotated)));
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/dispatch");
        let at = |shape: &Shape| posed(shape, Vec2::ZERO, 0.0);
        let near = |shape: &Shape| posed(shape, Vec2::new(0.5, 1.2), 0.3);
        let cases = [
            ("circle_box", at(&circle), near(&bbox)),
            ("box_circle", at(&bbox), near(&circle)),
            ("edge_circle", at(&edge), near(&circle)),
            ("edge_box", at(&edge), near(&bbox)),
            ("edge_edge", at(&edge), near(&edge)),
        ];
        for (name, a, b_shape) in &cases {
            group.bench_function(*name, |b| b.iter(|| detect_collision(a, b_shape)));
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("narrowphase/raycast");
        let ray = Ray2d::new(Vec2::new(-5.0, 0.1), Dir2::X);
        let shapes = [
            ("circle", posed(&circle, Vec2::ZERO, 0.0)),
            ("box", posed(&bbox, Vec2::ZERO, 0.4)),
            ("edge", posed(&edge, Vec2::ZERO, 1.2)),
        ];
        for (name, shape) in &shapes {
            group.bench_function(*name, |b| b.iter(|| shape.cast_ray(&ray, 100.0)));
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

fn bench_solver(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("solver/contact_count");
        let config = PhysicsConfig::default();
        for &n in &[10, 50, 100, 500] {
            let (bodies, contacts) = setup_contacts(n);
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter_batched(
                    || bodies.clone(),
                    |mut bodies| solve_contacts(&contacts, &mut bodies, &config),
                    criterion::BatchSize::SmallInput,
                );
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("solver/iterations");
        let (bodies, contacts) = setup_contacts(100);
        for &iters in &[1, 4, 8, 16, 32] {
            let config = PhysicsConfig {
                solver_iterations: iters,
                ..PhysicsConfig::default()
            };
            group.bench_with_input(BenchmarkId::from_parameter(iters), &iters, |b, _| {
                b.iter_batched(
                    || bodies.clone(),
                    |mut bodies| solve_contacts(&contacts, &mut bodies, &config),
                    criterion::BatchSize::SmallInput,
                );
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

fn bench_pipeline(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("pipeline/step");
        group.sample_size(30);
        for &n in &[50, 100, 250, 500] {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter_batched(
                    || setup_scene(n).expect("scene setup"),
                    |(mut world, mut physics)| {
                        physics.step(&mut world, 1.0 / 60.0);
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("pipeline/sustained_10steps");
        group.sample_size(20);
        for &n in &[100, 250] {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter_batched(
                    || setup_scene(n).expect("scene setup"),
                    |(mut world, mut physics)| {
                        for _ in 0..10 {
                            physics.step(&mut world, 1.0 / 60.0);
                        }
                    },
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("pipeline/raycast");
        let (world, physics) = setup_scene(500).expect("scene setup");
        let ray = Ray2d::new(Vec2::new(-100.0, 2.0), Dir2::X);
        group.bench_function("scene_500", |b| {
            b.iter(|| physics.raycast(&world, ray, 1000.0));
        });
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Mass physics (continuous spawn + step)
// ---------------------------------------------------------------------------

fn bench_mass_physics(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("mass_physics/spawn_rate");
        group.sample_size(10);
        for &spawn_per_frame in &[1, 3, 10] {
            group.bench_with_input(
                BenchmarkId::from_parameter(spawn_per_frame),
                &spawn_per_frame,
                |b, &spf| {
                    b.iter_batched(
                        || setup_mass_scene(0).expect("scene setup"),
                        |(mut world, mut physics)| {
                            run_mass_physics(&mut world, &mut physics, 60, spf, 1)
                                .expect("mass physics run");
                        },
                        criterion::BatchSize::LargeInput,
                    );
                },
            );
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("mass_physics/initial_bodies");
        group.sample_size(10);
        for &initial in &[0, 100, 250] {
            group.bench_with_input(
                BenchmarkId::from_parameter(initial),
                &initial,
                |b, &init| {
                    b.iter_batched(
                        || setup_mass_scene(init).expect("scene setup"),
                        |(mut world, mut physics)| {
                            run_mass_physics(&mut world, &mut physics, 60, 3, 1)
                                .expect("mass physics run");
                        },
                        criterion::BatchSize::LargeInput,
                    );
                },
            );
        }
        group.finish();
    }
}

criterion_group!(
    benches,
    bench_broadphase,
    bench_narrowphase,
    bench_solver,
    bench_pipeline,
    bench_mass_physics
);
criterion_main!(benches);

//! Scene builders shared by the physics benchmarks.

use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use rein2d::physics::broadphase::BroadphaseProxy;
use rein2d::physics::contact::ContactPoint;
use rein2d::physics::solver::{SolverBody, SolverContact};
use rein2d::{
    spawn_body, spawn_static, Collider, PhysicsConfig, PhysicsMaterial, PhysicsWorld, RigidBody,
    Shape, Transform2d,
};

/// Deterministic pseudo-random sequence in `[0, 1)`.
pub struct Lcg(u32);

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self(seed)
    }

    pub fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.0 >> 8) as f32 / (1u32 << 24) as f32
    }

    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}

fn ground(world: &mut hecs::World, physics: &mut PhysicsWorld, half_width: f32) -> anyhow::Result<()> {
    spawn_static(
        world,
        physics,
        Transform2d::from_position(Vec2::new(0.0, -0.5)),
        Collider::new(Shape::rectangle(Vec2::new(half_width, 0.5))?),
    )
    .context("spawning ground")?;
    Ok(())
}

/// `n` dynamic circles and boxes packed densely above a floor.
pub fn setup_scene(n: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    let mut world = hecs::World::new();
    let mut physics = PhysicsWorld::new(PhysicsConfig::default());
    let columns = (n as f32).sqrt().ceil().max(1.0) as usize;
    ground(&mut world, &mut physics, columns as f32 + 2.0)?;

    for i in 0..n {
        let x = (i % columns) as f32 * 0.95 - columns as f32 * 0.5;
        let y = (i / columns) as f32 * 0.95 + 0.5;
        let shape = if i % 2 == 0 {
            Shape::circle(0.5)?
        } else {
            Shape::rectangle(Vec2::splat(0.45))?
        };
        spawn_body(
            &mut world,
            &mut physics,
            Transform2d::from_position(Vec2::new(x, y)),
            RigidBody::new_dynamic(1.0),
            Collider::new(shape),
        )
        .with_context(|| format!("spawning body {i}"))?;
    }

    Ok((world, physics))
}

/// `n` circles scattered over a wide area, mostly not touching.
pub fn setup_sparse_proxies(n: usize) -> Vec<BroadphaseProxy> {
    let mut world = hecs::World::new();
    let mut rng = Lcg::new(7);
    let extent = n as f32;
    (0..n)
        .map(|_| {
            let center = Vec2::new(rng.range(-extent, extent), rng.range(-extent, extent));
            let shape = Shape::Circle { radius: 0.5 }
                .to_world(&Transform2d::from_position(center), Vec2::ZERO);
            BroadphaseProxy {
                entity: world.spawn(()),
                aabb: shape.aabb(),
                is_static: false,
                ignore_collisions: false,
            }
        })
        .collect()
}

/// Broadphase input for every collider of a scene built by [`setup_scene`].
pub fn collect_proxies(world: &hecs::World, physics: &PhysicsWorld) -> Vec<BroadphaseProxy> {
    physics
        .colliders()
        .iter()
        .filter_map(|&entity| {
            let collider = world.get::<&Collider>(entity).ok()?;
            let transform = world.get::<&Transform2d>(entity).ok()?;
            Some(BroadphaseProxy {
                entity,
                aabb: collider.compute_aabb(&transform),
                is_static: !physics.bodies().contains(&entity),
                ignore_collisions: false,
            })
        })
        .collect()
}

/// `n` independent box-on-box contacts with two points each.
pub fn setup_contacts(n: usize) -> (Vec<SolverBody>, Vec<SolverContact>) {
    let material = Arc::new(PhysicsMaterial::default());
    let mut bodies = Vec::with_capacity(n * 2);
    let mut contacts = Vec::with_capacity(n);

    for i in 0..n {
        let x = i as f32 * 3.0;
        let lower = Transform2d::from_position(Vec2::new(x, 0.0));
        let upper = Transform2d::from_position(Vec2::new(x, 0.98));
        bodies.push(SolverBody::fixed(&lower));
        bodies.push(SolverBody::from_body(
            &RigidBody::new_dynamic(1.0).with_linear_velocity(Vec2::new(0.3, -2.0)),
            &upper,
        ));
        contacts.push(SolverContact {
            body_a: i * 2,
            body_b: i * 2 + 1,
            normal: Vec2::Y,
            depth: 0.02,
            contacts: vec![
                ContactPoint {
                    position: Vec2::new(x - 0.5, 0.49),
                    penetration: 0.02,
                },
                ContactPoint {
                    position: Vec2::new(x + 0.5, 0.49),
                    penetration: 0.02,
                },
            ],
            material: PhysicsMaterial::combine(&material, &material),
        });
    }

    (bodies, contacts)
}

/// Empty floor plus `initial` bodies, for the continuous spawn benchmark.
pub fn setup_mass_scene(initial: usize) -> anyhow::Result<(hecs::World, PhysicsWorld)> {
    if initial == 0 {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());
        ground(&mut world, &mut physics, 30.0)?;
        return Ok((world, physics));
    }
    setup_scene(initial)
}

/// Step `frames` times, dropping `spawn_per_frame` circles from the sky each
/// frame and despawning bodies that leave the arena.
pub fn run_mass_physics(
    world: &mut hecs::World,
    physics: &mut PhysicsWorld,
    frames: usize,
    spawn_per_frame: usize,
    seed: u32,
) -> anyhow::Result<()> {
    let mut rng = Lcg::new(seed);
    for _ in 0..frames {
        for _ in 0..spawn_per_frame {
            let position = Vec2::new(rng.range(-20.0, 20.0), rng.range(15.0, 25.0));
            spawn_body(
                world,
                physics,
                Transform2d::from_position(position),
                RigidBody::new_dynamic(1.0),
                Collider::new(Shape::circle(rng.range(0.2, 0.6))?),
            )?;
        }

        physics.step(world, 1.0 / 60.0);

        let fallen: Vec<_> = physics
            .bodies()
            .iter()
            .copied()
            .filter(|&e| {
                world
                    .get::<&Transform2d>(e)
                    .map(|t| t.position.y < -20.0)
                    .unwrap_or(true)
            })
            .collect();
        for entity in fallen {
            rein2d::despawn(world, physics, entity);
        }
    }
    Ok(())
}

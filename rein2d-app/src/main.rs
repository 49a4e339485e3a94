use std::sync::Arc;

use anyhow::Context;
use glam::Vec2;
use rein2d::{
    spawn_body, spawn_static, Collider, ContactEventKind, ContactHandler, ContactListener, Dir2,
    FixedTimestep, PhysicsConfig, PhysicsMaterial, PhysicsWorld, Ray2d, RigidBody, Shape,
    Transform2d,
};

/// Logs everything that passes through the goal zone.
struct GoalZone {
    scored: u32,
}

impl ContactHandler for GoalZone {
    fn on_trigger_enter(&mut self, other: hecs::Entity) {
        self.scored += 1;
        log::info!("goal zone entered by {:?} (total {})", other, self.scored);
    }

    fn on_trigger_exit(&mut self, other: hecs::Entity) {
        log::debug!("goal zone left by {:?}", other);
    }
}

struct Demo {
    world: hecs::World,
    physics: PhysicsWorld,
    stepper: FixedTimestep,
    ball: hecs::Entity,
    stack: Vec<hecs::Entity>,
}

impl Demo {
    fn new() -> anyhow::Result<Self> {
        let mut world = hecs::World::new();
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());

        // Ground
        spawn_static(
            &mut world,
            &mut physics,
            Transform2d::from_position(Vec2::new(0.0, -0.5)),
            Collider::new(Shape::rectangle(Vec2::new(20.0, 0.5))?),
        )
        .context("spawning ground")?;

        // Ramp the ball rolls down
        spawn_static(
            &mut world,
            &mut physics,
            Transform2d::from_position_rotation(Vec2::new(-6.0, 3.0), -0.35),
            Collider::new(Shape::rectangle(Vec2::new(3.0, 0.15))?),
        )
        .context("spawning ramp")?;

        // One-sided ledge made of a single edge
        spawn_static(
            &mut world,
            &mut physics,
            Transform2d::from_position(Vec2::new(8.0, 2.5)),
            Collider::new(Shape::edge(Vec2::new(-1.5, 0.0), Vec2::new(1.5, 0.0))?),
        )
        .context("spawning ledge")?;

        let goal = world.spawn((
            Transform2d::from_position(Vec2::new(4.0, 1.0)),
            Collider::trigger(Shape::rectangle(Vec2::new(0.5, 1.0))?),
            ContactListener::new(GoalZone { scored: 0 }),
        ));
        physics
            .add_collider(&mut world, goal)
            .context("registering goal zone")?;

        let rubber = Arc::new(PhysicsMaterial::new(0.9, 0.7, 0.6)?);
        let ball = spawn_body(
            &mut world,
            &mut physics,
            Transform2d::from_position(Vec2::new(-8.0, 7.0)),
            RigidBody::new_dynamic(1.0).with_drag(0.05, 0.05),
            Collider::new(Shape::circle(0.4)?).with_material(rubber),
        )
        .context("spawning ball")?;

        let wood = Arc::new(PhysicsMaterial::new(0.6, 0.4, 0.1)?);
        let mut stack = Vec::new();
        for level in 0..5 {
            let entity = spawn_body(
                &mut world,
                &mut physics,
                Transform2d::from_position(Vec2::new(0.0, 0.5 + level as f32 * 1.01)),
                RigidBody::new_dynamic(2.0),
                Collider::new(Shape::rectangle(Vec2::splat(0.5))?).with_material(Arc::clone(&wood)),
            )
            .with_context(|| format!("spawning crate {level}"))?;
            stack.push(entity);
        }

        log::info!(
            "scene ready: {} bodies, {} colliders",
            physics.bodies().len(),
            physics.colliders().len()
        );

        Ok(Self {
            world,
            physics,
            stepper: FixedTimestep::new(1.0 / 60.0, 4),
            ball,
            stack,
        })
    }

    fn update(&mut self, frame_dt: f32) {
        let steps = self.stepper.advance(frame_dt);
        for _ in 0..steps {
            self.physics.step(&mut self.world, self.stepper.fixed_dt());
            for event in self.physics.events() {
                if event.kind == ContactEventKind::CollisionEnter && event.entity == self.ball {
                    log::debug!("ball hit {:?}", event.other);
                }
            }
        }
    }

    fn report(&self, frame: usize) {
        if let Ok(transform) = self.world.get::<&Transform2d>(self.ball) {
            log::info!(
                "frame {frame}: ball at ({:.2}, {:.2})",
                transform.position.x,
                transform.position.y
            );
        }
        let top = self
            .stack
            .last()
            .and_then(|&e| self.world.get::<&Transform2d>(e).ok().map(|t| t.position));
        if let Some(top) = top {
            log::info!("frame {frame}: stack top at ({:.2}, {:.2})", top.x, top.y);
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut demo = Demo::new()?;

    // Uneven frame times to exercise the fixed-step accumulator.
    let frame_times = [1.0 / 60.0, 1.0 / 45.0, 1.0 / 90.0, 1.0 / 30.0];
    for frame in 0..600 {
        demo.update(frame_times[frame % frame_times.len()]);
        if frame % 60 == 0 {
            demo.report(frame);
        }
    }

    let probe = Ray2d::new(Vec2::new(0.0, 20.0), Dir2::NEG_Y);
    match demo.physics.raycast(&demo.world, probe, 50.0) {
        Some(hit) => log::info!(
            "probe hit {:?} at ({:.2}, {:.2}), distance {:.2}",
            hit.entity,
            hit.point.x,
            hit.point.y,
            hit.distance
        ),
        None => log::info!("probe hit nothing"),
    }

    Ok(())
}

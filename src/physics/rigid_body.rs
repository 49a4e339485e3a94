//! Rigid body integration functions.

use crate::ecs::components::physics::{Collider, RigidBody, RigidBodyType};
use crate::ecs::components::transform::Transform2d;

use super::solver::SolverBody;
use super::PhysicsConfig;

/// Integrate accumulated forces into velocity, apply drag, then reset the
/// accumulators.
///
/// Only dynamic bodies with a finite mass respond; every body has its
/// accumulators cleared.
pub fn integrate_forces(body: &mut RigidBody, dt: f32) {
    if body.body_type == RigidBodyType::Dynamic && body.inv_mass() > 0.0 {
        // Linear velocity: v += (F/m) * dt
        body.linear_velocity += body.force_accumulator * body.inv_mass() * dt;
        body.angular_velocity += body.torque_accumulator * body.inv_inertia() * dt;

        body.linear_velocity *= 1.0 / (1.0 + body.linear_drag * dt);
        body.angular_velocity *= 1.0 / (1.0 + body.angular_drag * dt);
    }

    if body.fixed_rotation() {
        body.angular_velocity = 0.0;
    }
    body.clear_forces();
}

/// Integrate velocity into pose: p += v * dt, θ += ω * dt.
///
/// Per-step travel is clamped to `max_translation` / `max_rotation` by
/// scaling the velocity down.
pub fn integrate_velocity(body: &mut SolverBody, dt: f32, config: &PhysicsConfig) {
    if !body.integrate {
        return;
    }

    let translation = body.linear_velocity * dt;
    let distance_sq = translation.length_squared();
    if distance_sq > config.max_translation * config.max_translation {
        body.linear_velocity *= config.max_translation / distance_sq.sqrt();
    }

    if body.fixed_rotation {
        body.angular_velocity = 0.0;
    } else {
        let rotation = body.angular_velocity * dt;
        if rotation.abs() > config.max_rotation {
            body.angular_velocity *= config.max_rotation / rotation.abs();
        }
    }

    body.position += body.linear_velocity * dt;
    body.rotation += body.angular_velocity * dt;
}

/// Recompute the body's automatic moment of inertia from its collider.
pub fn update_mass_properties(body: &mut RigidBody, collider: &Collider, transform: &Transform2d) {
    if body.body_type != RigidBodyType::Dynamic || !body.auto_inertia() {
        return;
    }
    let inertia = collider
        .shape
        .moment_of_inertia(body.mass(), transform.scale, collider.offset);
    body.set_shape_inertia(inertia);
}

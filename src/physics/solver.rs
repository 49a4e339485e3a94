//! Sequential impulse contact solver.
//!
//! Nothing is cached between steps: each step's manifolds are solved from
//! scratch for a fixed number of iterations, then residual penetration is
//! removed with a direct positional correction.

use glam::Vec2;

use crate::ecs::components::physics::{PhysicsMaterial, RigidBody, RigidBodyType};
use crate::ecs::components::transform::Transform2d;

use super::contact::ContactPoint;
use super::math::{cross, cross_sv, EPSILON};
use super::PhysicsConfig;

/// Per-body state copied out of the ECS for the duration of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverBody {
    pub position: Vec2,
    pub rotation: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub inv_mass: f32,
    pub inv_inertia: f32,
    /// Whether velocity integration moves this body (false for static bodies).
    pub integrate: bool,
    pub fixed_rotation: bool,
}

impl SolverBody {
    pub fn from_body(body: &RigidBody, transform: &Transform2d) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            linear_velocity: body.linear_velocity,
            angular_velocity: body.angular_velocity,
            inv_mass: body.inv_mass(),
            inv_inertia: body.inv_inertia(),
            integrate: body.body_type != RigidBodyType::Static,
            fixed_rotation: body.fixed_rotation(),
        }
    }

    /// Immovable body for colliders without a rigid body.
    pub fn fixed(transform: &Transform2d) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            integrate: false,
            fixed_rotation: true,
        }
    }

    #[inline]
    fn velocity_at(&self, r: Vec2) -> Vec2 {
        self.linear_velocity + cross_sv(self.angular_velocity, r)
    }

    #[inline]
    fn apply_impulse(&mut self, impulse: Vec2, r: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * cross(r, impulse);
    }
}

/// A manifold ready for solving: body slots plus combined material.
#[derive(Debug, Clone)]
pub struct SolverContact {
    pub body_a: usize,
    pub body_b: usize,
    /// Unit normal from A to B.
    pub normal: Vec2,
    pub depth: f32,
    pub contacts: Vec<ContactPoint>,
    pub material: PhysicsMaterial,
}

/// Solve contact constraints: velocity iterations, then positional correction.
pub fn solve_contacts(
    contacts: &[SolverContact],
    bodies: &mut [SolverBody],
    config: &PhysicsConfig,
) {
    for _ in 0..config.solver_iterations {
        for contact in contacts {
            solve_velocity(contact, bodies, config);
        }
    }
    for contact in contacts {
        correct_position(contact, bodies, config);
    }
}

/// Mutable access to two distinct slots.
fn pair_mut(
    bodies: &mut [SolverBody],
    a: usize,
    b: usize,
) -> Option<(&mut SolverBody, &mut SolverBody)> {
    if a == b || a >= bodies.len() || b >= bodies.len() {
        return None;
    }
    if a < b {
        let (left, right) = bodies.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = bodies.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}

fn solve_velocity(contact: &SolverContact, bodies: &mut [SolverBody], config: &PhysicsConfig) {
    let Some((a, b)) = pair_mut(bodies, contact.body_a, contact.body_b) else {
        return;
    };
    if a.inv_mass == 0.0 && b.inv_mass == 0.0 && a.inv_inertia == 0.0 && b.inv_inertia == 0.0 {
        return;
    }

    let normal = contact.normal;
    let material = &contact.material;

    for point in &contact.contacts {
        let r_a = point.position - a.position;
        let r_b = point.position - b.position;

        let relative_velocity = b.velocity_at(r_b) - a.velocity_at(r_a);
        let contact_velocity = relative_velocity.dot(normal);

        // Separating
        if contact_velocity > 0.0 {
            continue;
        }

        let r_a_cross_n = cross(r_a, normal);
        let r_b_cross_n = cross(r_b, normal);
        let inv_mass_sum = a.inv_mass
            + b.inv_mass
            + r_a_cross_n * r_a_cross_n * a.inv_inertia
            + r_b_cross_n * r_b_cross_n * b.inv_inertia;
        if inv_mass_sum <= 0.0 {
            continue;
        }

        let restitution = if -contact_velocity > config.restitution_threshold {
            material.restitution
        } else {
            0.0
        };

        let j = (-(1.0 + restitution) * contact_velocity / inv_mass_sum).min(config.max_impulse);
        let impulse = normal * j;
        a.apply_impulse(-impulse, r_a);
        b.apply_impulse(impulse, r_b);

        // Friction
        let relative_velocity = b.velocity_at(r_b) - a.velocity_at(r_a);
        let tangent_velocity = relative_velocity - normal * relative_velocity.dot(normal);
        let tangent_speed = tangent_velocity.length();
        if tangent_speed < EPSILON {
            continue;
        }
        let tangent = tangent_velocity / tangent_speed;

        let r_a_cross_t = cross(r_a, tangent);
        let r_b_cross_t = cross(r_b, tangent);
        let inv_mass_t = a.inv_mass
            + b.inv_mass
            + r_a_cross_t * r_a_cross_t * a.inv_inertia
            + r_b_cross_t * r_b_cross_t * b.inv_inertia;
        if inv_mass_t <= 0.0 {
            continue;
        }

        let jt = -relative_velocity.dot(tangent) / inv_mass_t;

        // Coulomb: stick while within the static cone, otherwise slide.
        let jt = if jt.abs() < j * material.static_friction {
            jt
        } else {
            -j * material.dynamic_friction
        };

        let friction_impulse = tangent * jt;
        a.apply_impulse(-friction_impulse, r_a);
        b.apply_impulse(friction_impulse, r_b);
    }
}

fn correct_position(contact: &SolverContact, bodies: &mut [SolverBody], config: &PhysicsConfig) {
    let Some((a, b)) = pair_mut(bodies, contact.body_a, contact.body_b) else {
        return;
    };
    let inv_mass_sum = a.inv_mass + b.inv_mass;
    if inv_mass_sum <= 0.0 {
        return;
    }

    let magnitude = ((contact.depth - config.penetration_slop).max(0.0)
        * config.correction_percent)
        .min(config.max_correction);
    if magnitude <= 0.0 {
        return;
    }

    let correction = contact.normal * (magnitude / inv_mass_sum);
    a.position -= correction * a.inv_mass;
    b.position += correction * b.inv_mass;
}

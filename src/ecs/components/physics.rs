//! Physics components for ECS entities.

use std::sync::Arc;

use glam::Vec2;

use crate::physics::contact::ContactHandler;
use crate::physics::error::MaterialError;
use crate::physics::math::cross;
use crate::physics::shape::Shape;

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by forces and collisions.
    Dynamic,
    /// Immovable.
    Static,
    /// Moved by its velocity only; pushes dynamic bodies but is never pushed.
    Kinematic,
}

/// Rigid body component.
///
/// Mass and inertia are stored together with their inverses. An inverse of
/// zero means the body never responds to forces or impulses on that axis.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: RigidBodyType,
    mass: f32,
    inv_mass: f32,
    inertia: f32,
    inv_inertia: f32,
    /// Inertia is derived from the attached collider's shape on registration.
    auto_inertia: bool,
    fixed_rotation: bool,
    pub linear_velocity: Vec2,
    /// Angular velocity in radians per second (counter-clockwise positive).
    pub angular_velocity: f32,
    pub force_accumulator: Vec2,
    pub torque_accumulator: f32,
    /// Linear drag coefficient, applied as `v *= 1 / (1 + drag * dt)`.
    pub linear_drag: f32,
    /// Angular drag coefficient.
    pub angular_drag: f32,
    /// Registered with the world's gravity generator when added.
    pub follows_gravity: bool,
}

impl RigidBody {
    /// Create a new dynamic rigid body with the given mass.
    ///
    /// A non-positive or non-finite mass produces an immovable body.
    pub fn new_dynamic(mass: f32) -> Self {
        let mut body = Self::base(RigidBodyType::Dynamic);
        body.follows_gravity = true;
        body.set_mass(mass);
        // Unit disc approximation until a collider provides the real shape.
        body.set_inertia_internal(0.5 * mass);
        body.auto_inertia = true;
        body
    }

    /// Create a new static rigid body.
    pub fn new_static() -> Self {
        Self::base(RigidBodyType::Static)
    }

    /// Create a new kinematic rigid body.
    pub fn new_kinematic() -> Self {
        Self::base(RigidBodyType::Kinematic)
    }

    fn base(body_type: RigidBodyType) -> Self {
        Self {
            body_type,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            auto_inertia: false,
            fixed_rotation: false,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force_accumulator: Vec2::ZERO,
            torque_accumulator: 0.0,
            linear_drag: 0.0,
            angular_drag: 0.0,
            follows_gravity: false,
        }
    }

    pub fn with_linear_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, velocity: f32) -> Self {
        self.angular_velocity = velocity;
        self
    }

    pub fn with_drag(mut self, linear: f32, angular: f32) -> Self {
        self.linear_drag = linear.max(0.0);
        self.angular_drag = angular.max(0.0);
        self
    }

    pub fn with_gravity(mut self, follows_gravity: bool) -> Self {
        self.follows_gravity = follows_gravity;
        self
    }

    /// Use an explicit moment of inertia instead of deriving it from the collider.
    pub fn with_inertia(mut self, inertia: f32) -> Self {
        self.set_inertia(inertia);
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.set_fixed_rotation(fixed);
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    #[inline]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    #[inline]
    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    #[inline]
    pub fn fixed_rotation(&self) -> bool {
        self.fixed_rotation
    }

    #[inline]
    pub fn auto_inertia(&self) -> bool {
        self.auto_inertia
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == RigidBodyType::Dynamic
    }

    #[inline]
    pub fn is_kinematic(&self) -> bool {
        self.body_type == RigidBodyType::Kinematic
    }

    /// Static for collision purposes: never moved by forces or impulses.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Set the mass. Ignored for non-dynamic bodies.
    pub fn set_mass(&mut self, mass: f32) {
        if self.body_type != RigidBodyType::Dynamic {
            return;
        }
        if mass.is_finite() && mass > 0.0 {
            self.mass = mass;
            self.inv_mass = 1.0 / mass;
        } else {
            self.mass = 0.0;
            self.inv_mass = 0.0;
        }
    }

    /// Set an explicit moment of inertia and stop deriving it from the shape.
    pub fn set_inertia(&mut self, inertia: f32) {
        self.auto_inertia = false;
        self.set_inertia_internal(inertia);
    }

    /// Moment of inertia computed by the physics world from the collider shape.
    pub(crate) fn set_shape_inertia(&mut self, inertia: f32) {
        if self.auto_inertia {
            self.set_inertia_internal(inertia);
        }
    }

    fn set_inertia_internal(&mut self, inertia: f32) {
        if self.body_type != RigidBodyType::Dynamic {
            return;
        }
        self.inertia = inertia;
        self.inv_inertia = if self.fixed_rotation || !inertia.is_finite() || inertia <= 0.0 {
            0.0
        } else {
            1.0 / inertia
        };
    }

    /// Lock rotation: infinite angular mass and zero angular velocity.
    pub fn set_fixed_rotation(&mut self, fixed: bool) {
        self.fixed_rotation = fixed;
        if fixed {
            self.inv_inertia = 0.0;
            self.angular_velocity = 0.0;
            self.torque_accumulator = 0.0;
        } else {
            self.set_inertia_internal(self.inertia);
        }
    }

    /// Accumulate a force through the center of mass.
    pub fn add_force(&mut self, force: Vec2) {
        self.force_accumulator += force;
    }

    pub fn add_torque(&mut self, torque: f32) {
        if !self.fixed_rotation {
            self.torque_accumulator += torque;
        }
    }

    /// Accumulate a force applied at `r` (offset from the center of mass).
    pub fn add_force_at(&mut self, force: Vec2, r: Vec2) {
        self.add_force(force);
        self.add_torque(cross(r, force));
    }

    /// Instantly change velocity by `impulse / mass`.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
    }

    /// Apply an impulse at `r` (offset from the center of mass).
    pub fn apply_impulse_at(&mut self, impulse: Vec2, r: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * cross(r, impulse);
    }

    /// Velocity of the material point at offset `r` from the center of mass.
    pub fn velocity_at(&self, r: Vec2) -> Vec2 {
        self.linear_velocity + Vec2::new(-self.angular_velocity * r.y, self.angular_velocity * r.x)
    }

    pub fn clear_forces(&mut self) {
        self.force_accumulator = Vec2::ZERO;
        self.torque_accumulator = 0.0;
    }
}

/// Surface properties shared between colliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsMaterial {
    pub static_friction: f32,
    /// Expected to be at most `static_friction`; not enforced.
    pub dynamic_friction: f32,
    pub restitution: f32,
}

impl PhysicsMaterial {
    pub fn new(
        static_friction: f32,
        dynamic_friction: f32,
        restitution: f32,
    ) -> Result<Self, MaterialError> {
        let material = Self {
            static_friction,
            dynamic_friction,
            restitution,
        };
        material.validate()?;
        Ok(material)
    }

    /// Check that every coefficient lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), MaterialError> {
        for (name, value) in [
            ("static friction", self.static_friction),
            ("dynamic friction", self.dynamic_friction),
            ("restitution", self.restitution),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MaterialError::OutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// Perfectly elastic, frictionless.
    pub fn bouncy() -> Self {
        Self {
            static_friction: 0.0,
            dynamic_friction: 0.0,
            restitution: 1.0,
        }
    }

    /// Combine two materials for a contact pair: geometric mean of each coefficient.
    pub fn combine(a: &PhysicsMaterial, b: &PhysicsMaterial) -> PhysicsMaterial {
        PhysicsMaterial {
            static_friction: (a.static_friction * b.static_friction).sqrt(),
            dynamic_friction: (a.dynamic_friction * b.dynamic_friction).sqrt(),
            restitution: (a.restitution * b.restitution).sqrt(),
        }
    }
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            static_friction: 0.5,
            dynamic_friction: 0.3,
            restitution: 0.3,
        }
    }
}

/// Collision detection component.
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: Shape,
    /// Offset from the entity's transform origin, in local space.
    pub offset: Vec2,
    pub material: Arc<PhysicsMaterial>,
    /// If true, generates trigger events but no physics response.
    pub is_trigger: bool,
}

impl Collider {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            offset: Vec2::ZERO,
            material: Arc::new(PhysicsMaterial::default()),
            is_trigger: false,
        }
    }

    /// A trigger collider: reports overlaps, never resolved.
    pub fn trigger(shape: Shape) -> Self {
        Self {
            is_trigger: true,
            ..Self::new(shape)
        }
    }

    pub fn with_material(mut self, material: Arc<PhysicsMaterial>) -> Self {
        self.material = material;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

/// Tag: the broadphase skips every pair involving this entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCollisions;

/// Receives collision and trigger callbacks for the entity it is attached to.
pub struct ContactListener(pub Box<dyn ContactHandler>);

impl ContactListener {
    pub fn new(handler: impl ContactHandler) -> Self {
        Self(Box::new(handler))
    }
}

impl std::fmt::Debug for ContactListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactListener").finish_non_exhaustive()
    }
}

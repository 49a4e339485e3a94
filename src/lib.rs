//! Rein 2D Physics
//!
//! A 2D rigid body physics engine built on hecs and glam.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **physics** - Shapes, collision detection, contact solving, forces and the
//!    [`PhysicsWorld`] that steps them
//! 2. **ecs** - Components stored in a `hecs::World` and spawn helpers
//!
//! Scene data lives in the caller's `hecs::World`; the physics world keeps the
//! registration lists and per-step contact state.

pub mod ecs;
pub mod physics;

// Re-export commonly used types
pub use ecs::prelude::*;

pub use physics::error::{MaterialError, PhysicsError, ShapeError};
pub use physics::math::Dir2;
pub use physics::ray::{Ray2d, RaycastHit};
pub use physics::stepper::FixedTimestep;
pub use physics::{PhysicsConfig, PhysicsWorld};

// Re-export glam and hecs for convenience
pub use glam;
pub use hecs;

//! hecs integration: components and spawn helpers.

pub mod bridge;
pub mod components;

pub mod prelude {
    pub use super::bridge::{despawn, spawn_body, spawn_static};
    pub use super::components::physics::{
        Collider, ContactListener, IgnoreCollisions, PhysicsMaterial, RigidBody, RigidBodyType,
    };
    pub use super::components::transform::Transform2d;
    pub use crate::physics::contact::{
        Collision, CollisionResponse, ContactEvent, ContactEventKind, ContactHandler,
    };
    pub use crate::physics::shape::Shape;
}

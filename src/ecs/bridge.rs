//! Spawn and despawn helpers that keep a `hecs::World` and a [`PhysicsWorld`] in sync.

use crate::ecs::components::physics::{Collider, RigidBody};
use crate::ecs::components::transform::Transform2d;
use crate::physics::error::PhysicsError;
use crate::physics::PhysicsWorld;

/// Spawn an entity with a rigid body and collider and register both.
///
/// The entity is despawned again if registration fails.
pub fn spawn_body(
    world: &mut hecs::World,
    physics: &mut PhysicsWorld,
    transform: Transform2d,
    body: RigidBody,
    collider: Collider,
) -> Result<hecs::Entity, PhysicsError> {
    let entity = world.spawn((transform, body, collider));
    let registered = physics
        .add_body(world, entity)
        .and_then(|()| physics.add_collider(world, entity));

    if let Err(err) = registered {
        physics.remove_body(entity);
        let _ = world.despawn(entity);
        return Err(err);
    }
    Ok(entity)
}

/// Spawn an immovable collider with no rigid body.
pub fn spawn_static(
    world: &mut hecs::World,
    physics: &mut PhysicsWorld,
    transform: Transform2d,
    collider: Collider,
) -> Result<hecs::Entity, PhysicsError> {
    let entity = world.spawn((transform, collider));
    if let Err(err) = physics.add_collider(world, entity) {
        let _ = world.despawn(entity);
        return Err(err);
    }
    Ok(entity)
}

/// Unregister `entity` from physics and despawn it.
///
/// Returns `false` if the entity did not exist.
pub fn despawn(world: &mut hecs::World, physics: &mut PhysicsWorld, entity: hecs::Entity) -> bool {
    physics.remove_collider(entity);
    physics.remove_body(entity);
    world.despawn(entity).is_ok()
}

//! Force generators and the per-world force registry.

use glam::Vec2;

use crate::ecs::components::physics::RigidBody;

/// Something that pushes on rigid bodies once per step, before integration.
pub trait ForceGenerator: Send + Sync {
    fn update_force(&self, body: &mut RigidBody, dt: f32);
}

impl<F> ForceGenerator for F
where
    F: Fn(&mut RigidBody, f32) + Send + Sync,
{
    fn update_force(&self, body: &mut RigidBody, dt: f32) {
        self(body, dt)
    }
}

/// Uniform gravity: `force += gravity * mass` for bodies with `follows_gravity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub gravity: Vec2,
}

impl Gravity {
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }
}

impl ForceGenerator for Gravity {
    fn update_force(&self, body: &mut RigidBody, _dt: f32) {
        if body.follows_gravity && body.is_dynamic() && !body.is_static() {
            body.add_force(self.gravity * body.mass());
        }
    }
}

/// Handle to a generator stored in a [`ForceRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratorId(usize);

/// A (generator, body) pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForceRegistration {
    pub generator: GeneratorId,
    pub entity: hecs::Entity,
}

/// Maps bodies to the generators that act on them.
#[derive(Default)]
pub struct ForceRegistry {
    generators: Vec<Option<Box<dyn ForceGenerator>>>,
    registrations: Vec<ForceRegistration>,
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a generator. It acts on nothing until bodies are registered.
    pub fn add_generator(&mut self, generator: impl ForceGenerator + 'static) -> GeneratorId {
        self.generators.push(Some(Box::new(generator)));
        GeneratorId(self.generators.len() - 1)
    }

    /// Drop a generator and every registration that uses it.
    pub fn remove_generator(&mut self, id: GeneratorId) {
        if let Some(slot) = self.generators.get_mut(id.0) {
            *slot = None;
        }
        self.registrations.retain(|r| r.generator != id);
    }

    /// Swap the generator behind `id`, keeping its registrations.
    ///
    /// Returns `false` if `id` does not refer to a live generator.
    pub fn replace(&mut self, id: GeneratorId, generator: impl ForceGenerator + 'static) -> bool {
        match self.generators.get_mut(id.0) {
            Some(slot) if slot.is_some() => {
                *slot = Some(Box::new(generator));
                true
            }
            _ => false,
        }
    }

    /// Register `entity` with a generator. Duplicate registrations are ignored.
    pub fn register(&mut self, id: GeneratorId, entity: hecs::Entity) {
        if !self.contains_generator(id) || self.is_registered(id, entity) {
            return;
        }
        self.registrations.push(ForceRegistration {
            generator: id,
            entity,
        });
    }

    pub fn unregister(&mut self, id: GeneratorId, entity: hecs::Entity) {
        self.registrations
            .retain(|r| !(r.generator == id && r.entity == entity));
    }

    /// Remove every registration of `entity`.
    pub fn remove_body(&mut self, entity: hecs::Entity) {
        self.registrations.retain(|r| r.entity != entity);
    }

    pub fn is_registered(&self, id: GeneratorId, entity: hecs::Entity) -> bool {
        self.registrations
            .iter()
            .any(|r| r.generator == id && r.entity == entity)
    }

    pub fn contains_generator(&self, id: GeneratorId) -> bool {
        matches!(self.generators.get(id.0), Some(Some(_)))
    }

    pub fn registrations(&self) -> &[ForceRegistration] {
        &self.registrations
    }

    /// Drop all registrations, keeping the generators.
    pub fn clear_registrations(&mut self) {
        self.registrations.clear();
    }

    /// Apply every registered generator to its body.
    ///
    /// Registrations whose entity has no `RigidBody` are skipped.
    pub fn update_forces(&self, world: &mut hecs::World, dt: f32) {
        for registration in &self.registrations {
            let Some(Some(generator)) = self.generators.get(registration.generator.0) else {
                continue;
            };
            if let Ok(mut body) = world.get::<&mut RigidBody>(registration.entity) {
                generator.update_force(&mut body, dt);
            }
        }
    }
}

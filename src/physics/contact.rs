//! Contact data structures and collision callbacks.

use glam::Vec2;

/// A single contact point produced by the narrowphase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// Contact position in world space.
    pub position: Vec2,
    /// Penetration depth at this point.
    pub penetration: f32,
}

/// Contact geometry between two shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionManifold {
    /// Unit contact normal (from shape A to shape B).
    pub normal: Vec2,
    /// Penetration depth along the normal. Zero for touching shapes.
    pub depth: f32,
    /// One or two contact points.
    pub contacts: Vec<ContactPoint>,
}

impl CollisionManifold {
    pub fn new(normal: Vec2, depth: f32, contacts: Vec<ContactPoint>) -> Self {
        Self {
            normal,
            depth: depth.max(0.0),
            contacts,
        }
    }

    /// Single-point manifold.
    pub fn single(normal: Vec2, depth: f32, position: Vec2) -> Self {
        Self::new(
            normal,
            depth,
            vec![ContactPoint {
                position,
                penetration: depth.max(0.0),
            }],
        )
    }

    /// Same contact seen from the other shape.
    pub fn flip(mut self) -> Self {
        self.normal = -self.normal;
        self
    }

    /// Whether the shapes actually interpenetrate (as opposed to touching).
    #[inline]
    pub fn is_penetrating(&self) -> bool {
        self.depth > 0.0
    }
}

/// A manifold tagged with the entities it belongs to.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    pub entity_a: hecs::Entity,
    pub entity_b: hecs::Entity,
    pub manifold: CollisionManifold,
}

/// Returned by collision callbacks to veto solving a pair for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionResponse {
    #[default]
    Resolve,
    /// Skip impulse resolution for this pair for this step only.
    Ignore,
}

/// A collision as seen by one of its participants.
#[derive(Debug, Clone, Copy)]
pub struct Collision<'a> {
    /// The entity receiving the callback.
    pub this: hecs::Entity,
    pub other: hecs::Entity,
    /// Unit normal pointing from `this` toward `other`.
    pub normal: Vec2,
    pub depth: f32,
    pub contacts: &'a [ContactPoint],
}

/// Callbacks delivered to the entity owning a [`ContactListener`].
///
/// [`ContactListener`]: crate::ecs::components::physics::ContactListener
pub trait ContactHandler: Send + Sync + 'static {
    fn on_collision_enter(&mut self, _collision: &Collision<'_>) -> CollisionResponse {
        CollisionResponse::Resolve
    }

    fn on_collision_stay(&mut self, _collision: &Collision<'_>) -> CollisionResponse {
        CollisionResponse::Resolve
    }

    fn on_collision_exit(&mut self, _other: hecs::Entity) {}

    fn on_trigger_enter(&mut self, _other: hecs::Entity) {}

    fn on_trigger_stay(&mut self, _other: hecs::Entity) {}

    fn on_trigger_exit(&mut self, _other: hecs::Entity) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactEventKind {
    CollisionEnter,
    CollisionStay,
    CollisionExit,
    TriggerEnter,
    TriggerStay,
    TriggerExit,
}

impl ContactEventKind {
    pub fn is_trigger(self) -> bool {
        matches!(
            self,
            ContactEventKind::TriggerEnter
                | ContactEventKind::TriggerStay
                | ContactEventKind::TriggerExit
        )
    }
}

/// Record of a dispatched callback, kept until the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub kind: ContactEventKind,
    /// The entity the callback was delivered to.
    pub entity: hecs::Entity,
    pub other: hecs::Entity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_negates_normal_only() {
        let manifold = CollisionManifold::single(Vec2::X, 0.5, Vec2::new(1.0, 2.0));
        let flipped = manifold.clone().flip();
        assert_eq!(flipped.normal, Vec2::NEG_X);
        assert_eq!(flipped.depth, manifold.depth);
        assert_eq!(flipped.contacts, manifold.contacts);
    }

    #[test]
    fn test_negative_depth_is_clamped() {
        let manifold = CollisionManifold::single(Vec2::Y, -1e-7, Vec2::ZERO);
        assert_eq!(manifold.depth, 0.0);
        assert!(!manifold.is_penetrating());
    }

    #[test]
    fn test_default_handler_resolves() {
        struct Silent;
        impl ContactHandler for Silent {}

        let mut world = hecs::World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let collision = Collision {
            this: a,
            other: b,
            normal: Vec2::X,
            depth: 0.1,
            contacts: &[],
        };
        let mut handler = Silent;
        assert_eq!(handler.on_collision_enter(&collision), CollisionResponse::Resolve);
        assert_eq!(handler.on_collision_stay(&collision), CollisionResponse::Resolve);
    }

    #[test]
    fn test_event_kind_classification() {
        assert!(ContactEventKind::TriggerStay.is_trigger());
        assert!(!ContactEventKind::CollisionExit.is_trigger());
    }
}

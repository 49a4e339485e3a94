//! 2D rigid body simulation and collision detection.
//!
//! # Architecture
//!
//! Each call to [`PhysicsWorld::step`] runs this pipeline:
//!
//! 1. Clear transient state (events, manifolds)
//! 2. Broadphase collision detection (AABB overlap)
//! 3. Narrowphase collision detection (SAT, circle and segment tests)
//! 4. Dispatch collision and trigger callbacks
//! 5. Apply forces (force registry, gravity)
//! 6. Integrate forces into velocities
//! 7. Solve contact constraints (sequential impulse + position correction)
//! 8. Integrate velocities
//! 9. Commit transforms
//!
//! The scene owns every component in a `hecs::World`. The physics world only
//! keeps ordered lists of registered entities; per-step state is copied into
//! contiguous solver arrays and written back at the end of the step.

pub mod broadphase;
pub mod collider;
pub mod contact;
pub mod error;
pub mod force;
pub mod math;
pub mod narrowphase;
pub mod ray;
pub mod rigid_body;
pub mod shape;
pub mod solver;
pub mod stepper;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::ecs::components::physics::{
    Collider, ContactListener, IgnoreCollisions, PhysicsMaterial, RigidBody,
};
use crate::ecs::components::transform::Transform2d;

use self::broadphase::{AabbBroadphase, BroadphaseProxy};
use self::contact::{
    Collision, CollisionManifold, CollisionResponse, ContactEvent, ContactEventKind,
    ContactManifold,
};
use self::error::PhysicsError;
use self::force::{ForceGenerator, ForceRegistry, GeneratorId, Gravity};
use self::narrowphase::detect_collision;
use self::ray::{Ray2d, RaycastHit};
use self::shape::WorldShape;
use self::solver::{SolverBody, SolverContact};

/// Configuration for the physics simulation.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector. Default: (0, -9.81).
    pub gravity: Vec2,
    /// Number of impulse iterations per step. Default: 8.
    pub solver_iterations: u32,
    /// Penetration left uncorrected to keep resting contacts alive. Default: 0.01.
    pub penetration_slop: f32,
    /// Fraction of the remaining penetration removed per step. Default: 0.8.
    pub correction_percent: f32,
    /// Largest positional correction applied to a pair per step. Default: 0.2.
    pub max_correction: f32,
    /// Approach speed below which contacts are treated as inelastic. Default: 0.5.
    pub restitution_threshold: f32,
    /// Largest distance a body may travel in one step. Default: 2.0.
    pub max_translation: f32,
    /// Largest angle (radians) a body may turn in one step. Default: π/2.
    pub max_rotation: f32,
    /// Largest normal impulse applied at a single contact. Default: 1e6.
    pub max_impulse: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            solver_iterations: 8,
            penetration_slop: 0.01,
            correction_percent: 0.8,
            max_correction: 0.2,
            restitution_threshold: 0.5,
            max_translation: 2.0,
            max_rotation: std::f32::consts::FRAC_PI_2,
            max_impulse: 1e6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PairKind {
    Collision,
    Trigger,
}

/// Unordered entity pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey(hecs::Entity, hecs::Entity);

impl PairKey {
    fn new(a: hecs::Entity, b: hecs::Entity) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// A pair that was touching at the end of a step.
#[derive(Debug, Clone, Copy)]
struct ActivePair {
    entity_a: hecs::Entity,
    entity_b: hecs::Entity,
    kind: PairKind,
    notify_a: bool,
    notify_b: bool,
}

impl ActivePair {
    fn key(&self) -> PairKey {
        PairKey::new(self.entity_a, self.entity_b)
    }

    fn involves(&self, entity: hecs::Entity) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }
}

/// A collider posed for the current step.
struct PosedCollider {
    entity: hecs::Entity,
    transform: Transform2d,
    shape: WorldShape,
    material: Arc<PhysicsMaterial>,
    is_trigger: bool,
}

/// The main physics world managing simulation state.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    broadphase: AabbBroadphase,
    bodies: Vec<hecs::Entity>,
    colliders: Vec<hecs::Entity>,
    forces: ForceRegistry,
    gravity: GeneratorId,
    /// Manifolds handed to the solver during the last step.
    contacts: Vec<ContactManifold>,
    active_pairs: Vec<ActivePair>,
    active_keys: HashSet<PairKey>,
    /// Exits owed to survivors of removed colliders.
    pending_exits: Vec<ActivePair>,
    events: Vec<ContactEvent>,
}

impl PhysicsWorld {
    /// Create a new physics world with the given configuration.
    pub fn new(config: PhysicsConfig) -> Self {
        let mut forces = ForceRegistry::new();
        let gravity = forces.add_generator(Gravity::new(config.gravity));
        Self {
            config,
            broadphase: AabbBroadphase::new(),
            bodies: Vec::new(),
            colliders: Vec::new(),
            forces,
            gravity,
            contacts: Vec::new(),
            active_pairs: Vec::new(),
            active_keys: HashSet::new(),
            pending_exits: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Change gravity for every gravity-following body.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.config.gravity = gravity;
        self.forces.replace(self.gravity, Gravity::new(gravity));
    }

    /// Handle of the built-in gravity generator.
    pub fn gravity_generator(&self) -> GeneratorId {
        self.gravity
    }

    pub fn forces(&self) -> &ForceRegistry {
        &self.forces
    }

    pub fn forces_mut(&mut self) -> &mut ForceRegistry {
        &mut self.forces
    }

    /// Add a custom force generator. Register bodies with it through
    /// [`register_force`](Self::register_force).
    pub fn add_force_generator(&mut self, generator: impl ForceGenerator + 'static) -> GeneratorId {
        self.forces.add_generator(generator)
    }

    /// Register a body with a generator.
    ///
    /// Returns `false` without registering if `entity` was never added with
    /// [`add_body`](Self::add_body); its accumulators would never be cleared.
    pub fn register_force(&mut self, generator: GeneratorId, entity: hecs::Entity) -> bool {
        if !self.bodies.contains(&entity) {
            warn!(?entity, "ignoring force registration for unregistered body");
            return false;
        }
        self.forces.register(generator, entity);
        self.forces.is_registered(generator, entity)
    }

    pub fn bodies(&self) -> &[hecs::Entity] {
        &self.bodies
    }

    pub fn colliders(&self) -> &[hecs::Entity] {
        &self.colliders
    }

    /// Manifolds that were solved during the last step.
    pub fn contacts(&self) -> &[ContactManifold] {
        &self.contacts
    }

    /// Callbacks dispatched during the last step, in dispatch order.
    pub fn events(&self) -> &[ContactEvent] {
        &self.events
    }

    /// Register a rigid body. The entity needs `Transform2d` and `RigidBody`.
    ///
    /// Registering twice is a no-op.
    pub fn add_body(
        &mut self,
        world: &mut hecs::World,
        entity: hecs::Entity,
    ) -> Result<(), PhysicsError> {
        require::<Transform2d>(world, entity, "Transform2d")?;
        require::<RigidBody>(world, entity, "RigidBody")?;
        if self.bodies.contains(&entity) {
            return Ok(());
        }

        let dynamic = world
            .get::<&RigidBody>(entity)
            .map(|body| body.is_dynamic())
            .unwrap_or(false);

        self.bodies.push(entity);
        // The gravity generator checks `follows_gravity` every step.
        if dynamic {
            self.forces.register(self.gravity, entity);
        }
        refresh_mass_properties(world, entity);

        debug!(?entity, dynamic, "registered rigid body");
        Ok(())
    }

    /// Unregister a rigid body and its force registrations. Unknown entities are ignored.
    pub fn remove_body(&mut self, entity: hecs::Entity) {
        let before = self.bodies.len();
        self.bodies.retain(|e| *e != entity);
        self.forces.remove_body(entity);
        if self.bodies.len() != before {
            debug!(?entity, "removed rigid body");
        }
    }

    /// Register a collider. The entity needs `Transform2d` and `Collider`.
    ///
    /// A collider without a `RigidBody` is static. Registering twice is a no-op.
    pub fn add_collider(
        &mut self,
        world: &mut hecs::World,
        entity: hecs::Entity,
    ) -> Result<(), PhysicsError> {
        require::<Transform2d>(world, entity, "Transform2d")?;
        require::<Collider>(world, entity, "Collider")?;
        if self.colliders.contains(&entity) {
            return Ok(());
        }

        if let Ok(collider) = world.get::<&Collider>(entity) {
            collider.shape.validate()?;
            collider.material.validate()?;
        }

        if world.get::<&RigidBody>(entity).is_err() {
            warn!(?entity, "collider has no rigid body; treating it as static");
        }

        self.colliders.push(entity);
        refresh_mass_properties(world, entity);

        debug!(?entity, "registered collider");
        Ok(())
    }

    /// Unregister a collider. Pairs it was touching report an exit to the
    /// other side during the next step. Unknown entities are ignored.
    pub fn remove_collider(&mut self, entity: hecs::Entity) {
        let before = self.colliders.len();
        self.colliders.retain(|e| *e != entity);
        if self.colliders.len() == before {
            return;
        }

        let mut kept = Vec::with_capacity(self.active_pairs.len());
        for mut pair in self.active_pairs.drain(..) {
            if pair.involves(entity) {
                self.active_keys.remove(&pair.key());
                if pair.entity_a == entity {
                    pair.notify_a = false;
                } else {
                    pair.notify_b = false;
                }
                self.pending_exits.push(pair);
            } else {
                kept.push(pair);
            }
        }
        self.active_pairs = kept;

        debug!(?entity, "removed collider");
    }

    /// Drop every registration, contact and event.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.colliders.clear();
        self.forces.clear_registrations();
        self.contacts.clear();
        self.active_pairs.clear();
        self.active_keys.clear();
        self.pending_exits.clear();
        self.events.clear();
    }

    /// Advance the simulation by exactly `dt` seconds.
    ///
    /// Non-positive or non-finite timesteps are ignored.
    pub fn step(&mut self, world: &mut hecs::World, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            warn!(dt, "ignoring physics step with invalid timestep");
            return;
        }

        // 1. Clear transient state
        self.events.clear();
        self.contacts.clear();

        // 2. Broadphase collision detection
        let (posed, proxies) = self.pose_colliders(world);
        let pairs = self.broadphase.find_pairs(&proxies);

        // 3. Narrowphase collision detection
        let mut detected = Vec::new();
        for (i, j) in pairs {
            if let Some(manifold) = detect_collision(&posed[i].shape, &posed[j].shape) {
                trace!(
                    entity_a = ?posed[i].entity,
                    entity_b = ?posed[j].entity,
                    depth = manifold.depth,
                    points = manifold.contacts.len(),
                    "contact"
                );
                detected.push((i, j, manifold));
            }
        }

        // 4. Dispatch callbacks
        let mut solve_queue = Vec::new();
        let mut current_pairs = Vec::with_capacity(detected.len());
        let mut current_keys = HashSet::with_capacity(detected.len());
        for (i, j, manifold) in detected {
            let (a, b) = (&posed[i], &posed[j]);
            let key = PairKey::new(a.entity, b.entity);
            let entered = !self.active_keys.contains(&key);

            if a.is_trigger || b.is_trigger {
                let notify_a = !a.is_trigger || b.is_trigger;
                let notify_b = !b.is_trigger || a.is_trigger;
                let kind = if entered {
                    ContactEventKind::TriggerEnter
                } else {
                    ContactEventKind::TriggerStay
                };
                if notify_a {
                    self.notify_trigger(world, kind, a.entity, b.entity);
                }
                if notify_b {
                    self.notify_trigger(world, kind, b.entity, a.entity);
                }
                current_pairs.push(ActivePair {
                    entity_a: a.entity,
                    entity_b: b.entity,
                    kind: PairKind::Trigger,
                    notify_a,
                    notify_b,
                });
            } else {
                let response = self.notify_collision(world, a.entity, b.entity, &manifold, entered);
                current_pairs.push(ActivePair {
                    entity_a: a.entity,
                    entity_b: b.entity,
                    kind: PairKind::Collision,
                    notify_a: true,
                    notify_b: true,
                });
                if response == CollisionResponse::Ignore {
                    trace!(entity_a = ?a.entity, entity_b = ?b.entity, "collision ignored by callback");
                } else if manifold.is_penetrating() {
                    solve_queue.push((i, j, manifold));
                }
            }
            current_keys.insert(key);
        }

        let previous = std::mem::replace(&mut self.active_pairs, current_pairs);
        self.active_keys = current_keys;
        for pair in previous {
            if !self.active_keys.contains(&pair.key()) {
                self.notify_exit(world, &pair);
            }
        }
        for pair in std::mem::take(&mut self.pending_exits) {
            self.notify_exit(world, &pair);
        }

        // 5. Apply forces
        self.forces.update_forces(world, dt);

        // 6. Integrate forces
        for &entity in &self.bodies {
            if let Ok(mut body) = world.get::<&mut RigidBody>(entity) {
                rigid_body::integrate_forces(&mut body, dt);
            }
        }

        // 7. Solve contact constraints
        let mut solver_bodies = Vec::with_capacity(self.bodies.len());
        let mut slots = HashMap::with_capacity(self.bodies.len());
        for &entity in &self.bodies {
            let (Ok(body), Ok(transform)) = (
                world.get::<&RigidBody>(entity),
                world.get::<&Transform2d>(entity),
            ) else {
                continue;
            };
            slots.insert(entity, solver_bodies.len());
            solver_bodies.push(SolverBody::from_body(&body, &transform));
        }

        let mut solver_contacts = Vec::with_capacity(solve_queue.len());
        for (i, j, manifold) in solve_queue {
            let (a, b) = (&posed[i], &posed[j]);
            let body_a = slot_of(a, &mut slots, &mut solver_bodies);
            let body_b = slot_of(b, &mut slots, &mut solver_bodies);
            solver_contacts.push(SolverContact {
                body_a,
                body_b,
                normal: manifold.normal,
                depth: manifold.depth,
                contacts: manifold.contacts.clone(),
                material: PhysicsMaterial::combine(&a.material, &b.material),
            });
            self.contacts.push(ContactManifold {
                entity_a: a.entity,
                entity_b: b.entity,
                manifold,
            });
        }
        solver::solve_contacts(&solver_contacts, &mut solver_bodies, &self.config);

        // 8. Integrate velocities
        for body in &mut solver_bodies {
            rigid_body::integrate_velocity(body, dt, &self.config);
        }

        // 9. Commit transforms
        for &entity in &self.bodies {
            let Some(state) = slots.get(&entity).and_then(|slot| solver_bodies.get(*slot)) else {
                continue;
            };
            if !state.integrate {
                continue;
            }
            if let Ok(mut body) = world.get::<&mut RigidBody>(entity) {
                body.linear_velocity = state.linear_velocity;
                body.angular_velocity = state.angular_velocity;
            }
            if let Ok(mut transform) = world.get::<&mut Transform2d>(entity) {
                transform.position = state.position;
                transform.rotation = state.rotation;
            }
        }

        debug!(
            bodies = self.bodies.len(),
            colliders = posed.len(),
            touching = self.active_pairs.len(),
            solved = self.contacts.len(),
            events = self.events.len(),
            "physics step"
        );
    }

    /// Closest non-trigger collider hit by `ray` within `max_distance`.
    pub fn raycast(
        &self,
        world: &hecs::World,
        ray: Ray2d,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        self.raycast_filtered(world, ray, max_distance, |_| true)
    }

    /// Like [`raycast`](Self::raycast), skipping entities rejected by `filter`.
    pub fn raycast_filtered(
        &self,
        world: &hecs::World,
        ray: Ray2d,
        max_distance: f32,
        mut filter: impl FnMut(hecs::Entity) -> bool,
    ) -> Option<RaycastHit> {
        let mut best: Option<RaycastHit> = None;

        for &entity in &self.colliders {
            if !filter(entity) {
                continue;
            }
            let (Ok(collider), Ok(transform)) = (
                world.get::<&Collider>(entity),
                world.get::<&Transform2d>(entity),
            ) else {
                continue;
            };
            if collider.is_trigger {
                continue;
            }

            let limit = best.map_or(max_distance, |hit| hit.distance);
            let shape = collider.world_shape(&transform);
            if shape.aabb().cast_ray(&ray, limit).is_none() {
                continue;
            }
            if let Some(hit) = shape.cast_ray(&ray, limit) {
                if best.map_or(true, |b| hit.distance < b.distance) {
                    best = Some(RaycastHit::new(entity, hit));
                }
            }
        }

        best
    }

    fn pose_colliders(&self, world: &hecs::World) -> (Vec<PosedCollider>, Vec<BroadphaseProxy>) {
        let mut posed = Vec::with_capacity(self.colliders.len());
        let mut proxies = Vec::with_capacity(self.colliders.len());

        for &entity in &self.colliders {
            let (Ok(collider), Ok(transform)) = (
                world.get::<&Collider>(entity),
                world.get::<&Transform2d>(entity),
            ) else {
                trace!(?entity, "skipping collider without components");
                continue;
            };

            let is_static = !self.bodies.contains(&entity)
                || world
                    .get::<&RigidBody>(entity)
                    .map(|body| body.is_static())
                    .unwrap_or(true);
            let shape = collider.world_shape(&transform);

            proxies.push(BroadphaseProxy {
                entity,
                aabb: shape.aabb(),
                is_static,
                ignore_collisions: world.get::<&IgnoreCollisions>(entity).is_ok(),
            });
            posed.push(PosedCollider {
                entity,
                transform: *transform,
                shape,
                material: Arc::clone(&collider.material),
                is_trigger: collider.is_trigger,
            });
        }

        (posed, proxies)
    }

    fn record(&mut self, world: &hecs::World, kind: ContactEventKind, entity: hecs::Entity, other: hecs::Entity) {
        if world.contains(entity) {
            self.events.push(ContactEvent {
                kind,
                entity,
                other,
            });
        }
    }

    /// Deliver enter/stay to both sides. Either side may veto solving.
    fn notify_collision(
        &mut self,
        world: &mut hecs::World,
        entity_a: hecs::Entity,
        entity_b: hecs::Entity,
        manifold: &CollisionManifold,
        entered: bool,
    ) -> CollisionResponse {
        let kind = if entered {
            ContactEventKind::CollisionEnter
        } else {
            ContactEventKind::CollisionStay
        };

        let mut response = CollisionResponse::Resolve;
        for (this, other, normal) in [
            (entity_a, entity_b, manifold.normal),
            (entity_b, entity_a, -manifold.normal),
        ] {
            let collision = Collision {
                this,
                other,
                normal,
                depth: manifold.depth,
                contacts: &manifold.contacts,
            };
            if let Ok(mut listener) = world.get::<&mut ContactListener>(this) {
                let answer = if entered {
                    listener.0.on_collision_enter(&collision)
                } else {
                    listener.0.on_collision_stay(&collision)
                };
                if answer == CollisionResponse::Ignore {
                    response = CollisionResponse::Ignore;
                }
            }
            self.record(world, kind, this, other);
        }
        response
    }

    fn notify_trigger(
        &mut self,
        world: &mut hecs::World,
        kind: ContactEventKind,
        this: hecs::Entity,
        other: hecs::Entity,
    ) {
        if let Ok(mut listener) = world.get::<&mut ContactListener>(this) {
            match kind {
                ContactEventKind::TriggerEnter => listener.0.on_trigger_enter(other),
                ContactEventKind::TriggerStay => listener.0.on_trigger_stay(other),
                _ => listener.0.on_trigger_exit(other),
            }
        }
        self.record(world, kind, this, other);
    }

    fn notify_exit(&mut self, world: &mut hecs::World, pair: &ActivePair) {
        let receivers = [
            (pair.notify_a, pair.entity_a, pair.entity_b),
            (pair.notify_b, pair.entity_b, pair.entity_a),
        ];
        for (notify, this, other) in receivers {
            if !notify {
                continue;
            }
            match pair.kind {
                PairKind::Trigger => {
                    self.notify_trigger(world, ContactEventKind::TriggerExit, this, other);
                }
                PairKind::Collision => {
                    if let Ok(mut listener) = world.get::<&mut ContactListener>(this) {
                        listener.0.on_collision_exit(other);
                    }
                    self.record(world, ContactEventKind::CollisionExit, this, other);
                }
            }
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

/// Check that `entity` exists and carries `T`.
fn require<T: hecs::Component>(
    world: &hecs::World,
    entity: hecs::Entity,
    component: &'static str,
) -> Result<(), PhysicsError> {
    match world.get::<&T>(entity) {
        Ok(_) => Ok(()),
        Err(hecs::ComponentError::NoSuchEntity) => Err(PhysicsError::NoSuchEntity(entity)),
        Err(hecs::ComponentError::MissingComponent(_)) => {
            Err(PhysicsError::MissingComponent { entity, component })
        }
    }
}

fn refresh_mass_properties(world: &mut hecs::World, entity: hecs::Entity) {
    if let Ok((body, collider, transform)) =
        world.query_one_mut::<(&mut RigidBody, &Collider, &Transform2d)>(entity)
    {
        rigid_body::update_mass_properties(body, collider, transform);
    }
}

/// Solver slot for a collider's owner, adding an immovable slot for static colliders.
fn slot_of(
    collider: &PosedCollider,
    slots: &mut HashMap<hecs::Entity, usize>,
    bodies: &mut Vec<SolverBody>,
) -> usize {
    *slots.entry(collider.entity).or_insert_with(|| {
        bodies.push(SolverBody::fixed(&collider.transform));
        bodies.len() - 1
    })
}

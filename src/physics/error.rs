//! Error types for the physics core.
//!
//! Only construction-time misuse is reported as an error. Numeric
//! degeneracies met during a step are resolved locally and never surface
//! here.

use thiserror::Error;

/// Invalid geometry passed to a shape constructor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Circle radius is zero or negative.
    #[error("circle radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    /// Box half extents are zero or negative.
    #[error("box half extents must be positive, got ({0}, {1})")]
    NonPositiveExtents(f32, f32),

    /// A coordinate is NaN or infinite.
    #[error("shape contains a non-finite value")]
    NonFiniteValue,

    /// Polygon has fewer than three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// Polygon has (near) zero area or repeated vertices.
    #[error("polygon is degenerate (zero area or repeated vertices)")]
    DegeneratePolygon,

    /// Polygon is not convex.
    #[error("polygon is not convex (reflex turn at vertex {0})")]
    NonConvexPolygon(usize),

    /// Edge endpoints coincide.
    #[error("edge endpoints coincide")]
    DegenerateEdge,
}

/// Invalid physics material coefficients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f32 },
}

/// Errors returned by [`PhysicsWorld`](super::PhysicsWorld) registration.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// The entity does not exist in the ECS world.
    #[error("entity {0:?} does not exist")]
    NoSuchEntity(hecs::Entity),

    /// The entity lacks a component required for registration.
    #[error("entity {entity:?} has no {component} component")]
    MissingComponent {
        entity: hecs::Entity,
        component: &'static str,
    },

    /// Invalid shape geometry.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Invalid material coefficients.
    #[error(transparent)]
    Material(#[from] MaterialError),
}

//! Collision shape primitives.
//!
//! [`Shape`] holds local-space geometry and is validated once at
//! construction. Before collision queries a shape is posed with the owning
//! entity's [`Transform2d`], producing a [`WorldShape`] whose queries
//! (support point, vertices, normals, area, containment, bounds) are all in
//! world space.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::ecs::components::transform::Transform2d;

use super::collider::Aabb;
use super::error::ShapeError;
use super::math::{closest_point_on_segment, cross, edge_normal, Dir2, EPSILON};

/// Convex, counter-clockwise polygon in local space.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl Polygon {
    /// Validate and build a polygon.
    ///
    /// Clockwise input is reversed to counter-clockwise. Fewer than three
    /// vertices, repeated vertices, zero area and reflex corners are
    /// rejected.
    pub fn new(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        let mut vertices = vertices;
        if vertices.len() < 3 {
            return Err(ShapeError::TooFewVertices(vertices.len()));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(ShapeError::NonFiniteValue);
        }

        let n = vertices.len();
        for i in 0..n {
            if vertices[i].distance_squared(vertices[(i + 1) % n]) <= EPSILON * EPSILON {
                return Err(ShapeError::DegeneratePolygon);
            }
        }

        let signed_area = signed_area(&vertices);
        if signed_area.abs() <= EPSILON {
            return Err(ShapeError::DegeneratePolygon);
        }
        if signed_area < 0.0 {
            vertices.reverse();
        }

        // Every corner must turn left, and the turns must add up to a single
        // revolution (rules out self-intersecting stars).
        let mut total_turn = 0.0;
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let c = vertices[(i + 2) % n];
            let e1 = b - a;
            let e2 = c - b;
            let turn = cross(e1, e2);
            if turn < -EPSILON * e1.length() * e2.length() {
                return Err(ShapeError::NonConvexPolygon((i + 1) % n));
            }
            total_turn += turn.atan2(e1.dot(e2));
        }
        if total_turn > TAU + 1e-3 {
            return Err(ShapeError::NonConvexPolygon(0));
        }

        let normals = compute_normals(&vertices);
        Ok(Self { vertices, normals })
    }

    /// Axis-aligned box centered on the local origin.
    pub fn rectangle(half_extents: Vec2) -> Result<Self, ShapeError> {
        if !half_extents.is_finite() {
            return Err(ShapeError::NonFiniteValue);
        }
        if half_extents.x <= 0.0 || half_extents.y <= 0.0 {
            return Err(ShapeError::NonPositiveExtents(half_extents.x, half_extents.y));
        }
        let h = half_extents;
        Self::new(vec![
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ])
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn area(&self) -> f32 {
        signed_area(&self.vertices)
    }
}

/// Local-space collision geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Polygon(Polygon),
    Edge { start: Vec2, end: Vec2 },
}

/// Discriminant of [`Shape`], handy for logging and benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Polygon,
    Edge,
}

impl Shape {
    pub fn circle(radius: f32) -> Result<Self, ShapeError> {
        if !radius.is_finite() {
            return Err(ShapeError::NonFiniteValue);
        }
        if radius <= 0.0 {
            return Err(ShapeError::NonPositiveRadius(radius));
        }
        Ok(Self::Circle { radius })
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, ShapeError> {
        Polygon::new(vertices).map(Self::Polygon)
    }

    /// Box as a 4-vertex polygon centered on the local origin.
    pub fn rectangle(half_extents: Vec2) -> Result<Self, ShapeError> {
        Polygon::rectangle(half_extents).map(Self::Polygon)
    }

    pub fn edge(start: Vec2, end: Vec2) -> Result<Self, ShapeError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ShapeError::NonFiniteValue);
        }
        if start.distance_squared(end) <= EPSILON * EPSILON {
            return Err(ShapeError::DegenerateEdge);
        }
        Ok(Self::Edge { start, end })
    }

    /// Re-check a shape built directly from its variants.
    pub fn validate(&self) -> Result<(), ShapeError> {
        match *self {
            Shape::Circle { radius } => Self::circle(radius).map(drop),
            Shape::Edge { start, end } => Self::edge(start, end).map(drop),
            Shape::Polygon(_) => Ok(()),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Edge { .. } => ShapeKind::Edge,
        }
    }

    /// Unscaled local-space area.
    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle { radius } => PI * radius * radius,
            Shape::Polygon(polygon) => polygon.area(),
            Shape::Edge { .. } => 0.0,
        }
    }

    /// Pose the shape in world space. `offset` is applied in local space
    /// before the transform.
    pub fn to_world(&self, transform: &Transform2d, offset: Vec2) -> WorldShape {
        match self {
            Shape::Circle { radius } => WorldShape::Circle(WorldCircle {
                center: transform.transform_point(offset),
                radius: radius * transform.max_scale(),
            }),
            Shape::Polygon(polygon) => {
                let mut vertices: Vec<Vec2> = polygon
                    .vertices
                    .iter()
                    .map(|v| transform.transform_point(*v + offset))
                    .collect();
                if transform.is_mirrored() {
                    vertices.reverse();
                }
                let normals = compute_normals(&vertices);
                WorldShape::Polygon(WorldPolygon { vertices, normals })
            }
            Shape::Edge { start, end } => WorldShape::Edge(WorldEdge::new(
                transform.transform_point(*start + offset),
                transform.transform_point(*end + offset),
            )),
        }
    }

    /// Moment of inertia about the entity origin for the given mass,
    /// accounting for the transform's scale and the collider offset.
    pub fn moment_of_inertia(&self, mass: f32, scale: Vec2, offset: Vec2) -> f32 {
        let local = Transform2d {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale,
        };
        self.to_world(&local, offset).moment_of_inertia(mass, Vec2::ZERO)
    }
}

/// Circle posed in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldCircle {
    pub center: Vec2,
    pub radius: f32,
}

/// Polygon posed in world space (counter-clockwise, outward normals).
#[derive(Debug, Clone, PartialEq)]
pub struct WorldPolygon {
    pub vertices: Vec<Vec2>,
    pub normals: Vec<Vec2>,
}

/// Line segment posed in world space.
///
/// Stored as a two-sided hull: face 0 runs `start -> end` with the
/// right-hand normal, face 1 runs back with the opposite normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldEdge {
    pub vertices: [Vec2; 2],
    pub normals: [Vec2; 2],
}

impl WorldEdge {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        // A collapsed edge (zero scale) still needs some normal.
        let normal = edge_normal(start, end).unwrap_or(Vec2::Y);
        Self {
            vertices: [start, end],
            normals: [normal, -normal],
        }
    }

    #[inline]
    pub fn start(&self) -> Vec2 {
        self.vertices[0]
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.vertices[1]
    }

    /// Right-hand normal of `start -> end`.
    #[inline]
    pub fn normal(&self) -> Vec2 {
        self.normals[0]
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.vertices[0] + self.vertices[1]) * 0.5
    }

    pub fn length(&self) -> f32 {
        self.vertices[0].distance(self.vertices[1])
    }
}

/// A shape posed in world space.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldShape {
    Circle(WorldCircle),
    Polygon(WorldPolygon),
    Edge(WorldEdge),
}

impl WorldShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            WorldShape::Circle(_) => ShapeKind::Circle,
            WorldShape::Polygon(_) => ShapeKind::Polygon,
            WorldShape::Edge(_) => ShapeKind::Edge,
        }
    }

    /// Farthest point of the shape along `direction`.
    pub fn support_point(&self, direction: Dir2) -> Vec2 {
        let d = direction.as_vec2();
        match self {
            WorldShape::Circle(c) => c.center + d * c.radius,
            WorldShape::Polygon(p) => support(&p.vertices, d),
            WorldShape::Edge(e) => support(&e.vertices, d),
        }
    }

    /// World-space vertices. Circles have none.
    pub fn vertices(&self) -> &[Vec2] {
        match self {
            WorldShape::Circle(_) => &[],
            WorldShape::Polygon(p) => &p.vertices,
            WorldShape::Edge(e) => &e.vertices,
        }
    }

    /// Outward face normals, one per face. Circles have none.
    pub fn normals(&self) -> &[Vec2] {
        match self {
            WorldShape::Circle(_) => &[],
            WorldShape::Polygon(p) => &p.normals,
            WorldShape::Edge(e) => &e.normals,
        }
    }

    pub fn area(&self) -> f32 {
        match self {
            WorldShape::Circle(c) => PI * c.radius * c.radius,
            WorldShape::Polygon(p) => signed_area(&p.vertices),
            WorldShape::Edge(_) => 0.0,
        }
    }

    pub fn centroid(&self) -> Vec2 {
        match self {
            WorldShape::Circle(c) => c.center,
            WorldShape::Polygon(p) => polygon_centroid(&p.vertices),
            WorldShape::Edge(e) => e.midpoint(),
        }
    }

    /// Inclusive point containment. Edges contain points within [`EPSILON`]
    /// of the segment.
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            WorldShape::Circle(c) => c.center.distance_squared(point) <= c.radius * c.radius,
            WorldShape::Polygon(p) => p
                .vertices
                .iter()
                .zip(&p.normals)
                .all(|(v, n)| n.dot(point - *v) <= EPSILON),
            WorldShape::Edge(e) => {
                let (closest, _) = closest_point_on_segment(e.start(), e.end(), point);
                closest.distance_squared(point) <= EPSILON * EPSILON
            }
        }
    }

    /// Minimum axis-aligned bounding box.
    pub fn aabb(&self) -> Aabb {
        match self {
            WorldShape::Circle(c) => Aabb {
                min: c.center - Vec2::splat(c.radius),
                max: c.center + Vec2::splat(c.radius),
            },
            WorldShape::Polygon(p) => Aabb::from_points(&p.vertices),
            WorldShape::Edge(e) => Aabb::from_points(&e.vertices),
        }
    }

    /// Moment of inertia about `origin` for a uniform body of `mass`.
    pub fn moment_of_inertia(&self, mass: f32, origin: Vec2) -> f32 {
        match self {
            WorldShape::Circle(c) => {
                0.5 * mass * c.radius * c.radius + mass * c.center.distance_squared(origin)
            }
            WorldShape::Polygon(p) => {
                let area = signed_area(&p.vertices);
                if area <= EPSILON {
                    return 0.0;
                }
                // Sum of triangles fanned from `origin`.
                let density = mass / area;
                let n = p.vertices.len();
                let mut inertia = 0.0;
                for i in 0..n {
                    let e1 = p.vertices[i] - origin;
                    let e2 = p.vertices[(i + 1) % n] - origin;
                    let d = cross(e1, e2);
                    let intx2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
                    let inty2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
                    inertia += (0.25 / 3.0) * d * (intx2 + inty2);
                }
                density * inertia
            }
            WorldShape::Edge(e) => {
                let length = e.length();
                mass * length * length / 12.0 + mass * e.midpoint().distance_squared(origin)
            }
        }
    }
}

impl WorldPolygon {
    /// Closest point on the polygon boundary to `point`, with its distance.
    ///
    /// Every edge is tested, so the result is exact for rotated polygons.
    pub fn closest_boundary_point(&self, point: Vec2) -> (Vec2, f32) {
        let n = self.vertices.len();
        let mut best = self.vertices[0];
        let mut best_dist_sq = f32::MAX;
        for i in 0..n {
            let (candidate, _) =
                closest_point_on_segment(self.vertices[i], self.vertices[(i + 1) % n], point);
            let dist_sq = candidate.distance_squared(point);
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best = candidate;
            }
        }
        (best, best_dist_sq.sqrt())
    }
}

fn support(vertices: &[Vec2], direction: Vec2) -> Vec2 {
    let mut best = vertices[0];
    let mut best_dot = best.dot(direction);
    for v in &vertices[1..] {
        let d = v.dot(direction);
        if d > best_dot {
            best_dot = d;
            best = *v;
        }
    }
    best
}

fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        twice_area += cross(vertices[i], vertices[(i + 1) % n]);
    }
    twice_area * 0.5
}

fn polygon_centroid(vertices: &[Vec2]) -> Vec2 {
    let n = vertices.len();
    let origin = vertices[0];
    let mut weighted = Vec2::ZERO;
    let mut area = 0.0;
    for i in 1..n - 1 {
        let e1 = vertices[i] - origin;
        let e2 = vertices[i + 1] - origin;
        let tri_area = 0.5 * cross(e1, e2);
        weighted += (e1 + e2) * (tri_area / 3.0);
        area += tri_area;
    }
    if area.abs() <= EPSILON {
        return origin;
    }
    origin + weighted / area
}

fn compute_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    (0..n)
        .map(|i| edge_normal(vertices[i], vertices[(i + 1) % n]).unwrap_or(Vec2::Y))
        .collect()
}

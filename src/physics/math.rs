//! 2D math helpers shared by the collision pipeline.
//!
//! Vectors and rotation matrices come from `glam`; this module adds the
//! small pieces glam does not provide: a unit-direction type, 1D intervals
//! for SAT projections, scalar cross products and segment queries.

use glam::{Mat2, Vec2};

/// Tolerance used by every epsilon-guarded branch in the physics core.
pub const EPSILON: f32 = 1e-6;

/// 2D cross product (z component of the 3D cross product).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Cross product of a scalar (angular velocity) and a vector: `w × r`.
#[inline]
pub fn cross_sv(w: f32, r: Vec2) -> Vec2 {
    Vec2::new(-w * r.y, w * r.x)
}

/// Outward normal of the edge `a -> b` for counter-clockwise winding.
///
/// This is the edge direction rotated 90° clockwise. Returns `None` for a
/// zero-length edge.
#[inline]
pub fn edge_normal(a: Vec2, b: Vec2) -> Option<Vec2> {
    let e = b - a;
    Vec2::new(e.y, -e.x).try_normalize()
}

/// Rotation matrix for an angle in radians.
#[inline]
pub fn rotation(angle: f32) -> Mat2 {
    Mat2::from_angle(angle)
}

/// A unit-length direction.
///
/// Construction fails for zero-length or non-finite input, so code that
/// receives a `Dir2` never has to handle a degenerate direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dir2(Vec2);

impl Dir2 {
    pub const X: Self = Self(Vec2::X);
    pub const Y: Self = Self(Vec2::Y);
    pub const NEG_X: Self = Self(Vec2::NEG_X);
    pub const NEG_Y: Self = Self(Vec2::NEG_Y);

    /// Normalize `v` into a direction.
    pub fn new(v: Vec2) -> Option<Self> {
        v.try_normalize().map(Self)
    }

    /// Direction for an angle in radians, measured from +X.
    pub fn from_angle(angle: f32) -> Self {
        Self(Vec2::from_angle(angle))
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        self.0
    }
}

impl std::ops::Neg for Dir2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl From<Dir2> for Vec2 {
    fn from(dir: Dir2) -> Vec2 {
        dir.0
    }
}

/// Closed 1D interval, used for projections onto a separating axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Project a point set onto `axis`.
    ///
    /// An empty point set yields an empty (inverted) interval.
    pub fn project(points: &[Vec2], axis: Vec2) -> Self {
        let mut interval = Self::new(f32::MAX, f32::MIN);
        for p in points {
            let d = p.dot(axis);
            interval.min = interval.min.min(d);
            interval.max = interval.max.max(d);
        }
        interval
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive overlap test: intervals that share an endpoint overlap.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Minimum translation along the axis that separates the intervals.
    ///
    /// Positive values push `other` toward +axis, negative values toward
    /// -axis. `None` when the intervals are disjoint.
    pub fn penetration(&self, other: &Interval) -> Option<f32> {
        if !self.overlaps(other) {
            return None;
        }
        let forward = self.max - other.min;
        let backward = other.max - self.min;
        if forward <= backward {
            Some(forward)
        } else {
            Some(-backward)
        }
    }
}

/// Result of intersecting two line segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// The segments do not touch.
    None,
    /// Single intersection point with the parameters along each segment.
    Point { point: Vec2, t: f32, u: f32 },
    /// Collinear segments sharing the span `start..end`.
    Overlap { start: Vec2, end: Vec2 },
}

/// Intersect segments `p0 -> p1` and `q0 -> q1` with the cross-product method.
///
/// Solves `p0 + t·r = q0 + u·s`. Parallel, collinear and endpoint-touching
/// configurations are resolved with [`EPSILON`] instead of exact float
/// comparison.
pub fn segment_intersection(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> SegmentIntersection {
    let r = p1 - p0;
    let s = q1 - q0;
    let qp = q0 - p0;
    let denom = cross(r, s);
    let qp_cross_r = cross(qp, r);

    if denom.abs() <= EPSILON * r.length().max(s.length()).max(1.0) {
        // Parallel. Only collinear segments can still touch.
        if qp_cross_r.abs() > EPSILON * r.length().max(1.0) {
            return SegmentIntersection::None;
        }

        let rr = r.length_squared();
        if rr <= EPSILON * EPSILON {
            // p is a point; check whether it lies on q.
            let (closest, _) = closest_point_on_segment(q0, q1, p0);
            return if closest.distance_squared(p0) <= EPSILON * EPSILON {
                SegmentIntersection::Point {
                    point: p0,
                    t: 0.0,
                    u: param_on(q0, q1, p0),
                }
            } else {
                SegmentIntersection::None
            };
        }

        let t0 = qp.dot(r) / rr;
        let t1 = t0 + s.dot(r) / rr;
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(1.0);
        if lo > hi + EPSILON {
            return SegmentIntersection::None;
        }
        if (hi - lo).abs() <= EPSILON {
            let point = p0 + r * lo;
            return SegmentIntersection::Point {
                point,
                t: lo,
                u: param_on(q0, q1, point),
            };
        }
        return SegmentIntersection::Overlap {
            start: p0 + r * lo,
            end: p0 + r * hi,
        };
    }

    let t = cross(qp, s) / denom;
    let u = qp_cross_r / denom;
    let tolerance = EPSILON;
    if t < -tolerance || t > 1.0 + tolerance || u < -tolerance || u > 1.0 + tolerance {
        return SegmentIntersection::None;
    }
    let t = t.clamp(0.0, 1.0);
    SegmentIntersection::Point {
        point: p0 + r * t,
        t,
        u: u.clamp(0.0, 1.0),
    }
}

fn param_on(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= EPSILON * EPSILON {
        0.0
    } else {
        ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    }
}

/// Closest point to `p` on segment `a -> b`, with its parameter in `[0, 1]`.
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> (Vec2, f32) {
    let t = param_on(a, b, p);
    (a + (b - a) * t, t)
}

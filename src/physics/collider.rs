//! Bounding boxes and world-space collider helpers.

use glam::Vec2;

use crate::ecs::components::physics::Collider;
use crate::ecs::components::transform::Transform2d;

use super::math::EPSILON;
use super::ray::Ray2d;
use super::shape::WorldShape;

/// Axis-aligned bounding box for broadphase collision detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` with the given half extents.
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box containing every point. Empty input yields a degenerate
    /// box at the origin.
    pub fn from_points(points: &[Vec2]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(Vec2::ZERO, Vec2::ZERO);
        };
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Test whether two AABBs overlap. Touching boundaries count.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Slab test. Returns the entry distance along the ray, or 0 when the
    /// origin is already inside.
    pub fn cast_ray(&self, ray: &Ray2d, max_distance: f32) -> Option<f32> {
        let origin = ray.origin;
        let dir = ray.direction.as_vec2();
        let mut t_min = 0.0f32;
        let mut t_max = max_distance;

        for axis in 0..2 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

impl Collider {
    /// The collider's shape posed with the owning entity's transform.
    pub fn world_shape(&self, transform: &Transform2d) -> WorldShape {
        self.shape.to_world(transform, self.offset)
    }

    /// Minimum world-space bounding box.
    pub fn compute_aabb(&self, transform: &Transform2d) -> Aabb {
        self.world_shape(transform).aabb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::math::Dir2;
    use crate::physics::shape::Shape;

    #[test]
    fn test_circle_aabb() {
        let collider = Collider::new(Shape::circle(1.0).unwrap());
        let aabb = collider.compute_aabb(&Transform2d::from_position(Vec2::new(0.0, 5.0)));

        let eps = 1e-5;
        assert!((aabb.min - Vec2::new(-1.0, 4.0)).length() < eps);
        assert!((aabb.max - Vec2::new(1.0, 6.0)).length() < eps);
    }

    #[test]
    fn test_rotated_box_aabb() {
        let collider = Collider::new(Shape::rectangle(Vec2::splat(1.0)).unwrap());
        let transform =
            Transform2d::from_position_rotation(Vec2::ZERO, std::f32::consts::FRAC_PI_4);
        let aabb = collider.compute_aabb(&transform);
        let r = 2f32.sqrt();
        assert!((aabb.min - Vec2::splat(-r)).length() < 1e-5);
        assert!((aabb.max - Vec2::splat(r)).length() < 1e-5);
    }

    #[test]
    fn test_collider_offset() {
        let mut collider = Collider::new(Shape::circle(1.0).unwrap());
        collider.offset = Vec2::new(2.0, 0.0);
        let transform =
            Transform2d::from_position_rotation(Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        let aabb = collider.compute_aabb(&transform);
        assert!((aabb.center() - Vec2::new(0.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::splat(-1.0), Vec2::splat(1.0));
        let b = Aabb::new(Vec2::splat(0.5), Vec2::splat(2.0));
        let c = Aabb::new(Vec2::splat(2.0), Vec2::splat(3.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_aabb_touching_counts_as_overlap() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_aabb_cast_ray() {
        let aabb = Aabb::from_center(Vec2::ZERO, Vec2::splat(2.0));
        let ray = Ray2d::new(Vec2::new(-4.0, 0.0), Dir2::X);
        assert!((aabb.cast_ray(&ray, 10.0).unwrap() - 2.0).abs() < 1e-5);
        assert!(aabb.cast_ray(&ray, 1.0).is_none());

        let inside = Ray2d::new(Vec2::ZERO, Dir2::Y);
        assert_eq!(aabb.cast_ray(&inside, 10.0), Some(0.0));

        let miss = Ray2d::new(Vec2::new(-4.0, 3.0), Dir2::X);
        assert!(aabb.cast_ray(&miss, 10.0).is_none());
    }

    #[test]
    fn test_aabb_from_points_and_merge() {
        let a = Aabb::from_points(&[Vec2::new(1.0, -2.0), Vec2::new(-1.0, 3.0)]);
        assert_eq!(a.min, Vec2::new(-1.0, -2.0));
        assert_eq!(a.max, Vec2::new(1.0, 3.0));
        let merged = a.merge(&Aabb::new(Vec2::splat(4.0), Vec2::splat(5.0)));
        assert_eq!(merged.max, Vec2::splat(5.0));
        assert!(merged.contains_point(Vec2::new(4.5, 4.5)));
    }
}

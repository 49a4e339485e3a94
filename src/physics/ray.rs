//! Ray casting against world-space shapes.

use glam::Vec2;

use super::math::{cross, Dir2, EPSILON};
use super::shape::{WorldCircle, WorldEdge, WorldPolygon, WorldShape};

/// Half-line starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray2d {
    pub origin: Vec2,
    pub direction: Dir2,
}

impl Ray2d {
    pub fn new(origin: Vec2, direction: Dir2) -> Self {
        Self { origin, direction }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        self.origin + self.direction.as_vec2() * t
    }
}

/// Where a ray meets a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    /// Surface normal at `point`, facing the incoming ray.
    pub normal: Vec2,
    pub distance: f32,
}

/// Closest collider hit by a world raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub entity: hecs::Entity,
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
}

impl RaycastHit {
    pub fn new(entity: hecs::Entity, hit: RayHit) -> Self {
        Self {
            entity,
            point: hit.point,
            normal: hit.normal,
            distance: hit.distance,
        }
    }
}

impl WorldShape {
    /// First intersection of `ray` with this shape within `max_distance`.
    ///
    /// A ray whose origin lies inside a circle or polygon does not hit it.
    pub fn cast_ray(&self, ray: &Ray2d, max_distance: f32) -> Option<RayHit> {
        if max_distance.is_nan() || max_distance < 0.0 {
            return None;
        }
        match self {
            WorldShape::Circle(circle) => ray_circle(circle, ray, max_distance),
            WorldShape::Polygon(polygon) => ray_polygon(polygon, ray, max_distance),
            WorldShape::Edge(edge) => ray_edge(edge, ray, max_distance),
        }
    }
}

fn ray_circle(circle: &WorldCircle, ray: &Ray2d, max_distance: f32) -> Option<RayHit> {
    let d = ray.direction.as_vec2();
    let m = ray.origin - circle.center;
    let c = m.length_squared() - circle.radius * circle.radius;
    if c < 0.0 {
        return None;
    }
    let b = m.dot(d);
    // Outside and pointing away.
    if b > 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()).max(0.0);
    if t > max_distance {
        return None;
    }
    let point = ray.at(t);
    let normal = (point - circle.center).try_normalize().unwrap_or(-d);
    Some(RayHit {
        point,
        normal,
        distance: t,
    })
}

/// Cyrus-Beck clipping of the ray against every face half-plane.
fn ray_polygon(polygon: &WorldPolygon, ray: &Ray2d, max_distance: f32) -> Option<RayHit> {
    let d = ray.direction.as_vec2();
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = max_distance;
    let mut enter_normal = Vec2::ZERO;

    for (v, n) in polygon.vertices.iter().zip(&polygon.normals) {
        // Positive when the origin is on the inner side of this face.
        let numerator = n.dot(*v - ray.origin);
        let denominator = n.dot(d);

        if denominator.abs() < EPSILON {
            if numerator < 0.0 {
                return None;
            }
            continue;
        }

        let t = numerator / denominator;
        if denominator < 0.0 {
            if t > t_enter {
                t_enter = t;
                enter_normal = *n;
            }
        } else {
            t_exit = t_exit.min(t);
        }

        if t_enter > t_exit {
            return None;
        }
    }

    // Origin inside (or no entering face at all).
    if t_enter < 0.0 {
        return None;
    }
    Some(RayHit {
        point: ray.at(t_enter),
        normal: enter_normal,
        distance: t_enter,
    })
}

/// Solves `origin + t·d = start + u·s` directly, so unbounded queries
/// (`max_distance` of `f32::INFINITY`) never form an overflowing endpoint.
fn ray_edge(edge: &WorldEdge, ray: &Ray2d, max_distance: f32) -> Option<RayHit> {
    let d = ray.direction.as_vec2();
    let s = edge.end() - edge.start();
    let qp = edge.start() - ray.origin;
    let denom = cross(d, s);
    let tolerance = EPSILON * s.length().max(1.0);

    if denom.abs() <= tolerance {
        // Parallel: only a collinear edge can be hit, at its nearest point ahead.
        if cross(qp, d).abs() > EPSILON * qp.length().max(1.0) {
            return None;
        }
        let t0 = qp.dot(d);
        let t1 = (edge.end() - ray.origin).dot(d);
        if t0.max(t1) < -EPSILON {
            return None;
        }
        let t = t0.min(t1).max(0.0);
        if t > max_distance {
            return None;
        }
        return Some(RayHit {
            point: ray.at(t),
            normal: -d,
            distance: t,
        });
    }

    let t = cross(qp, s) / denom;
    let u = cross(qp, d) / denom;
    if t < -EPSILON || t > max_distance || !(-EPSILON..=1.0 + EPSILON).contains(&u) {
        return None;
    }

    let t = t.max(0.0);
    let n = edge.normal();
    Some(RayHit {
        point: ray.at(t),
        normal: if n.dot(d) > 0.0 { -n } else { n },
        distance: t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::transform::Transform2d;
    use crate::physics::shape::Shape;

    fn posed(shape: Shape, position: Vec2) -> WorldShape {
        shape.to_world(&Transform2d::from_position(position), Vec2::ZERO)
    }

    #[test]
    fn test_ray_hits_box() {
        let world = posed(Shape::rectangle(Vec2::splat(2.0)).unwrap(), Vec2::ZERO);
        let ray = Ray2d::new(Vec2::new(-4.0, 0.0), Dir2::X);
        let hit = world.cast_ray(&ray, 100.0).expect("ray should hit the box");

        let eps = 1e-5;
        assert!((hit.distance - 2.0).abs() < eps, "distance = {}", hit.distance);
        assert!((hit.point - Vec2::new(-2.0, 0.0)).length() < eps);
        assert!((hit.normal - Vec2::NEG_X).length() < eps);
    }

    #[test]
    fn test_ray_respects_max_distance() {
        let world = posed(Shape::rectangle(Vec2::splat(2.0)).unwrap(), Vec2::ZERO);
        let ray = Ray2d::new(Vec2::new(-4.0, 0.0), Dir2::X);
        assert!(world.cast_ray(&ray, 1.5).is_none());
        assert!(world.cast_ray(&ray, 2.0).is_some());
    }

    #[test]
    fn test_ray_misses_and_points_away() {
        let world = posed(Shape::rectangle(Vec2::splat(2.0)).unwrap(), Vec2::ZERO);
        let above = Ray2d::new(Vec2::new(-4.0, 3.0), Dir2::X);
        assert!(world.cast_ray(&above, 100.0).is_none());
        let away = Ray2d::new(Vec2::new(-4.0, 0.0), Dir2::NEG_X);
        assert!(world.cast_ray(&away, 100.0).is_none());
    }

    #[test]
    fn test_ray_from_inside_is_ignored() {
        let polygon = posed(Shape::rectangle(Vec2::splat(2.0)).unwrap(), Vec2::ZERO);
        let circle = posed(Shape::circle(1.0).unwrap(), Vec2::ZERO);
        let ray = Ray2d::new(Vec2::ZERO, Dir2::X);
        assert!(polygon.cast_ray(&ray, 10.0).is_none());
        assert!(circle.cast_ray(&ray, 10.0).is_none());
    }

    #[test]
    fn test_ray_hits_circle() {
        let world = posed(Shape::circle(1.0).unwrap(), Vec2::new(5.0, 0.0));
        let ray = Ray2d::new(Vec2::ZERO, Dir2::X);
        let hit = world.cast_ray(&ray, 10.0).expect("ray should hit the circle");
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.normal - Vec2::NEG_X).length() < 1e-5);

        let grazing = Ray2d::new(Vec2::new(0.0, 1.5), Dir2::X);
        assert!(world.cast_ray(&grazing, 10.0).is_none());
    }

    #[test]
    fn test_ray_hits_rotated_box() {
        let transform =
            Transform2d::from_position_rotation(Vec2::ZERO, std::f32::consts::FRAC_PI_4);
        let world = Shape::rectangle(Vec2::splat(1.0))
            .unwrap()
            .to_world(&transform, Vec2::ZERO);
        let ray = Ray2d::new(Vec2::new(-5.0, 0.0), Dir2::X);
        let hit = world.cast_ray(&ray, 10.0).unwrap();
        assert!((hit.distance - (5.0 - 2f32.sqrt())).abs() < 1e-4);
    }

    #[test]
    fn test_ray_hits_edge_from_either_side() {
        let world = posed(
            Shape::edge(Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0)).unwrap(),
            Vec2::new(3.0, 0.0),
        );
        let from_left = Ray2d::new(Vec2::ZERO, Dir2::X);
        let hit = world.cast_ray(&from_left, 10.0).unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-5);
        assert!((hit.normal - Vec2::NEG_X).length() < 1e-5);

        let from_right = Ray2d::new(Vec2::new(6.0, 0.0), Dir2::NEG_X);
        let hit = world.cast_ray(&from_right, 10.0).unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-5);
        assert!((hit.normal - Vec2::X).length() < 1e-5);

        let parallel = Ray2d::new(Vec2::new(1.0, 0.0), Dir2::Y);
        assert!(world.cast_ray(&parallel, 10.0).is_none());
    }

    #[test]
    fn test_ray_edge_unbounded_distance() {
        let world = posed(
            Shape::edge(Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0)).unwrap(),
            Vec2::new(3.0, 0.0),
        );
        let ray = Ray2d::new(Vec2::ZERO, Dir2::X);
        for max_distance in [10.0, 1e19, 1e20, f32::MAX, f32::INFINITY] {
            let hit = world
                .cast_ray(&ray, max_distance)
                .unwrap_or_else(|| panic!("no hit with max_distance {}", max_distance));
            assert!(
                (hit.distance - 3.0).abs() < 1e-5,
                "max_distance {}: distance = {}",
                max_distance,
                hit.distance
            );
        }

        let angled = Ray2d::new(Vec2::ZERO, Dir2::from_angle(0.1));
        let hit = world.cast_ray(&angled, f32::INFINITY).unwrap();
        assert!((hit.distance - 3.0 / 0.1f32.cos()).abs() < 1e-4);

        let away = Ray2d::new(Vec2::ZERO, Dir2::NEG_X);
        assert!(world.cast_ray(&away, f32::INFINITY).is_none());
        let above = Ray2d::new(Vec2::new(0.0, 2.0), Dir2::X);
        assert!(world.cast_ray(&above, f32::INFINITY).is_none());
    }

    #[test]
    fn test_ray_along_collinear_edge() {
        let world = posed(
            Shape::edge(Vec2::new(2.0, 0.0), Vec2::new(4.0, 0.0)).unwrap(),
            Vec2::ZERO,
        );
        let ray = Ray2d::new(Vec2::ZERO, Dir2::X);
        let hit = world.cast_ray(&ray, f32::INFINITY).unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!(world.cast_ray(&ray, 1.0).is_none());
        let behind = Ray2d::new(Vec2::new(5.0, 0.0), Dir2::X);
        assert!(world.cast_ray(&behind, f32::INFINITY).is_none());
    }

    #[test]
    fn test_world_raycast_unbounded() {
        let world = posed(Shape::rectangle(Vec2::splat(2.0)).unwrap(), Vec2::ZERO);
        let circle = posed(Shape::circle(1.0).unwrap(), Vec2::new(5.0, 0.0));
        let ray = Ray2d::new(Vec2::new(-4.0, 0.0), Dir2::X);
        assert!((world.cast_ray(&ray, f32::INFINITY).unwrap().distance - 2.0).abs() < 1e-5);
        assert!((circle.cast_ray(&ray, f32::MAX).unwrap().distance - 8.0).abs() < 1e-4);
    }
}

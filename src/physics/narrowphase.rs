//! Narrowphase collision detection: SAT with face clipping and specialized tests.
//!
//! [`detect_collision`] matches exhaustively over the pair of world shapes.
//! Mixed pairs have one canonical routine; the swapped order calls it and
//! flips the result, so `detect(a, b)` and `detect(b, a)` always agree.

use glam::Vec2;

use super::contact::{CollisionManifold, ContactPoint};
use super::math::{
    closest_point_on_segment, segment_intersection, Interval, SegmentIntersection, EPSILON,
};
use super::shape::{WorldCircle, WorldEdge, WorldPolygon, WorldShape};

/// Detect collision between two world-space shapes.
///
/// The manifold normal points from `a` to `b`. Touching shapes report a
/// manifold with zero depth.
pub fn detect_collision(a: &WorldShape, b: &WorldShape) -> Option<CollisionManifold> {
    use WorldShape::{Circle, Edge, Polygon};

    match (a, b) {
        (Circle(ca), Circle(cb)) => circle_circle(ca, cb),
        (Circle(c), Polygon(p)) => circle_polygon(c, p),
        (Polygon(p), Circle(c)) => circle_polygon(c, p).map(CollisionManifold::flip),
        (Circle(c), Edge(e)) => circle_edge(c, e),
        (Edge(e), Circle(c)) => circle_edge(c, e).map(CollisionManifold::flip),
        (Polygon(pa), Polygon(pb)) => {
            polygon_polygon(&pa.vertices, &pa.normals, &pb.vertices, &pb.normals)
        }
        (Polygon(p), Edge(e)) => polygon_polygon(&p.vertices, &p.normals, &e.vertices, &e.normals),
        (Edge(e), Polygon(p)) => {
            polygon_polygon(&p.vertices, &p.normals, &e.vertices, &e.normals)
                .map(CollisionManifold::flip)
        }
        (Edge(ea), Edge(eb)) => edge_edge(ea, eb),
    }
}

/// Circle-circle test. Coincident centers fall back to the +X axis.
///
/// The contact point is the midpoint of the overlap rather than a point
/// weighted by inverse mass; both lie on the line of centers, so the
/// resulting torque is the same.
pub fn circle_circle(a: &WorldCircle, b: &WorldCircle) -> Option<CollisionManifold> {
    let diff = b.center - a.center;
    let dist_sq = diff.length_squared();
    let radius_sum = a.radius + b.radius;

    if dist_sq > radius_sum * radius_sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist < EPSILON {
        return Some(CollisionManifold::single(Vec2::X, radius_sum, a.center));
    }

    let normal = diff / dist;
    let depth = radius_sum - dist;
    // Midpoint of the overlapping region.
    let point = a.center + normal * (a.radius - depth * 0.5);
    Some(CollisionManifold::single(normal, depth, point))
}

/// Circle-polygon test. The normal points from the circle to the polygon.
///
/// A center inside the polygon pushes out through the face of minimum
/// overlap; otherwise the exact closest boundary point is used.
pub fn circle_polygon(circle: &WorldCircle, polygon: &WorldPolygon) -> Option<CollisionManifold> {
    let center = circle.center;

    let mut max_separation = f32::MIN;
    let mut face = 0;
    for (i, (v, n)) in polygon.vertices.iter().zip(&polygon.normals).enumerate() {
        let separation = n.dot(center - *v);
        if separation > circle.radius {
            return None;
        }
        if separation > max_separation {
            max_separation = separation;
            face = i;
        }
    }

    if max_separation < EPSILON {
        let n = polygon.normals[face];
        let depth = circle.radius - max_separation;
        let point = center - n * max_separation;
        return Some(CollisionManifold::single(-n, depth, point));
    }

    let (closest, dist) = polygon.closest_boundary_point(center);
    if dist > circle.radius {
        return None;
    }
    let normal = (closest - center)
        .try_normalize()
        .unwrap_or(-polygon.normals[face]);
    Some(CollisionManifold::single(normal, circle.radius - dist, closest))
}

/// Circle-edge test. The normal points from the circle to the edge.
pub fn circle_edge(circle: &WorldCircle, edge: &WorldEdge) -> Option<CollisionManifold> {
    let (closest, _) = closest_point_on_segment(edge.start(), edge.end(), circle.center);
    let diff = closest - circle.center;
    let dist_sq = diff.length_squared();
    if dist_sq > circle.radius * circle.radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist < EPSILON {
        // Center on the segment: push along the edge normal.
        return Some(CollisionManifold::single(
            -edge.normal(),
            circle.radius,
            closest,
        ));
    }
    Some(CollisionManifold::single(
        diff / dist,
        circle.radius - dist,
        closest,
    ))
}

/// Edge-edge test by segment intersection.
///
/// The normal is edge A's normal oriented toward the bulk of edge B; the
/// depth is the shorter part of B that crossed A's line.
pub fn edge_edge(a: &WorldEdge, b: &WorldEdge) -> Option<CollisionManifold> {
    match segment_intersection(a.start(), a.end(), b.start(), b.end()) {
        SegmentIntersection::None => None,
        SegmentIntersection::Overlap { start, end } => Some(CollisionManifold::new(
            a.normal(),
            0.0,
            vec![
                ContactPoint {
                    position: start,
                    penetration: 0.0,
                },
                ContactPoint {
                    position: end,
                    penetration: 0.0,
                },
            ],
        )),
        SegmentIntersection::Point { point, .. } => {
            let n = a.normal();
            let s0 = n.dot(b.start() - a.start());
            let s1 = n.dot(b.end() - a.start());
            let front = s0.max(s1).max(0.0);
            let back = (-s0).max(-s1).max(0.0);
            if front >= back {
                Some(CollisionManifold::single(n, back, point))
            } else {
                Some(CollisionManifold::single(-n, front, point))
            }
        }
    }
}

/// Deepest-overlap axis found by [`find_min_overlap`].
#[derive(Debug, Clone, Copy)]
struct AxisOverlap {
    face: usize,
    depth: f32,
}

/// Minimum one-sided overlap of `other` along the face normals of `vertices_of`.
///
/// Returns `None` as soon as a separating axis is found.
fn find_min_overlap(
    vertices_of: &[Vec2],
    normals_of: &[Vec2],
    other: &[Vec2],
) -> Option<AxisOverlap> {
    let mut best = AxisOverlap {
        face: 0,
        depth: f32::MAX,
    };
    for (i, n) in normals_of.iter().enumerate() {
        let own = Interval::project(vertices_of, *n);
        let theirs = Interval::project(other, *n);
        if !own.overlaps(&theirs) {
            return None;
        }
        // Distance `other` must travel along +n to clear this face.
        let depth = own.max - theirs.min;
        if depth < best.depth {
            best = AxisOverlap { face: i, depth };
        }
    }
    Some(best)
}

/// SAT over both shapes' face normals followed by reference/incident face
/// clipping. Works for any pair of convex hulls, including two-sided edges.
pub fn polygon_polygon(
    vertices_a: &[Vec2],
    normals_a: &[Vec2],
    vertices_b: &[Vec2],
    normals_b: &[Vec2],
) -> Option<CollisionManifold> {
    let axis_a = find_min_overlap(vertices_a, normals_a, vertices_b)?;
    let axis_b = find_min_overlap(vertices_b, normals_b, vertices_a)?;

    // Ties go to A so that swapping the arguments only flips the normal.
    let b_is_reference = axis_b.depth < axis_a.depth;
    let (ref_vertices, ref_normals, inc_vertices, inc_normals, axis) = if b_is_reference {
        (vertices_b, normals_b, vertices_a, normals_a, axis_b)
    } else {
        (vertices_a, normals_a, vertices_b, normals_b, axis_a)
    };

    let contacts = clip_contacts(ref_vertices, ref_normals, inc_vertices, inc_normals, axis.face);
    let ref_normal = ref_normals[axis.face];
    let normal = if b_is_reference { -ref_normal } else { ref_normal };
    Some(CollisionManifold::new(normal, axis.depth, contacts))
}

fn clip_contacts(
    ref_vertices: &[Vec2],
    ref_normals: &[Vec2],
    inc_vertices: &[Vec2],
    inc_normals: &[Vec2],
    ref_face: usize,
) -> Vec<ContactPoint> {
    let normal = ref_normals[ref_face];
    let v1 = ref_vertices[ref_face];
    let v2 = ref_vertices[(ref_face + 1) % ref_vertices.len()];

    // Incident face: most anti-parallel to the reference normal.
    let mut inc_face = 0;
    let mut min_dot = f32::MAX;
    for (i, n) in inc_normals.iter().enumerate() {
        let d = n.dot(normal);
        if d < min_dot {
            min_dot = d;
            inc_face = i;
        }
    }
    let incident = [
        inc_vertices[inc_face],
        inc_vertices[(inc_face + 1) % inc_vertices.len()],
    ];

    // Reference face direction (v1 -> v2) for counter-clockwise winding.
    let tangent = Vec2::new(-normal.y, normal.x);

    let clipped = clip_segment(incident, -tangent, -tangent.dot(v1))
        .and_then(|points| clip_segment(points, tangent, tangent.dot(v2)));

    let mut contacts = Vec::with_capacity(2);
    if let Some(points) = clipped {
        for p in points {
            let separation = normal.dot(p - v1);
            if separation <= EPSILON {
                contacts.push(ContactPoint {
                    position: p,
                    penetration: (-separation).max(0.0),
                });
            }
        }
    }

    if contacts.is_empty() {
        // Deepest incident vertex.
        let deepest = inc_vertices
            .iter()
            .copied()
            .min_by(|p, q| normal.dot(*p).total_cmp(&normal.dot(*q)))
            .unwrap_or(v1);
        contacts.push(ContactPoint {
            position: deepest,
            penetration: (-normal.dot(deepest - v1)).max(0.0),
        });
    }
    contacts
}

/// Keep the part of a segment where `normal · p <= offset`.
fn clip_segment(points: [Vec2; 2], normal: Vec2, offset: f32) -> Option<[Vec2; 2]> {
    let d0 = normal.dot(points[0]) - offset;
    let d1 = normal.dot(points[1]) - offset;

    if d0 <= 0.0 && d1 <= 0.0 {
        return Some(points);
    }
    if d0 > 0.0 && d1 > 0.0 {
        return None;
    }
    let t = d0 / (d0 - d1);
    let crossing = points[0] + (points[1] - points[0]) * t;
    if d0 <= 0.0 {
        Some([points[0], crossing])
    } else {
        Some([crossing, points[1]])
    }
}

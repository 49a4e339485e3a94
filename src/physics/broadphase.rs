//! Broadphase collision detection using AABB overlap tests.

use super::collider::Aabb;

/// Per-collider input to the broadphase.
#[derive(Debug, Clone, Copy)]
pub struct BroadphaseProxy {
    pub entity: hecs::Entity,
    pub aabb: Aabb,
    /// No rigid body, or a body with zero inverse mass.
    pub is_static: bool,
    /// Entity carries the `IgnoreCollisions` tag.
    pub ignore_collisions: bool,
}

/// Brute-force O(n^2) pairwise AABB test.
#[derive(Debug, Default, Clone, Copy)]
pub struct AabbBroadphase;

impl AabbBroadphase {
    pub fn new() -> Self {
        Self
    }

    /// Indices `(i, j)` with `i < j` of every candidate pair, in proxy order.
    ///
    /// Static-static pairs and pairs involving an ignoring proxy are skipped.
    /// Touching boxes count as overlapping.
    pub fn find_pairs(&self, proxies: &[BroadphaseProxy]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();

        for (i, a) in proxies.iter().enumerate() {
            if a.ignore_collisions {
                continue;
            }
            for (j, b) in proxies.iter().enumerate().skip(i + 1) {
                if b.ignore_collisions {
                    continue;
                }
                // Skip static-static pairs
                if a.is_static && b.is_static {
                    continue;
                }
                if a.aabb.overlaps(&b.aabb) {
                    pairs.push((i, j));
                }
            }
        }

        pairs
    }
}

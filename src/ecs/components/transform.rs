//! Transform component for 2D entities.

use glam::{Mat2, Vec2};

/// Pose of an entity in world space: position, rotation (radians) and scale.
///
/// The physics world reads this before a step and writes the integrated
/// position and rotation back after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2d {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform2d {
    /// Create an identity transform.
    pub fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Create a transform from a position and rotation.
    pub fn from_position_rotation(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation,
            scale: Vec2::ONE,
        }
    }

    /// Rotation as a 2x2 matrix.
    #[inline]
    pub fn rotation_matrix(&self) -> Mat2 {
        Mat2::from_angle(self.rotation)
    }

    /// Map a local-space point to world space (scale, then rotate, then translate).
    #[inline]
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.rotation_matrix() * (local * self.scale) + self.position
    }

    /// Map a local-space direction to world space (rotation only).
    #[inline]
    pub fn transform_vector(&self, local: Vec2) -> Vec2 {
        self.rotation_matrix() * local
    }

    /// Map a world-space point back to local space.
    pub fn inverse_transform_point(&self, world: Vec2) -> Vec2 {
        let unrotated = self.rotation_matrix().transpose() * (world - self.position);
        unrotated / self.scale
    }

    /// Whether the scale mirrors geometry (negative determinant).
    #[inline]
    pub fn is_mirrored(&self) -> bool {
        self.scale.x * self.scale.y < 0.0
    }

    /// Largest absolute scale factor.
    #[inline]
    pub fn max_scale(&self) -> f32 {
        self.scale.x.abs().max(self.scale.y.abs())
    }
}

impl Default for Transform2d {
    fn default() -> Self {
        Self::identity()
    }
}

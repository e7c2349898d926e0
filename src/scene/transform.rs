//! Transform component for scene models.

use crate::math::{Euler, Matrix4, Quaternion, Vector3};

/// Position, rotation, and scale with a lazily rebuilt matrix.
#[derive(Debug, Clone)]
pub struct Transform {
    /// Position.
    pub position: Vector3,
    /// Rotation as Euler angles.
    pub rotation: Euler,
    /// Rotation as quaternion.
    pub quaternion: Quaternion,
    /// Scale.
    pub scale: Vector3,
    /// Cached transformation matrix.
    matrix: Matrix4,
    /// Whether the matrix needs rebuilding.
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    /// Create a new identity transform.
    pub fn new() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Euler::ZERO,
            quaternion: Quaternion::IDENTITY,
            scale: Vector3::ONE,
            matrix: Matrix4::IDENTITY,
            dirty: false,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: Vector3) -> Self {
        let mut t = Self::new();
        t.position = position;
        t.dirty = true;
        t
    }

    /// Create a transform from position, rotation, and scale.
    pub fn from_components(position: Vector3, rotation: Euler, scale: Vector3) -> Self {
        let mut t = Self::new();
        t.position = position;
        t.rotation = rotation;
        t.quaternion = Quaternion::from_euler(&rotation);
        t.scale = scale;
        t.dirty = true;
        t
    }

    /// Set the position.
    #[inline]
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position.set(x, y, z);
        self.dirty = true;
    }

    /// Set the rotation from Euler angles.
    #[inline]
    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation.set(x, y, z);
        self.quaternion = Quaternion::from_euler(&self.rotation);
        self.dirty = true;
    }

    /// Set the rotation from a quaternion.
    #[inline]
    pub fn set_rotation_quaternion(&mut self, quaternion: Quaternion) {
        self.quaternion = quaternion;
        self.rotation = Euler::from_quaternion(&quaternion);
        self.dirty = true;
    }

    /// Set the scale.
    #[inline]
    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) {
        self.scale.set(x, y, z);
        self.dirty = true;
    }

    /// Set a uniform scale.
    #[inline]
    pub fn set_scale_uniform(&mut self, s: f32) {
        self.scale = Vector3::splat(s);
        self.dirty = true;
    }

    /// Translate by a vector.
    #[inline]
    pub fn translate(&mut self, v: &Vector3) {
        self.position += *v;
        self.dirty = true;
    }

    /// Rotate around the Y axis.
    #[inline]
    pub fn rotate_y(&mut self, angle: f32) {
        let q = Quaternion::from_axis_angle(&Vector3::UNIT_Y, angle);
        self.quaternion = self.quaternion.multiply(&q);
        self.rotation = Euler::from_quaternion(&self.quaternion);
        self.dirty = true;
    }

    /// Rotate around an arbitrary axis.
    #[inline]
    pub fn rotate_on_axis(&mut self, axis: &Vector3, angle: f32) {
        let q = Quaternion::from_axis_angle(axis, angle);
        self.quaternion = self.quaternion.multiply(&q);
        self.rotation = Euler::from_quaternion(&self.quaternion);
        self.dirty = true;
    }

    /// Get the transformation matrix, rebuilding it if needed.
    pub fn matrix(&mut self) -> &Matrix4 {
        if self.dirty {
            self.matrix = Matrix4::compose(&self.position, &self.quaternion, &self.scale);
            self.dirty = false;
        }
        &self.matrix
    }

    /// Check if the matrix needs rebuilding.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_transform() {
        let t = Transform::new();
        assert!(t.position.approx_eq(&Vector3::ZERO, 1e-6));
        assert!(t.scale.approx_eq(&Vector3::ONE, 1e-6));
        assert!(!t.is_dirty());
    }

    #[test]
    fn test_translation_lands_in_matrix() {
        let mut t = Transform::new();
        t.set_position(1.0, 2.0, 3.0);
        let pos = t.matrix().get_position();
        assert!(pos.approx_eq(&Vector3::new(1.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn test_rotate_y_accumulates() {
        let mut t = Transform::new();
        t.rotate_y(0.5);
        t.rotate_y(0.5);
        let expected = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 1.0);
        assert!(t.quaternion.approx_eq(&expected, 1e-5));
    }
}

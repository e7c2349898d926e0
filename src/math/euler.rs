//! Euler angles implementation.

use super::{Matrix4, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Euler angles representation of rotation, applied in XYZ order.
/// All angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    /// Rotation around X axis in radians.
    pub x: f32,
    /// Rotation around Y axis in radians.
    pub y: f32,
    /// Rotation around Z axis in radians.
    pub z: f32,
}

impl Euler {
    /// Zero rotation.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Create new Euler angles.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Set the components.
    #[inline]
    pub fn set(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Create from a quaternion.
    pub fn from_quaternion(q: &Quaternion) -> Self {
        let m = Matrix4::from_quaternion(q);
        let e = &m.elements;

        // Column-major: m13 = e[8], m23 = e[9], m33 = e[10], m12 = e[4], m11 = e[0].
        let m11 = e[0];
        let m12 = e[4];
        let m13 = e[8];
        let m22 = e[5];
        let m23 = e[9];
        let m32 = e[6];
        let m33 = e[10];

        let y = m13.clamp(-1.0, 1.0).asin();
        let (x, z) = if m13.abs() < 0.9999999 {
            ((-m23).atan2(m33), (-m12).atan2(m11))
        } else {
            // Gimbal lock: pitch at +-90 degrees, roll folded into yaw.
            (m32.atan2(m22), 0.0)
        };

        Self { x, y, z }
    }

    /// Convert to a Vector3 of (x, y, z) angles.
    #[inline]
    pub const fn to_vector3(&self) -> Vector3 {
        Vector3 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    /// Check if approximately equal.
    #[inline]
    pub fn approx_eq(&self, other: &Euler, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}

impl From<[f32; 3]> for Euler {
    fn from(a: [f32; 3]) -> Self {
        Self { x: a[0], y: a[1], z: a[2] }
    }
}

impl From<Euler> for [f32; 3] {
    fn from(e: Euler) -> Self {
        [e.x, e.y, e.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quaternion_roundtrip() {
        // Angles away from the pitch = +-pi/2 singularity round-trip exactly.
        let euler = Euler::new(0.1, 0.2, 0.3);
        let q = Quaternion::from_euler(&euler);
        let euler2 = Euler::from_quaternion(&q);
        assert!(euler.approx_eq(&euler2, 1e-5));
    }

    #[test]
    fn test_quaternion_roundtrip_negative_angles() {
        let euler = Euler::new(-0.7, 1.1, -0.4);
        let q = Quaternion::from_euler(&euler);
        let euler2 = Euler::from_quaternion(&q);
        assert!(euler.approx_eq(&euler2, 1e-5));
    }
}

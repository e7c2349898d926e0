//! Quaternion implementation for rotations.

use super::{Euler, Vector3};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A quaternion representing a rotation in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Quaternion {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W (scalar) component.
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// Identity rotation.
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a new quaternion.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from an axis (must be normalized) and angle in radians.
    pub fn from_axis_angle(axis: &Vector3, angle: f32) -> Self {
        let half = angle / 2.0;
        let s = half.sin();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: half.cos(),
        }
    }

    /// Create from Euler angles (XYZ rotation order).
    pub fn from_euler(euler: &Euler) -> Self {
        let (s1, c1) = (euler.x / 2.0).sin_cos();
        let (s2, c2) = (euler.y / 2.0).sin_cos();
        let (s3, c3) = (euler.z / 2.0).sin_cos();

        Self {
            x: s1 * c2 * c3 + c1 * s2 * s3,
            y: c1 * s2 * c3 - s1 * c2 * s3,
            z: c1 * c2 * s3 + s1 * s2 * c3,
            w: c1 * c2 * c3 - s1 * s2 * s3,
        }
    }

    /// Get the length of the quaternion.
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Dot product with another quaternion.
    #[inline]
    pub fn dot(&self, other: &Quaternion) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Return a normalized copy. A zero quaternion becomes identity.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            let inv = 1.0 / len;
            Self {
                x: self.x * inv,
                y: self.y * inv,
                z: self.z * inv,
                w: self.w * inv,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Conjugate (inverse rotation for unit quaternions).
    #[inline]
    pub fn conjugate(&self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    /// Multiply with another quaternion (compose rotations, self then other).
    pub fn multiply(&self, other: &Quaternion) -> Self {
        let (ax, ay, az, aw) = (self.x, self.y, self.z, self.w);
        let (bx, by, bz, bw) = (other.x, other.y, other.z, other.w);

        Self {
            x: ax * bw + aw * bx + ay * bz - az * by,
            y: ay * bw + aw * by + az * bx - ax * bz,
            z: az * bw + aw * bz + ax * by - ay * bx,
            w: aw * bw - ax * bx - ay * by - az * bz,
        }
    }

    /// Spherical linear interpolation toward another quaternion.
    pub fn slerp(&self, other: &Quaternion, t: f32) -> Self {
        let mut cos_half_theta = self.dot(other);
        let mut b = *other;

        // Take the short way around.
        if cos_half_theta < 0.0 {
            cos_half_theta = -cos_half_theta;
            b = Self::new(-other.x, -other.y, -other.z, -other.w);
        }

        if cos_half_theta >= 1.0 {
            return *self;
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();

        // Angles close to 180 degrees are ill-defined; fall back to lerp.
        if sin_half_theta.abs() < 1e-4 {
            return Self {
                x: self.x * 0.5 + b.x * 0.5,
                y: self.y * 0.5 + b.y * 0.5,
                z: self.z * 0.5 + b.z * 0.5,
                w: self.w * 0.5 + b.w * 0.5,
            }
            .normalized();
        }

        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;

        Self {
            x: self.x * ratio_a + b.x * ratio_b,
            y: self.y * ratio_a + b.y * ratio_b,
            z: self.z * ratio_a + b.z * ratio_b,
            w: self.w * ratio_a + b.w * ratio_b,
        }
    }

    /// Check if approximately equal to another quaternion.
    #[inline]
    pub fn approx_eq(&self, other: &Quaternion, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
            && (self.w - other.w).abs() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rotation() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let r = v.apply_quaternion(&Quaternion::IDENTITY);
        assert!(r.approx_eq(&v, 1e-6));
    }

    #[test]
    fn test_axis_angle_quarter_turn() {
        let q = Quaternion::from_axis_angle(&Vector3::UNIT_Y, std::f32::consts::FRAC_PI_2);
        let r = Vector3::UNIT_X.apply_quaternion(&q);
        assert!(r.approx_eq(&Vector3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn test_slerp_endpoints() {
        let a = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 0.3);
        let b = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 1.2);
        assert!(a.slerp(&b, 0.0).approx_eq(&a, 1e-5));
        assert!(a.slerp(&b, 1.0).approx_eq(&b, 1e-5));
    }

    #[test]
    fn test_multiply_composes() {
        let a = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 0.4);
        let b = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 0.6);
        let c = a.multiply(&b);
        let expected = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 1.0);
        assert!(c.approx_eq(&expected, 1e-5));
    }
}

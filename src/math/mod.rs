//! # Math Module
//!
//! Value-type 3D math for the render core: vectors, matrices, quaternions,
//! Euler angles, and colors. Everything here is `Copy` and side-effect free.

mod vector3;
mod vector4;
mod matrix4;
mod quaternion;
mod euler;
mod color;

pub use vector3::Vector3;
pub use vector4::Vector4;
pub use matrix4::Matrix4;
pub use quaternion::Quaternion;
pub use euler::Euler;
pub use color::Color;

/// Common math constants.
pub mod consts {
    /// Pi constant.
    pub const PI: f32 = std::f32::consts::PI;
    /// Two times Pi.
    pub const TWO_PI: f32 = PI * 2.0;
    /// Degrees to radians conversion factor.
    pub const DEG2RAD: f32 = PI / 180.0;
    /// Radians to degrees conversion factor.
    pub const RAD2DEG: f32 = 180.0 / PI;
    /// Small epsilon for floating point comparisons.
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * consts::DEG2RAD
}

/// Convert radians to degrees.
#[inline]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * consts::RAD2DEG
}

/// Linear interpolation between two values.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

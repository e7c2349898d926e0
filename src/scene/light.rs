//! Scene lighting.

use crate::math::{Color, Vector3};
use serde::{Deserialize, Serialize};

/// A point light.
///
/// Scenes store any number of lights, but shading consumes only the
/// first one plus the scene's ambient term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// World-space light position.
    pub position: Vector3,
    /// Light color.
    pub color: Color,
    /// Light intensity multiplier.
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vector3::new(5.0, 8.0, 5.0),
            color: Color::WHITE,
            intensity: 1.0,
        }
    }
}

impl Light {
    /// Create a light at a position with a color and intensity.
    pub fn new(position: Vector3, color: Color, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }
}

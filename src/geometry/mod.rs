//! # Geometry Module
//!
//! Mesh data structures and the procedural shape factories. All factories
//! are pure: they validate their parameters and return CPU-side mesh data
//! without touching the GPU.

mod cube;
mod pyramid;
mod sphere;
mod vertex;

pub use cube::build_cube;
pub use pyramid::build_pyramid;
pub use sphere::build_sphere;
pub use vertex::Vertex;

use crate::core::EngineError;
use crate::math::Color;
use serde::{Deserialize, Serialize};

/// CPU-side mesh data: interleaved vertices and a u16 index list.
///
/// This is the retained copy used to (re)create GPU buffers, including
/// after a context loss.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Interleaved vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle list indices.
    pub indices: Vec<u16>,
}

impl MeshData {
    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    /// Size of the vertex data in bytes.
    #[inline]
    pub fn vertex_bytes(&self) -> u64 {
        self.vertices.len() as u64 * Vertex::STRIDE
    }

    /// Size of the index data in bytes.
    #[inline]
    pub fn index_bytes(&self) -> u64 {
        (self.indices.len() * std::mem::size_of::<u16>()) as u64
    }

    /// Total buffer footprint in bytes.
    #[inline]
    pub fn total_bytes(&self) -> u64 {
        self.vertex_bytes() + self.index_bytes()
    }
}

/// A procedural shape description, serializable as part of a scene document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// Axis-aligned cube centered on the origin.
    Cube {
        /// Edge length.
        size: f32,
    },
    /// Square-base pyramid centered on the origin, apex along +Y.
    Pyramid {
        /// Base edge length.
        base: f32,
        /// Height from base to apex.
        height: f32,
    },
    /// UV sphere centered on the origin.
    Sphere {
        /// Sphere radius.
        radius: f32,
        /// Latitude and longitude subdivisions.
        segments: u32,
    },
}

impl Shape {
    /// Build the mesh for this shape with a uniform vertex color.
    pub fn build(&self, color: Color) -> Result<MeshData, EngineError> {
        match *self {
            Shape::Cube { size } => build_cube(size, color),
            Shape::Pyramid { base, height } => build_pyramid(base, height, color),
            Shape::Sphere { radius, segments } => build_sphere(radius, segments, color),
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Cube { size: 1.0 }
    }
}

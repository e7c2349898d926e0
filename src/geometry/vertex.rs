//! Interleaved vertex format shared by all mesh factories.

use bytemuck::{Pod, Zeroable};

/// A single mesh vertex: position, normal, and RGBA color.
///
/// Layout is interleaved and tightly packed (40 bytes per vertex).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Per-vertex RGBA color.
    pub color: [f32; 4],
}

impl Vertex {
    /// Byte stride of one vertex.
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    /// Vertex attributes matching the shader inputs at locations 0..=2.
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
    ];

    /// Create a vertex.
    pub fn new(position: [f32; 3], normal: [f32; 3], color: [f32; 4]) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }

    /// The vertex buffer layout for pipeline creation.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride_is_packed() {
        // 3 + 3 + 4 floats, no padding.
        assert_eq!(Vertex::STRIDE, 40);
    }

    #[test]
    fn test_layout_covers_all_attributes() {
        let layout = Vertex::layout();
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.array_stride, Vertex::STRIDE);
    }
}

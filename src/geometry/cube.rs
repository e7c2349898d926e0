//! Cube mesh factory.

use super::{MeshData, Vertex};
use crate::core::EngineError;
use crate::math::Color;

/// The six face normals of an axis-aligned cube.
const FACE_NORMALS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 0.0, -1.0],
];

/// Build an axis-aligned cube of edge length `size`, centered on the origin.
///
/// Faces are flat shaded: 4 vertices per face (24 total) and 12 triangles.
pub fn build_cube(size: f32, color: Color) -> Result<MeshData, EngineError> {
    if !(size > 0.0) || !size.is_finite() {
        return Err(EngineError::invalid(format!(
            "cube size must be positive and finite, got {size}"
        )));
    }

    let h = size / 2.0;
    let rgba = color.to_array();
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for normal in FACE_NORMALS {
        let [nx, ny, nz] = normal;
        // Tangent and bitangent spanning the face plane.
        let tangent = if nx.abs() > 0.5 {
            [0.0, 0.0, -nx]
        } else if ny.abs() > 0.5 {
            [ny, 0.0, 0.0]
        } else {
            [nz, 0.0, 0.0]
        };
        let bitangent = [
            ny * tangent[2] - nz * tangent[1],
            nz * tangent[0] - nx * tangent[2],
            nx * tangent[1] - ny * tangent[0],
        ];

        let base = vertices.len() as u16;
        for (u, v) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = [
                h * (nx + u * tangent[0] + v * bitangent[0]),
                h * (ny + u * tangent[1] + v * bitangent[1]),
                h * (nz + u * tangent[2] + v * bitangent[2]),
            ];
            vertices.push(Vertex::new(position, normal, rgba));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Ok(MeshData { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let mesh = build_cube(2.0, Color::WHITE).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_cube_vertices_on_surface() {
        let mesh = build_cube(2.0, Color::WHITE).unwrap();
        for v in &mesh.vertices {
            let max = v
                .position
                .iter()
                .fold(0.0f32, |acc, c| acc.max(c.abs()));
            assert!((max - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cube_normals_match_faces() {
        let mesh = build_cube(1.0, Color::WHITE).unwrap();
        for v in &mesh.vertices {
            // Each normal is a unit axis vector.
            let len: f32 = v.normal.iter().map(|c| c * c).sum();
            assert!((len - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cube_rejects_nonpositive_size() {
        assert!(build_cube(0.0, Color::WHITE).is_err());
        assert!(build_cube(-1.0, Color::WHITE).is_err());
        assert!(build_cube(f32::NAN, Color::WHITE).is_err());
    }
}

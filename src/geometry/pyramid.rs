//! Pyramid mesh factory.

use super::{MeshData, Vertex};
use crate::core::EngineError;
use crate::math::{Color, Vector3};

/// Build a square-base pyramid centered on the origin with the apex along +Y.
///
/// Flat shaded: the base contributes 4 vertices and 2 triangles, each of the
/// four sides contributes 3 vertices and 1 triangle (16 vertices, 6 triangles).
pub fn build_pyramid(base: f32, height: f32, color: Color) -> Result<MeshData, EngineError> {
    if !(base > 0.0) || !base.is_finite() {
        return Err(EngineError::invalid(format!(
            "pyramid base must be positive and finite, got {base}"
        )));
    }
    if !(height > 0.0) || !height.is_finite() {
        return Err(EngineError::invalid(format!(
            "pyramid height must be positive and finite, got {height}"
        )));
    }

    let h = base / 2.0;
    let top = height / 2.0;
    let bottom = -height / 2.0;
    let rgba = color.to_array();

    let apex = Vector3::new(0.0, top, 0.0);
    // Base corners, counter-clockwise seen from above.
    let corners = [
        Vector3::new(-h, bottom, -h),
        Vector3::new(h, bottom, -h),
        Vector3::new(h, bottom, h),
        Vector3::new(-h, bottom, h),
    ];

    let mut vertices = Vec::with_capacity(16);
    let mut indices = Vec::with_capacity(18);

    // Base face, facing -Y.
    let down = [0.0, -1.0, 0.0];
    for corner in corners {
        vertices.push(Vertex::new(corner.to_array(), down, rgba));
    }
    indices.extend_from_slice(&[0, 2, 1, 0, 3, 2]);

    // Side faces, one flat normal each.
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let normal = (apex - a).cross(&(b - a)).normalized().to_array();

        let first = vertices.len() as u16;
        vertices.push(Vertex::new(a.to_array(), normal, rgba));
        vertices.push(Vertex::new(apex.to_array(), normal, rgba));
        vertices.push(Vertex::new(b.to_array(), normal, rgba));
        indices.extend_from_slice(&[first, first + 1, first + 2]);
    }

    Ok(MeshData { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pyramid_counts() {
        let mesh = build_pyramid(1.0, 1.0, Color::WHITE).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 6);
    }

    #[test]
    fn test_side_normals_point_outward() {
        let mesh = build_pyramid(2.0, 1.0, Color::WHITE).unwrap();
        // Side vertices start after the 4 base vertices. An outward normal
        // has a positive dot product with the face centroid.
        for tri in mesh.indices[6..].chunks(3) {
            let centroid = tri.iter().fold(Vector3::ZERO, |acc, &i| {
                acc + Vector3::from(mesh.vertices[i as usize].position)
            }) / 3.0;
            let normal = Vector3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(centroid.dot(&normal) > 0.0);
        }
    }

    #[test]
    fn test_pyramid_rejects_bad_dimensions() {
        assert!(build_pyramid(0.0, 1.0, Color::WHITE).is_err());
        assert!(build_pyramid(1.0, -2.0, Color::WHITE).is_err());
        assert!(build_pyramid(f32::INFINITY, 1.0, Color::WHITE).is_err());
    }
}

//! UV sphere mesh factory.

use super::{MeshData, Vertex};
use crate::core::EngineError;
use crate::math::consts::{PI, TWO_PI};
use crate::math::Color;

/// Maximum subdivision count; keeps index counts inside the u16 range.
pub const MAX_SEGMENTS: u32 = 128;

/// Build a UV sphere of the given `radius` with `segments` subdivisions in
/// both latitude and longitude.
///
/// Produces `(segments + 1)^2` vertices and exactly `2 * segments^2`
/// triangles. Normals are the normalized positions, so shading is smooth.
pub fn build_sphere(radius: f32, segments: u32, color: Color) -> Result<MeshData, EngineError> {
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(EngineError::invalid(format!(
            "sphere radius must be positive and finite, got {radius}"
        )));
    }
    if segments == 0 || segments > MAX_SEGMENTS {
        return Err(EngineError::invalid(format!(
            "sphere segments must be in 1..={MAX_SEGMENTS}, got {segments}"
        )));
    }

    let n = segments;
    let rgba = color.to_array();
    let mut vertices = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    let mut indices = Vec::with_capacity((n * n * 6) as usize);

    for iy in 0..=n {
        let theta = PI * iy as f32 / n as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for ix in 0..=n {
            let phi = TWO_PI * ix as f32 / n as f32;
            let (sin_p, cos_p) = phi.sin_cos();

            let normal = [sin_t * cos_p, cos_t, sin_t * sin_p];
            let position = [normal[0] * radius, normal[1] * radius, normal[2] * radius];
            vertices.push(Vertex::new(position, normal, rgba));
        }
    }

    let row = n + 1;
    for iy in 0..n {
        for ix in 0..n {
            let a = (iy * row + ix) as u16;
            let b = a + 1;
            let c = a + row as u16;
            let d = c + 1;
            indices.extend_from_slice(&[a, d, c, a, b, d]);
        }
    }

    Ok(MeshData { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_counts() {
        for n in [1u32, 4, 16] {
            let mesh = build_sphere(1.0, n, Color::WHITE).unwrap();
            assert_eq!(mesh.vertex_count(), (n + 1) * (n + 1));
            assert_eq!(mesh.triangle_count(), 2 * n * n);
        }
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let mesh = build_sphere(3.0, 8, Color::WHITE).unwrap();
        for v in &mesh.vertices {
            let len: f32 = v.position.iter().map(|c| c * c).sum::<f32>().sqrt();
            assert!((len - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_indices_fit_u16() {
        let mesh = build_sphere(1.0, MAX_SEGMENTS, Color::WHITE).unwrap();
        let max = *mesh.indices.iter().max().unwrap() as u32;
        assert!(max < mesh.vertex_count());
    }

    #[test]
    fn test_sphere_rejects_bad_parameters() {
        assert!(build_sphere(0.0, 8, Color::WHITE).is_err());
        assert!(build_sphere(1.0, 0, Color::WHITE).is_err());
        assert!(build_sphere(1.0, MAX_SEGMENTS + 1, Color::WHITE).is_err());
    }
}

//! Perspective camera.

use crate::core::{EngineError, Id};
use crate::math::{Matrix4, Vector3};

/// How close to parallel the up vector may be to the view direction
/// before the basis is rejected as degenerate.
const BASIS_EPSILON: f32 = 1e-6;

/// A perspective projection camera.
///
/// Projection and view parameters are validated when set, so the matrices
/// are always well formed. Matrices are recomputed on demand when any
/// parameter changed since the last query.
pub struct PerspectiveCamera {
    /// Unique ID.
    id: Id,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
    position: Vector3,
    target: Vector3,
    up: Vector3,
    view_matrix: Matrix4,
    projection_matrix: Matrix4,
    view_projection_matrix: Matrix4,
    needs_update: bool,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        // Defaults are valid by construction.
        Self::new(60.0, 16.0 / 9.0, 0.1, 1000.0).expect("default camera parameters are valid")
    }
}

impl PerspectiveCamera {
    /// Create a new perspective camera. `fov` is the vertical field of
    /// view in degrees.
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Result<Self, EngineError> {
        validate_projection(fov, aspect, near, far)?;
        let mut camera = Self {
            id: Id::new(),
            fov,
            aspect,
            near,
            far,
            position: Vector3::new(0.0, 0.0, 5.0),
            target: Vector3::ZERO,
            up: Vector3::UP,
            view_matrix: Matrix4::IDENTITY,
            projection_matrix: Matrix4::IDENTITY,
            view_projection_matrix: Matrix4::IDENTITY,
            needs_update: true,
        };
        camera.update_matrices();
        Ok(camera)
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Field of view in degrees.
    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Aspect ratio (width / height).
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Near clipping plane.
    #[inline]
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Far clipping plane.
    #[inline]
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Camera position.
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    /// Camera target (look-at point).
    #[inline]
    pub fn target(&self) -> Vector3 {
        self.target
    }

    /// Set the field of view in degrees.
    pub fn set_fov(&mut self, fov: f32) -> Result<(), EngineError> {
        validate_projection(fov, self.aspect, self.near, self.far)?;
        self.fov = fov;
        self.needs_update = true;
        Ok(())
    }

    /// Set the aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) -> Result<(), EngineError> {
        validate_projection(self.fov, aspect, self.near, self.far)?;
        self.aspect = aspect;
        self.needs_update = true;
        Ok(())
    }

    /// Set near and far planes.
    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<(), EngineError> {
        validate_projection(self.fov, self.aspect, near, far)?;
        self.near = near;
        self.far = far;
        self.needs_update = true;
        Ok(())
    }

    /// Place the camera and aim it at a target.
    pub fn look_at(
        &mut self,
        position: Vector3,
        target: Vector3,
        up: Vector3,
    ) -> Result<(), EngineError> {
        validate_basis(position, target, up)?;
        self.position = position;
        self.target = target;
        self.up = up.normalized();
        self.needs_update = true;
        Ok(())
    }

    /// Set the camera position, keeping the current target and up vector.
    pub fn set_position(&mut self, position: Vector3) -> Result<(), EngineError> {
        validate_basis(position, self.target, self.up)?;
        self.position = position;
        self.needs_update = true;
        Ok(())
    }

    /// Set the camera target, keeping the current position and up vector.
    pub fn set_target(&mut self, target: Vector3) -> Result<(), EngineError> {
        validate_basis(self.position, target, self.up)?;
        self.target = target;
        self.needs_update = true;
        Ok(())
    }

    /// Get the view matrix.
    pub fn view_matrix(&mut self) -> &Matrix4 {
        if self.needs_update {
            self.update_matrices();
        }
        &self.view_matrix
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&mut self) -> &Matrix4 {
        if self.needs_update {
            self.update_matrices();
        }
        &self.projection_matrix
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&mut self) -> &Matrix4 {
        if self.needs_update {
            self.update_matrices();
        }
        &self.view_projection_matrix
    }

    /// Recompute all matrices from the current state.
    fn update_matrices(&mut self) {
        self.view_matrix = Matrix4::look_at(&self.position, &self.target, &self.up);
        self.projection_matrix =
            Matrix4::perspective(self.fov.to_radians(), self.aspect, self.near, self.far);
        self.view_projection_matrix = self.projection_matrix.multiply(&self.view_matrix);
        self.needs_update = false;
    }

    /// Get the forward direction.
    pub fn forward(&self) -> Vector3 {
        (self.target - self.position).normalized()
    }

    /// Get the right direction.
    pub fn right(&self) -> Vector3 {
        self.forward().cross(&self.up).normalized()
    }

    /// Orbit around the target.
    pub fn orbit(&mut self, delta_phi: f32, delta_theta: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();

        let mut theta = offset.z.atan2(offset.x);
        let mut phi = (offset.y / radius).acos();

        theta += delta_phi;
        phi = (phi + delta_theta).clamp(0.01, std::f32::consts::PI - 0.01);

        self.position = self.target
            + Vector3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            );
        self.needs_update = true;
    }

    /// Dolly (move forward/backward along the view direction).
    pub fn dolly(&mut self, distance: f32) {
        self.position = self.position + self.forward() * distance;
        self.needs_update = true;
    }

    /// Pan (move position and target parallel to the view plane).
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.right() * delta_x + self.up * delta_y;
        self.position = self.position + offset;
        self.target = self.target + offset;
        self.needs_update = true;
    }
}

fn validate_projection(fov: f32, aspect: f32, near: f32, far: f32) -> Result<(), EngineError> {
    if !(fov > 0.0 && fov < 180.0) {
        return Err(EngineError::invalid(format!(
            "fov must be in (0, 180) degrees, got {fov}"
        )));
    }
    if !(aspect > 0.0) || !aspect.is_finite() {
        return Err(EngineError::invalid(format!(
            "aspect ratio must be positive and finite, got {aspect}"
        )));
    }
    if !(near > 0.0) {
        return Err(EngineError::invalid(format!(
            "near plane must be positive, got {near}"
        )));
    }
    if !(far > near) {
        return Err(EngineError::invalid(format!(
            "far plane must exceed near plane, got near {near} far {far}"
        )));
    }
    Ok(())
}

fn validate_basis(position: Vector3, target: Vector3, up: Vector3) -> Result<(), EngineError> {
    let view = target - position;
    if view.length() < BASIS_EPSILON {
        return Err(EngineError::invalid(
            "camera position and target coincide".to_string(),
        ));
    }
    if view.normalized().cross(&up.normalized()).length() < BASIS_EPSILON {
        return Err(EngineError::DegenerateBasis);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_projection_parameters() {
        assert!(PerspectiveCamera::new(0.0, 1.0, 0.1, 100.0).is_err());
        assert!(PerspectiveCamera::new(180.0, 1.0, 0.1, 100.0).is_err());
        assert!(PerspectiveCamera::new(60.0, -1.0, 0.1, 100.0).is_err());
        assert!(PerspectiveCamera::new(60.0, 1.0, 0.0, 100.0).is_err());
        assert!(PerspectiveCamera::new(60.0, 1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_rejects_up_parallel_to_view() {
        let mut camera = PerspectiveCamera::default();
        let err = camera
            .look_at(Vector3::new(0.0, 5.0, 0.0), Vector3::ZERO, Vector3::UP)
            .unwrap_err();
        assert!(matches!(err, EngineError::DegenerateBasis));
    }

    #[test]
    fn test_rejects_position_equal_to_target() {
        let mut camera = PerspectiveCamera::default();
        let result = camera.look_at(Vector3::ZERO, Vector3::ZERO, Vector3::UP);
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_matrices_refresh_after_change() {
        let mut camera = PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0).unwrap();
        let before = *camera.view_projection_matrix();
        camera
            .set_position(Vector3::new(3.0, 2.0, 5.0))
            .unwrap();
        let after = *camera.view_projection_matrix();
        assert_ne!(before.elements, after.elements);
    }

    #[test]
    fn test_orbit_preserves_distance_to_target() {
        let mut camera = PerspectiveCamera::default();
        camera
            .look_at(Vector3::new(0.0, 0.0, 5.0), Vector3::ZERO, Vector3::UP)
            .unwrap();
        let before = (camera.position() - camera.target()).length();
        camera.orbit(0.3, 0.2);
        let after = (camera.position() - camera.target()).length();
        assert!((before - after).abs() < 1e-4);
    }

    #[test]
    fn test_pan_moves_position_and_target_together() {
        let mut camera = PerspectiveCamera::default();
        let offset_before = camera.target() - camera.position();
        camera.pan(1.0, 2.0);
        let offset_after = camera.target() - camera.position();
        assert!(offset_before.approx_eq(&offset_after, 1e-5));
    }
}

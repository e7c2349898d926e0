//! A flat collection of models with lights and a background color.

use super::{Light, Model};
use crate::core::Id;
use crate::gpu::MeshHandle;
use crate::math::Color;

/// A scene: models in insertion order (which is also draw order), a
/// list of lights, an ambient term, and a background color.
pub struct Scene {
    /// Unique ID.
    id: Id,
    /// Scene name.
    pub name: String,
    /// Background clear color.
    pub background: Color,
    /// Lights. Shading consumes only the first one.
    pub lights: Vec<Light>,
    /// Ambient color applied to every surface.
    pub ambient: Color,
    /// Ambient intensity multiplier.
    pub ambient_intensity: f32,
    models: Vec<Model>,
}

impl Scene {
    /// Create an empty scene with one default light.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            background: Color::rgb(0.1, 0.1, 0.1),
            lights: vec![Light::default()],
            ambient: Color::WHITE,
            ambient_intensity: 0.15,
            models: Vec::new(),
        }
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Add a light. Only the first light in the list is consumed by
    /// shading; the rest are stored.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// The light consumed by shading, if any.
    #[inline]
    pub fn primary_light(&self) -> Option<&Light> {
        self.lights.first()
    }

    /// Add a model; returns its ID. Draw order is insertion order.
    pub fn add_model(&mut self, model: Model) -> Id {
        let id = model.id();
        self.models.push(model);
        id
    }

    /// Remove a model by ID.
    pub fn remove_model(&mut self, id: Id) -> Option<Model> {
        let index = self.models.iter().position(|m| m.id() == id)?;
        Some(self.models.remove(index))
    }

    /// Look up a model by ID.
    pub fn model(&self, id: Id) -> Option<&Model> {
        self.models.iter().find(|m| m.id() == id)
    }

    /// Look up a model mutably by ID.
    pub fn model_mut(&mut self, id: Id) -> Option<&mut Model> {
        self.models.iter_mut().find(|m| m.id() == id)
    }

    /// All models in draw order.
    #[inline]
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// All models, mutable.
    #[inline]
    pub fn models_mut(&mut self) -> &mut [Model] {
        &mut self.models
    }

    /// Number of models.
    #[inline]
    pub fn model_count(&self) -> u32 {
        self.models.len() as u32
    }

    /// Total triangles across all models.
    pub fn triangle_count(&self) -> u32 {
        self.models.iter().map(Model::triangle_count).sum()
    }

    /// Remove all models. Returns the registered mesh handles so the
    /// caller can release the GPU entries.
    pub fn clear(&mut self) -> Vec<MeshHandle> {
        let handles = self.release_meshes();
        self.models.clear();
        handles
    }

    /// Detach every registered mesh handle, returning them for release.
    /// The models become CPU-only and re-register on the next prepare.
    pub(crate) fn release_meshes(&mut self) -> Vec<MeshHandle> {
        self.models.iter_mut().filter_map(|m| m.mesh.take()).collect()
    }

    /// Advance the built-in animation: every model spins about +Y at
    /// `spin_rate` radians per second.
    pub fn update(&mut self, dt: f32, spin_rate: f32) {
        if dt <= 0.0 {
            return;
        }
        let angle = spin_rate * dt;
        for model in &mut self.models {
            model.transform.rotate_y(angle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::math::{Quaternion, Vector3};

    fn cube(name: &str) -> Model {
        Model::new(name, Shape::Cube { size: 1.0 }, Color::WHITE)
    }

    #[test]
    fn test_add_and_remove() {
        let mut scene = Scene::new("main");
        let id = scene.add_model(cube("a"));
        scene.add_model(cube("b"));
        assert_eq!(scene.model_count(), 2);

        let removed = scene.remove_model(id).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(scene.model_count(), 1);
        assert!(scene.remove_model(id).is_none());
    }

    #[test]
    fn test_insertion_order_is_draw_order() {
        let mut scene = Scene::new("main");
        scene.add_model(cube("first"));
        scene.add_model(cube("second"));
        scene.add_model(cube("third"));
        let names: Vec<&str> = scene.models().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_triangle_count_sums_models() {
        let mut scene = Scene::new("main");
        scene.add_model(cube("a"));
        scene.add_model(Model::new(
            "p",
            Shape::Pyramid {
                base: 1.0,
                height: 1.0,
            },
            Color::WHITE,
        ));
        assert_eq!(scene.triangle_count(), 12 + 6);
    }

    #[test]
    fn test_update_spins_models_about_y() {
        let mut scene = Scene::new("main");
        let id = scene.add_model(cube("a"));
        scene.update(2.0, 0.5);

        let model = scene.model(id).unwrap();
        let expected = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 1.0);
        assert!(model.transform.quaternion.approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_extra_lights_are_stored_but_first_is_primary() {
        let mut scene = Scene::new("main");
        let first = *scene.primary_light().unwrap();
        scene.add_light(Light::new(Vector3::new(-3.0, 1.0, 0.0), Color::RED, 2.0));
        assert_eq!(scene.lights.len(), 2);
        assert_eq!(*scene.primary_light().unwrap(), first);
    }

    #[test]
    fn test_update_ignores_nonpositive_delta() {
        let mut scene = Scene::new("main");
        let id = scene.add_model(cube("a"));
        scene.update(-1.0, 0.5);
        let model = scene.model(id).unwrap();
        assert!(model.transform.quaternion.approx_eq(&Quaternion::IDENTITY, 1e-6));
    }
}

//! Named scene registry with one active scene and a shared camera.

use std::collections::HashMap;

use super::Scene;
use crate::camera::PerspectiveCamera;
use crate::core::EngineError;
use crate::gpu::MeshHandle;

/// Owns every scene by name, tracks which one is active, and holds the
/// camera shared across scenes.
///
/// Dropping a scene never drops GPU entries directly; the mesh handles
/// of discarded models are queued and must be drained through
/// [`SceneManager::take_orphaned_meshes`] and released explicitly.
pub struct SceneManager {
    scenes: HashMap<String, Scene>,
    active: Option<String>,
    camera: PerspectiveCamera,
    orphaned: Vec<MeshHandle>,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneManager {
    /// Create an empty manager with a default camera.
    pub fn new() -> Self {
        Self {
            scenes: HashMap::new(),
            active: None,
            camera: PerspectiveCamera::default(),
            orphaned: Vec::new(),
        }
    }

    /// Create a scene under `name`. An existing scene with the same name
    /// is replaced and its mesh handles are queued for release. The
    /// first scene created becomes active.
    pub fn create_scene(&mut self, name: &str) -> &mut Scene {
        if let Some(mut old) = self.scenes.remove(name) {
            log::warn!("scene '{name}' already exists, replacing it");
            self.orphaned.extend(old.release_meshes());
        }
        self.scenes.insert(name.to_string(), Scene::new(name));
        if self.active.is_none() {
            self.active = Some(name.to_string());
        }
        self.scenes.get_mut(name).expect("scene was just inserted")
    }

    /// Make the named scene active.
    pub fn set_active(&mut self, name: &str) -> Result<(), EngineError> {
        if !self.scenes.contains_key(name) {
            return Err(EngineError::SceneNotFound(name.to_string()));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    /// Name of the active scene.
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The active scene.
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.as_ref().and_then(|name| self.scenes.get(name))
    }

    /// The active scene, mutable.
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        let name = self.active.as_ref()?;
        self.scenes.get_mut(name)
    }

    /// Look up a scene by name.
    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    /// Look up a scene mutably by name.
    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(name)
    }

    /// Remove a scene. Removing the active scene leaves no scene active.
    ///
    /// The removed scene's mesh handles are queued for release; its
    /// models come back CPU-only and re-register if the scene is added
    /// again.
    pub fn remove_scene(&mut self, name: &str) -> Option<Scene> {
        let mut scene = self.scenes.remove(name)?;
        self.orphaned.extend(scene.release_meshes());
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
        Some(scene)
    }

    /// Drain the mesh handles of every scene dropped since the last
    /// drain, so the caller can free their registry entries.
    pub fn take_orphaned_meshes(&mut self) -> Vec<MeshHandle> {
        std::mem::take(&mut self.orphaned)
    }

    /// Number of scenes.
    #[inline]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// The shared camera.
    #[inline]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// The shared camera, mutable.
    #[inline]
    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    /// The active scene together with the camera, for rendering.
    pub fn render_views(&mut self) -> Option<(&mut Scene, &mut PerspectiveCamera)> {
        let name = self.active.as_ref()?;
        let scene = self.scenes.get_mut(name)?;
        Some((scene, &mut self.camera))
    }

    /// Advance the active scene's animation and refresh the camera.
    pub fn update(&mut self, dt: f32, spin_rate: f32) {
        if let Some(scene) = self.active_scene_mut() {
            scene.update(dt, spin_rate);
        }
        // Touching the matrices here keeps them fresh for this frame.
        self.camera.view_projection_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::math::Color;
    use crate::scene::Model;

    #[test]
    fn test_first_scene_becomes_active() {
        let mut manager = SceneManager::new();
        manager.create_scene("s1");
        manager.create_scene("s2");
        assert_eq!(manager.active_name(), Some("s1"));
    }

    #[test]
    fn test_create_scene_overwrites_duplicate() {
        let mut manager = SceneManager::new();
        manager
            .create_scene("s1")
            .add_model(Model::new("box", Shape::Cube { size: 1.0 }, Color::WHITE));
        assert_eq!(manager.scene("s1").unwrap().model_count(), 1);

        manager.create_scene("s1");
        assert_eq!(manager.scene_count(), 1);
        assert_eq!(manager.scene("s1").unwrap().model_count(), 0);
    }

    #[test]
    fn test_set_active_unknown_scene_fails() {
        let mut manager = SceneManager::new();
        manager.create_scene("s1");
        let err = manager.set_active("nope").unwrap_err();
        assert!(matches!(err, EngineError::SceneNotFound(name) if name == "nope"));
        assert_eq!(manager.active_name(), Some("s1"));
    }

    #[test]
    fn test_counts_follow_active_scene() {
        let mut manager = SceneManager::new();
        manager
            .create_scene("s1")
            .add_model(Model::new("box", Shape::Cube { size: 1.0 }, Color::WHITE));
        manager.create_scene("s2");
        manager.set_active("s2").unwrap();
        assert_eq!(manager.active_scene().unwrap().model_count(), 0);

        manager.set_active("s1").unwrap();
        assert_eq!(manager.active_scene().unwrap().model_count(), 1);
        assert_eq!(manager.active_scene().unwrap().triangle_count(), 12);
    }

    #[test]
    fn test_dropped_scenes_queue_their_meshes_for_release() {
        use crate::geometry::build_cube;
        use crate::gpu::Resources;

        let mut resources = Resources::new();
        let handle = resources
            .register(build_cube(1.0, Color::WHITE).unwrap())
            .unwrap();

        let mut manager = SceneManager::new();
        let scene = manager.create_scene("s1");
        let id = scene.add_model(Model::new("box", Shape::Cube { size: 1.0 }, Color::WHITE));
        scene.model_mut(id).unwrap().mesh = Some(handle);

        manager.create_scene("s1");
        assert_eq!(manager.take_orphaned_meshes(), vec![handle]);
        // A second drain is empty.
        assert!(manager.take_orphaned_meshes().is_empty());
    }

    #[test]
    fn test_remove_active_scene_clears_active() {
        let mut manager = SceneManager::new();
        manager.create_scene("s1");
        manager.remove_scene("s1");
        assert!(manager.active_name().is_none());
        assert!(manager.active_scene().is_none());
    }
}

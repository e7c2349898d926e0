//! The engine driver: owns the context, renderer, and scenes, and runs
//! the frame loop.

use super::{Clock, EngineConfig, EngineError, EngineEvent, FrameTimer, Id, Stats};
use crate::gpu::Context;
use crate::renderer::Renderer;
use crate::scene::{Model, Scene, SceneDocument, SceneManager};

/// State of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Not ticking.
    Stopped,
    /// Ticking and animating.
    Running,
    /// Ticking but animation is frozen.
    Paused,
}

/// The render core driver.
///
/// Constructible without a GPU; [`Engine::initialize`] acquires the
/// context. Until then ticks advance animation and statistics only,
/// which keeps scene logic testable headlessly.
pub struct Engine {
    config: EngineConfig,
    context: Option<Context>,
    renderer: Renderer,
    scenes: SceneManager,
    clock: Clock,
    timer: FrameTimer,
    state: LoopState,
    context_lost: bool,
    over_budget: bool,
    events: Vec<EngineEvent>,
}

impl Engine {
    /// Create an engine with no GPU context.
    pub fn new(config: EngineConfig) -> Self {
        let renderer = Renderer::new(&config);
        Self {
            config,
            context: None,
            renderer,
            scenes: SceneManager::new(),
            clock: Clock::new(),
            timer: FrameTimer::new(),
            state: LoopState::Stopped,
            context_lost: false,
            over_budget: false,
            events: Vec::new(),
        }
    }

    /// Acquire a GPU context for a render target and compile the shaders.
    ///
    /// Fatal if no adapter or device can be acquired. Individual shader
    /// compile failures are surfaced as events and fall back to the
    /// default program.
    pub async fn initialize<W>(
        &mut self,
        target: W,
        width: u32,
        height: u32,
    ) -> Result<(), EngineError>
    where
        W: Into<wgpu::SurfaceTarget<'static>>,
    {
        let context = Context::new(target, width, height, &self.config).await?;
        let aspect = context.aspect_ratio();
        for failure in self.renderer.initialize(&context) {
            self.push_shader_event(failure);
        }
        self.context = Some(context);
        self.context_lost = false;
        self.scenes.camera_mut().set_aspect(aspect)?;
        if self.scenes.scene_count() == 0 {
            self.create_default_scene();
        }
        Ok(())
    }

    /// Build the starter scene: a pyramid flanked by two cubes and a
    /// sphere, under the default light. Becomes active if no scene is.
    pub fn create_default_scene(&mut self) -> &mut Scene {
        use crate::geometry::Shape;
        use crate::math::{Color, Vector3};
        use crate::scene::Transform;

        let scene = self.scenes.create_scene("default");
        scene.add_model(
            Model::new(
                "pyramid",
                Shape::Pyramid {
                    base: 1.2,
                    height: 1.5,
                },
                Color::rgb(0.9, 0.7, 0.2),
            )
            .with_transform(Transform::from_position(Vector3::new(0.0, 0.0, 0.0))),
        );
        scene.add_model(
            Model::new("cube-left", Shape::Cube { size: 1.0 }, Color::rgb(0.8, 0.2, 0.2))
                .with_transform(Transform::from_position(Vector3::new(-2.0, 0.0, 0.0))),
        );
        scene.add_model(
            Model::new("cube-right", Shape::Cube { size: 1.0 }, Color::rgb(0.2, 0.4, 0.8))
                .with_transform(Transform::from_position(Vector3::new(2.0, 0.0, 0.0))),
        );
        scene.add_model(
            Model::new(
                "sphere",
                Shape::Sphere {
                    radius: 0.6,
                    segments: 24,
                },
                Color::rgb(0.3, 0.8, 0.4),
            )
            .with_transform(Transform::from_position(Vector3::new(0.0, 1.8, 0.0))),
        );
        scene
    }

    /// Start the frame loop.
    pub fn start(&mut self) {
        if self.state == LoopState::Stopped {
            self.clock.start();
        }
        self.state = LoopState::Running;
    }

    /// Freeze animation. Paused frames still render and present so the
    /// last state stays on screen after a resize or expose; use
    /// [`Engine::stop`] to suspend ticking entirely.
    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Paused;
        }
    }

    /// Resume from pause.
    pub fn resume(&mut self) {
        if self.state == LoopState::Paused {
            self.state = LoopState::Running;
        }
    }

    /// Stop the frame loop and the clock.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.state = LoopState::Stopped;
    }

    /// Current loop state.
    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run one frame using the wall clock.
    pub fn tick(&mut self) -> Result<(), EngineError> {
        let dt = self.clock.get_delta() as f32;
        self.step(dt)
    }

    /// Run one frame with an explicit delta, for hosts that drive their
    /// own clock.
    pub fn step(&mut self, dt: f32) -> Result<(), EngineError> {
        if self.state == LoopState::Stopped {
            return Ok(());
        }
        self.timer.record(dt);

        // Scenes dropped through the manager since the last frame.
        self.free_orphaned_meshes();

        for failure in self.renderer.textures_mut().poll_pending() {
            if let EngineError::TextureDecode { name, reason } = failure {
                self.events.push(EngineEvent::TextureLoadError {
                    name,
                    message: reason,
                });
            }
        }

        if self.state == LoopState::Running {
            self.scenes.update(dt, self.config.spin_rate);
        }

        // Frames are dropped while the context is lost.
        if self.context_lost {
            return Ok(());
        }

        if let Some(context) = self.context.as_ref() {
            if let Some((scene, camera)) = self.scenes.render_views() {
                match self.renderer.render(context, scene, camera) {
                    Ok(()) => {}
                    Err(EngineError::ContextLost) => {
                        self.handle_context_loss();
                        return Ok(());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.check_memory_budget();
        Ok(())
    }

    /// Mark the context lost: GPU handles are dropped, CPU data is
    /// retained, and frames are skipped until [`Engine::recover`].
    pub fn handle_context_loss(&mut self) {
        if self.context_lost {
            return;
        }
        log::warn!("GPU context lost, dropping frames until recovery");
        self.context_lost = true;
        self.renderer.invalidate();
        self.events.push(EngineEvent::ContextLost);
    }

    /// Rebuild GPU state after a context loss: recompile shaders and
    /// re-upload retained meshes and textures.
    pub fn recover(&mut self) -> Result<(), EngineError> {
        if !self.context_lost {
            return Ok(());
        }
        if let Some(context) = self.context.as_ref() {
            for failure in self.renderer.recover(context)? {
                self.push_shader_event(failure);
            }
        }
        self.context_lost = false;
        Ok(())
    }

    /// Whether frames are currently being dropped.
    #[inline]
    pub fn is_context_lost(&self) -> bool {
        self.context_lost
    }

    /// Resize the render target.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        if let Some(context) = self.context.as_mut() {
            context.resize(width, height);
        }
        if let Some(context) = self.context.as_ref() {
            self.renderer.resize(context);
            self.scenes.camera_mut().set_aspect(context.aspect_ratio())?;
        } else if width > 0 && height > 0 {
            self.scenes
                .camera_mut()
                .set_aspect(width as f32 / height as f32)?;
        }
        Ok(())
    }

    /// Create a scene, replacing any scene with the same name. The
    /// replaced scene's meshes are freed from the registry.
    pub fn create_scene(&mut self, name: &str) -> &mut Scene {
        self.scenes.create_scene(name);
        self.free_orphaned_meshes();
        self.scenes.scene_mut(name).expect("scene was just created")
    }

    /// Remove a named scene, freeing its models' meshes. Returns false
    /// if no scene has that name.
    pub fn remove_scene(&mut self, name: &str) -> bool {
        let removed = self.scenes.remove_scene(name).is_some();
        self.free_orphaned_meshes();
        removed
    }

    /// Make the named scene active.
    pub fn set_active_scene(&mut self, name: &str) -> Result<(), EngineError> {
        self.scenes.set_active(name)
    }

    /// Add a model to a named scene.
    pub fn add_model(&mut self, scene: &str, model: Model) -> Result<Id, EngineError> {
        let scene = self
            .scenes
            .scene_mut(scene)
            .ok_or_else(|| EngineError::SceneNotFound(scene.to_string()))?;
        Ok(scene.add_model(model))
    }

    /// Remove a model from a named scene, freeing its mesh.
    pub fn remove_model(&mut self, scene: &str, id: Id) -> Result<(), EngineError> {
        let scene = self
            .scenes
            .scene_mut(scene)
            .ok_or_else(|| EngineError::SceneNotFound(scene.to_string()))?;
        let model = scene
            .remove_model(id)
            .ok_or_else(|| EngineError::invalid(format!("no model with id {id}")))?;
        if let Some(mesh) = model.mesh() {
            self.renderer.resources_mut().free(mesh);
        }
        Ok(())
    }

    /// Load a scene document, registering the scene under its name.
    pub fn load_scene_document(&mut self, json: &str) -> Result<(), EngineError> {
        let scene = SceneDocument::from_json(json)?.into_scene()?;
        let name = scene.name.clone();
        if self.scenes.scene(&name).is_some() {
            log::warn!("scene '{name}' already exists, replacing it");
            self.scenes.remove_scene(&name);
        }
        self.scenes.create_scene(&name);
        *self.scenes.scene_mut(&name).expect("scene was just created") = scene;
        self.free_orphaned_meshes();
        Ok(())
    }

    /// Free registry entries for meshes whose scenes have been dropped.
    fn free_orphaned_meshes(&mut self) {
        for handle in self.scenes.take_orphaned_meshes() {
            self.renderer.resources_mut().free(handle);
        }
    }

    /// Snapshot a named scene as a JSON document.
    pub fn save_scene_document(&self, name: &str) -> Result<String, EngineError> {
        let scene = self
            .scenes
            .scene(name)
            .ok_or_else(|| EngineError::SceneNotFound(name.to_string()))?;
        SceneDocument::from_scene(scene).to_json()
    }

    /// A synchronous snapshot of the current statistics.
    pub fn stats(&self) -> Stats {
        let (model_count, triangle_count) = self
            .scenes
            .active_scene()
            .map(|s| (s.model_count(), s.triangle_count()))
            .unwrap_or((0, 0));
        Stats {
            fps: self.timer.fps(),
            frame_time_ms: self.timer.frame_time_ms(),
            draw_calls: self.renderer.info().draw_calls,
            triangle_count,
            model_count,
            gpu_memory_bytes: self.renderer.gpu_memory_bytes(),
        }
    }

    /// Drain the events recorded since the last call.
    pub fn poll_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// The scene registry.
    #[inline]
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// The scene registry, mutable.
    #[inline]
    pub fn scenes_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    /// The renderer.
    #[inline]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// The renderer, mutable.
    #[inline]
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// The engine configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Stop the loop and release every GPU resource. Idempotent.
    pub fn dispose(&mut self) {
        self.stop();
        self.renderer.dispose();
        self.context = None;
    }

    fn push_shader_event(&mut self, failure: EngineError) {
        if let EngineError::Shader { name, diagnostic } = failure {
            self.events.push(EngineEvent::ShaderCompileError {
                name,
                message: diagnostic,
            });
        }
    }

    fn check_memory_budget(&mut self) {
        let used = self.renderer.gpu_memory_bytes();
        let limit = self.config.memory_limit_bytes;
        if used > limit {
            if !self.over_budget {
                self.over_budget = true;
                self.events.push(EngineEvent::MemoryWarning {
                    used_bytes: used,
                    limit_bytes: limit,
                });
            }
        } else {
            self.over_budget = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::math::{Color, Quaternion, Vector3};

    fn cube(name: &str) -> Model {
        Model::new(name, Shape::Cube { size: 1.0 }, Color::WHITE)
    }

    #[test]
    fn test_headless_scene_scenario() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.create_scene("s1");
        engine.add_model("s1", cube("box")).unwrap();
        engine.set_active_scene("s1").unwrap();

        let stats = engine.stats();
        assert_eq!(stats.model_count, 1);
        assert_eq!(stats.triangle_count, 12);
        assert_eq!(stats.gpu_memory_bytes, 0);
    }

    #[test]
    fn test_scene_replacement_frees_registered_meshes() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.create_scene("s1");
        engine.add_model("s1", cube("box")).unwrap();
        engine.set_active_scene("s1").unwrap();

        // Register the mesh through the headless draw-list path.
        let (scene, _camera) = engine.scenes.render_views().unwrap();
        engine.renderer.prepare(scene).unwrap();
        assert_eq!(engine.renderer.resources().len(), 1);

        engine.create_scene("s1");
        assert_eq!(engine.renderer.resources().len(), 0);
    }

    #[test]
    fn test_remove_scene_frees_registered_meshes() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.create_scene("s1");
        engine.add_model("s1", cube("box")).unwrap();
        engine.set_active_scene("s1").unwrap();

        let (scene, _camera) = engine.scenes.render_views().unwrap();
        engine.renderer.prepare(scene).unwrap();
        assert_eq!(engine.renderer.resources().len(), 1);

        assert!(engine.remove_scene("s1"));
        assert_eq!(engine.renderer.resources().len(), 0);
        assert!(!engine.remove_scene("s1"));
    }

    #[test]
    fn test_add_model_to_missing_scene_fails() {
        let mut engine = Engine::new(EngineConfig::default());
        let err = engine.add_model("ghost", cube("box")).unwrap_err();
        assert!(matches!(err, EngineError::SceneNotFound(name) if name == "ghost"));
    }

    #[test]
    fn test_step_advances_animation_only_when_running() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.create_scene("s1");
        let id = engine.add_model("s1", cube("box")).unwrap();

        // Stopped: nothing moves.
        engine.step(1.0).unwrap();
        let q = engine.scenes().scene("s1").unwrap().model(id).unwrap().transform.quaternion;
        assert!(q.approx_eq(&Quaternion::IDENTITY, 1e-6));

        engine.start();
        engine.step(2.0).unwrap();
        let expected = Quaternion::from_axis_angle(&Vector3::UNIT_Y, 1.0);
        let q = engine.scenes().scene("s1").unwrap().model(id).unwrap().transform.quaternion;
        assert!(q.approx_eq(&expected, 1e-5));

        // Paused: frozen again.
        engine.pause();
        engine.step(2.0).unwrap();
        let q = engine.scenes().scene("s1").unwrap().model(id).unwrap().transform.quaternion;
        assert!(q.approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_context_loss_drops_frames_and_recovers() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut engine = Engine::new(EngineConfig::default());
        engine.create_scene("s1");
        engine.add_model("s1", cube("box")).unwrap();
        engine.start();

        engine.handle_context_loss();
        assert!(engine.is_context_lost());
        assert!(engine
            .poll_events()
            .contains(&EngineEvent::ContextLost));

        // Ticks are still safe while lost.
        engine.step(0.016).unwrap();

        // Headless recovery clears the flag; shader sources and mesh data
        // were retained.
        engine.recover().unwrap();
        assert!(!engine.is_context_lost());
        assert_eq!(engine.renderer().shaders().len(), 3);
    }

    #[test]
    fn test_texture_decode_failure_becomes_event() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.start();
        engine
            .renderer_mut()
            .textures_mut()
            .queue_load("photo", vec![0, 1, 2]);
        engine.step(0.016).unwrap();

        let events = engine.poll_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::TextureLoadError { name, .. } if name == "photo")));
    }

    #[test]
    fn test_scene_document_round_trip_through_engine() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.create_scene("s1");
        engine.add_model("s1", cube("box")).unwrap();

        let json = engine.save_scene_document("s1").unwrap();
        let mut other = Engine::new(EngineConfig::default());
        other.load_scene_document(&json).unwrap();
        assert_eq!(other.scenes().scene("s1").unwrap().model_count(), 1);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut engine = Engine::new(EngineConfig::default());
        engine.create_scene("s1");
        engine.add_model("s1", cube("box")).unwrap();
        engine.dispose();
        engine.dispose();
        assert_eq!(engine.stats().gpu_memory_bytes, 0);
        assert_eq!(engine.state(), LoopState::Stopped);
    }
}

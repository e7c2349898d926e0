//! # Prism - A Retained-Mode 3D Render Core
//!
//! Prism is a small retained-mode rendering core built on wgpu. Scenes
//! hold procedural models (cubes, pyramids, spheres) that the renderer
//! draws each frame with a single light, while CPU-side copies of every
//! mesh, shader source, and texture make the engine recoverable after a
//! GPU context loss.
//!
//! ## Example
//!
//! ```ignore
//! use prism::prelude::*;
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.initialize(window, 1280, 720).await?;
//!
//! engine.create_scene("main");
//! engine.add_model(
//!     "main",
//!     Model::new("box", Shape::Cube { size: 1.0 }, Color::RED),
//! )?;
//! engine.set_active_scene("main")?;
//!
//! engine.start();
//! loop {
//!     engine.tick()?;
//! }
//! ```

#![warn(missing_docs)]

pub mod camera;
pub mod core;
pub mod geometry;
pub mod gpu;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod texture;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::camera::*;
    pub use crate::core::*;
    pub use crate::geometry::*;
    pub use crate::gpu::*;
    pub use crate::math::*;
    pub use crate::renderer::*;
    pub use crate::scene::*;
    pub use crate::shader::*;
    pub use crate::texture::*;
}

/// Engine version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const NAME: &str = "Prism";

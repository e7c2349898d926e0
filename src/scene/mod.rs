//! # Scene Module
//!
//! Scenes, models, lighting, the scene registry, and JSON documents.

mod document;
mod light;
mod manager;
mod model;
#[allow(clippy::module_inception)]
mod scene;
mod transform;

pub use document::{ModelDocument, SceneDocument};
pub use light::Light;
pub use manager::SceneManager;
pub use model::Model;
pub use scene::Scene;
pub use transform::Transform;

//! A renderable model: shape, appearance, and transform.

use super::Transform;
use crate::core::Id;
use crate::geometry::Shape;
use crate::gpu::MeshHandle;
use crate::math::Color;
use crate::shader::DEFAULT_PROGRAM;

/// A model in a scene.
///
/// The mesh handle is assigned when the model is first prepared for
/// rendering; until then the model is CPU-only.
#[derive(Debug, Clone)]
pub struct Model {
    /// Unique ID.
    id: Id,
    /// Display name.
    pub name: String,
    /// Procedural shape.
    pub shape: Shape,
    /// Uniform vertex color used when building the mesh.
    pub color: Color,
    /// Shader program name.
    pub shader: String,
    /// Transform.
    pub transform: Transform,
    /// Whether the model is drawn.
    pub visible: bool,
    /// Free-form host metadata carried through scene documents.
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Registered mesh, once uploaded.
    pub(crate) mesh: Option<MeshHandle>,
}

impl Model {
    /// Create a model with the default shader.
    pub fn new(name: impl Into<String>, shape: Shape, color: Color) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            shape,
            color,
            shader: DEFAULT_PROGRAM.to_string(),
            transform: Transform::new(),
            visible: true,
            properties: serde_json::Map::new(),
            mesh: None,
        }
    }

    /// Set the shader program name.
    pub fn with_shader(mut self, shader: impl Into<String>) -> Self {
        self.shader = shader.into();
        self
    }

    /// Set the initial transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The registered mesh handle, if any.
    #[inline]
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    /// Triangle count of the model's shape.
    pub fn triangle_count(&self) -> u32 {
        match self.shape {
            Shape::Cube { .. } => 12,
            Shape::Pyramid { .. } => 6,
            Shape::Sphere { segments, .. } => 2 * segments * segments,
        }
    }

    /// Vertex count of the model's shape.
    pub fn vertex_count(&self) -> u32 {
        match self.shape {
            Shape::Cube { .. } => 24,
            Shape::Pyramid { .. } => 16,
            Shape::Sphere { segments, .. } => (segments + 1) * (segments + 1),
        }
    }
}

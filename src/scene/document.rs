//! Scene serialization to and from JSON documents.

use serde::{Deserialize, Serialize};

use super::{Light, Model, Scene, Transform};
use crate::core::EngineError;
use crate::geometry::Shape;
use crate::math::{Color, Euler, Vector3};

/// A serializable snapshot of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Display name.
    pub name: String,
    /// Procedural shape.
    pub shape: Shape,
    /// Uniform vertex color.
    pub color: Color,
    /// Shader program name.
    pub shader: String,
    /// Position.
    pub position: Vector3,
    /// Rotation as Euler angles.
    pub rotation: Euler,
    /// Scale.
    pub scale: Vector3,
    /// Whether the model is drawn.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Free-form host metadata, passed through untouched.
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

fn default_visible() -> bool {
    true
}

/// A serializable snapshot of one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Scene name.
    pub name: String,
    /// Background clear color.
    pub background: Color,
    /// Lights; shading consumes only the first.
    pub lights: Vec<Light>,
    /// Ambient color.
    pub ambient: Color,
    /// Ambient intensity multiplier.
    pub ambient_intensity: f32,
    /// Models in draw order.
    pub models: Vec<ModelDocument>,
}

impl SceneDocument {
    /// Snapshot a scene.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            name: scene.name.clone(),
            background: scene.background,
            lights: scene.lights.clone(),
            ambient: scene.ambient,
            ambient_intensity: scene.ambient_intensity,
            models: scene
                .models()
                .iter()
                .map(|m| ModelDocument {
                    name: m.name.clone(),
                    shape: m.shape,
                    color: m.color,
                    shader: m.shader.clone(),
                    position: m.transform.position,
                    rotation: m.transform.rotation,
                    scale: m.transform.scale,
                    visible: m.visible,
                    properties: m.properties.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild a scene from this document. Shape parameters are
    /// validated by building each mesh description.
    pub fn into_scene(self) -> Result<Scene, EngineError> {
        let mut scene = Scene::new(self.name);
        scene.background = self.background;
        scene.lights = self.lights;
        scene.ambient = self.ambient;
        scene.ambient_intensity = self.ambient_intensity;

        for doc in self.models {
            // Reject documents carrying degenerate shape parameters.
            doc.shape.build(doc.color)?;
            let mut model = Model::new(doc.name, doc.shape, doc.color).with_shader(doc.shader);
            model.transform = Transform::from_components(doc.position, doc.rotation, doc.scale);
            model.visible = doc.visible;
            model.properties = doc.properties;
            scene.add_model(model);
        }
        Ok(scene)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::invalid(format!("scene document serialization: {e}")))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::invalid(format!("scene document parse: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scene() -> Scene {
        let mut scene = Scene::new("main");
        scene.background = Color::rgb(0.2, 0.3, 0.4);
        scene.add_light(Light::new(Vector3::new(-4.0, 2.0, 1.0), Color::GREEN, 0.5));
        let mut model = Model::new("box", Shape::Cube { size: 2.0 }, Color::RED);
        model.transform.set_position(1.0, 0.0, -3.0);
        scene.add_model(model);
        scene.add_model(Model::new(
            "ball",
            Shape::Sphere {
                radius: 1.0,
                segments: 12,
            },
            Color::BLUE,
        ));
        scene
    }

    #[test]
    fn test_document_round_trip_preserves_scene() {
        let scene = sample_scene();
        let json = SceneDocument::from_scene(&scene).to_json().unwrap();
        let restored = SceneDocument::from_json(&json).unwrap().into_scene().unwrap();

        assert_eq!(restored.name, scene.name);
        assert_eq!(restored.lights, scene.lights);
        assert_eq!(restored.model_count(), scene.model_count());
        assert_eq!(restored.triangle_count(), scene.triangle_count());
        assert_eq!(restored.models()[0].name, "box");
        assert!(restored.models()[0]
            .transform
            .position
            .approx_eq(&Vector3::new(1.0, 0.0, -3.0), 1e-6));
    }

    #[test]
    fn test_document_rejects_degenerate_shape() {
        let json = r#"{
            "name": "bad",
            "background": {"r": 0.0, "g": 0.0, "b": 0.0, "a": 1.0},
            "lights": [{
                "position": {"x": 0.0, "y": 5.0, "z": 0.0},
                "color": {"r": 1.0, "g": 1.0, "b": 1.0, "a": 1.0},
                "intensity": 1.0
            }],
            "ambient": {"r": 1.0, "g": 1.0, "b": 1.0, "a": 1.0},
            "ambient_intensity": 0.1,
            "models": [{
                "name": "broken",
                "shape": {"type": "sphere", "radius": -1.0, "segments": 8},
                "color": {"r": 1.0, "g": 1.0, "b": 1.0, "a": 1.0},
                "shader": "lit",
                "position": {"x": 0.0, "y": 0.0, "z": 0.0},
                "rotation": {"x": 0.0, "y": 0.0, "z": 0.0},
                "scale": {"x": 1.0, "y": 1.0, "z": 1.0}
            }]
        }"#;
        let document = SceneDocument::from_json(json).unwrap();
        assert!(matches!(
            document.into_scene(),
            Err(EngineError::InvalidArgument(_))
        ));
    }
}

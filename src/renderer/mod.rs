//! # Renderer Module
//!
//! Owns the GPU-facing caches (mesh registry, shader library, texture
//! cache) and turns the active scene into draw calls.
//!
//! Frame building is split in two: [`Renderer::prepare`] produces the
//! CPU-side draw list without touching the GPU, and [`Renderer::render`]
//! encodes that list into a render pass. The split keeps draw-call
//! accounting and context-loss recovery testable without a device.

use bytemuck::{Pod, Zeroable};
use wgpu::util::BufferInitDescriptor;

use crate::camera::PerspectiveCamera;
use crate::core::{EngineConfig, EngineError, Id};
use crate::gpu::{Context, MeshHandle, Resources};
use crate::math::{Color, Matrix4};
use crate::scene::Scene;
use crate::shader::ShaderLibrary;
use crate::texture::TextureManager;

/// Per-frame uniforms shared by every draw call.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    light_position: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
}

/// Per-model uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

/// One pending draw call.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    /// ID of the source model.
    pub model_id: Id,
    /// Mesh to draw.
    pub mesh: MeshHandle,
    /// Shader program name, unresolved.
    pub shader: String,
    /// Model matrix.
    pub matrix: Matrix4,
    /// Number of indices to draw.
    pub index_count: u32,
    /// Number of triangles this call covers.
    pub triangles: u32,
}

/// Statistics for the most recent frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderInfo {
    /// Draw calls issued.
    pub draw_calls: u32,
    /// Triangles submitted.
    pub triangles: u32,
    /// Frame number.
    pub frame: u64,
}

impl RenderInfo {
    /// Reset the per-frame counters.
    pub fn reset(&mut self) {
        self.draw_calls = 0;
        self.triangles = 0;
    }
}

/// The retained-mode renderer.
pub struct Renderer {
    resources: Resources,
    shaders: ShaderLibrary,
    textures: TextureManager,
    depth_texture: Option<wgpu::Texture>,
    depth_view: Option<wgpu::TextureView>,
    info: RenderInfo,
    clear_color: Color,
}

impl Renderer {
    /// Create a renderer. No GPU work happens until [`Renderer::initialize`].
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            resources: Resources::new(),
            shaders: ShaderLibrary::new(),
            textures: TextureManager::new(),
            depth_texture: None,
            depth_view: None,
            info: RenderInfo::default(),
            clear_color: config.clear_color,
        }
    }

    /// Compile shaders and create the depth buffer against a fresh context.
    ///
    /// Returns shader compile failures; those programs fall back to the
    /// default at draw time.
    pub fn initialize(&mut self, context: &Context) -> Vec<EngineError> {
        let failures = self.shaders.compile_all(context);
        let depth_texture = context.create_depth_texture();
        self.depth_view = Some(depth_texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.depth_texture = Some(depth_texture);
        failures
    }

    /// Build the draw list for a scene.
    ///
    /// Registers meshes for models that do not have one yet and emits one
    /// command per visible model, in scene order. CPU only.
    pub fn prepare(&mut self, scene: &mut Scene) -> Result<Vec<DrawCommand>, EngineError> {
        let mut commands = Vec::new();
        for model in scene.models_mut() {
            if !model.visible {
                continue;
            }
            let mesh = match model.mesh() {
                Some(handle) => handle,
                None => {
                    let data = model.shape.build(model.color)?;
                    let handle = self.resources.register(data)?;
                    model.mesh = Some(handle);
                    handle
                }
            };
            let index_count = self
                .resources
                .data(mesh)
                .map(|d| d.indices.len() as u32)
                .ok_or(EngineError::ResourceDisposed)?;

            commands.push(DrawCommand {
                model_id: model.id(),
                mesh,
                shader: model.shader.clone(),
                matrix: *model.transform.matrix(),
                index_count,
                triangles: index_count / 3,
            });
        }
        Ok(commands)
    }

    /// Render a scene with the given camera and present the frame.
    pub fn render(
        &mut self,
        context: &Context,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
    ) -> Result<(), EngineError> {
        self.info.reset();
        self.info.frame += 1;

        let commands = self.prepare(scene)?;
        self.resources.upload_all(context)?;
        self.textures.upload_all(context);

        let globals_layout = self
            .shaders
            .globals_layout()
            .ok_or(EngineError::ContextLost)?;
        let model_layout = self
            .shaders
            .model_layout()
            .ok_or(EngineError::ContextLost)?;
        let depth_view = self.depth_view.as_ref().ok_or(EngineError::ContextLost)?;

        let output = match context.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                return Err(EngineError::ContextLost);
            }
            Err(e) => return Err(EngineError::ContextUnavailable(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Only the first light contributes; a lightless scene shades from
        // the ambient term alone.
        let light = scene.primary_light().copied().unwrap_or(crate::scene::Light {
            intensity: 0.0,
            ..Default::default()
        });
        let globals = GlobalsUniform {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            light_position: [light.position.x, light.position.y, light.position.z, 1.0],
            light_color: [light.color.r, light.color.g, light.color.b, light.intensity],
            ambient: [
                scene.ambient.r,
                scene.ambient.g,
                scene.ambient.b,
                scene.ambient_intensity,
            ],
        };
        let globals_buffer = context.create_buffer_init(&BufferInitDescriptor {
            label: Some("Globals Uniform Buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let globals_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        // Per-model uniforms have to outlive the render pass, so they are
        // built up front.
        let mut model_buffers = Vec::with_capacity(commands.len());
        let mut model_bind_groups = Vec::with_capacity(commands.len());
        for command in &commands {
            let uniform = ModelUniform {
                model: command.matrix.to_cols_array_2d(),
            };
            let buffer = context.create_buffer_init(&BufferInitDescriptor {
                label: Some("Model Uniform Buffer"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Model Bind Group"),
                layout: model_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            model_buffers.push(buffer);
            model_bind_groups.push(bind_group);
        }

        let clear = scene.background;
        let mut encoder = context.create_command_encoder();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: clear.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &globals_bind_group, &[]);
            for (i, command) in commands.iter().enumerate() {
                let program = match self.shaders.resolve(&command.shader) {
                    Some(program) => program,
                    None => continue,
                };
                let pipeline = match program.pipeline.as_ref() {
                    Some(pipeline) => pipeline,
                    None => continue,
                };
                let gpu_mesh = match self.resources.gpu_mesh(command.mesh) {
                    Some(mesh) => mesh,
                    None => continue,
                };

                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &model_bind_groups[i], &[]);
                pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..command.index_count, 0, 0..1);

                self.info.draw_calls += 1;
                self.info.triangles += command.triangles;
            }
        }

        context.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Recreate the depth buffer after a surface resize.
    pub fn resize(&mut self, context: &Context) {
        let depth_texture = context.create_depth_texture();
        self.depth_view = Some(depth_texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.depth_texture = Some(depth_texture);
    }

    /// Drop every GPU handle after a context loss. Retained CPU data
    /// (mesh data, shader sources, texture pixels) survives.
    pub fn invalidate(&mut self) {
        self.resources.invalidate();
        self.shaders.invalidate();
        self.textures.invalidate();
        self.depth_texture = None;
        self.depth_view = None;
    }

    /// Rebuild GPU state on a fresh context: recompile shaders and
    /// re-upload retained meshes and textures.
    pub fn recover(&mut self, context: &Context) -> Result<Vec<EngineError>, EngineError> {
        let failures = self.initialize(context);
        self.resources.upload_all(context)?;
        self.textures.upload_all(context);
        Ok(failures)
    }

    /// Release every GPU resource and cache. Idempotent.
    pub fn dispose(&mut self) {
        self.resources.dispose();
        self.shaders.dispose();
        self.textures.dispose();
        self.depth_texture = None;
        self.depth_view = None;
    }

    /// Statistics for the most recent frame.
    #[inline]
    pub fn info(&self) -> &RenderInfo {
        &self.info
    }

    /// Bytes of GPU memory currently held by meshes and textures.
    pub fn gpu_memory_bytes(&self) -> u64 {
        self.resources.gpu_memory_bytes() + self.textures.gpu_memory_bytes()
    }

    /// The mesh registry.
    #[inline]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// The mesh registry, mutable.
    #[inline]
    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    /// The shader library.
    #[inline]
    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    /// The shader library, mutable.
    #[inline]
    pub fn shaders_mut(&mut self) -> &mut ShaderLibrary {
        &mut self.shaders
    }

    /// The texture cache.
    #[inline]
    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    /// The texture cache, mutable.
    #[inline]
    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    /// The configured clear color, used when a scene has no background.
    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineConfig;
    use crate::geometry::Shape;
    use crate::scene::Model;

    fn scene_with_models(n: usize) -> Scene {
        let mut scene = Scene::new("test");
        for i in 0..n {
            scene.add_model(Model::new(
                format!("m{i}"),
                Shape::Cube { size: 1.0 },
                Color::WHITE,
            ));
        }
        scene
    }

    #[test]
    fn test_prepare_emits_one_command_per_visible_model() {
        let mut renderer = Renderer::new(&EngineConfig::default());
        let mut scene = scene_with_models(3);
        let commands = renderer.prepare(&mut scene).unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands.iter().map(|c| c.triangles).sum::<u32>(), 36);
    }

    #[test]
    fn test_prepare_skips_invisible_models() {
        let mut renderer = Renderer::new(&EngineConfig::default());
        let mut scene = scene_with_models(3);
        let id = scene.models()[1].id();
        scene.model_mut(id).unwrap().visible = false;

        let commands = renderer.prepare(&mut scene).unwrap();
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn test_prepare_registers_mesh_once() {
        let mut renderer = Renderer::new(&EngineConfig::default());
        let mut scene = scene_with_models(1);
        renderer.prepare(&mut scene).unwrap();
        renderer.prepare(&mut scene).unwrap();
        assert_eq!(renderer.resources().len(), 1);
    }

    #[test]
    fn test_draw_list_survives_invalidate() {
        // Context loss drops GPU handles but the retained mesh data keeps
        // the draw list intact, so recovery re-issues every draw call.
        let mut renderer = Renderer::new(&EngineConfig::default());
        let mut scene = scene_with_models(4);
        renderer.prepare(&mut scene).unwrap();

        renderer.invalidate();
        assert_eq!(renderer.gpu_memory_bytes(), 0);

        let commands = renderer.prepare(&mut scene).unwrap();
        assert_eq!(commands.len(), scene.model_count() as usize);
    }

    #[test]
    fn test_dispose_clears_caches() {
        let mut renderer = Renderer::new(&EngineConfig::default());
        let mut scene = scene_with_models(2);
        renderer.prepare(&mut scene).unwrap();
        renderer.textures_mut().create_solid("white", Color::WHITE);

        renderer.dispose();
        assert_eq!(renderer.gpu_memory_bytes(), 0);
        assert!(renderer.resources().is_empty());
        assert!(renderer.shaders().is_empty());
        assert!(renderer.textures().is_empty());
    }

    #[test]
    fn test_prepare_propagates_shape_errors() {
        let mut renderer = Renderer::new(&EngineConfig::default());
        let mut scene = Scene::new("bad");
        scene.add_model(Model::new(
            "broken",
            Shape::Sphere {
                radius: 1.0,
                segments: 0,
            },
            Color::WHITE,
        ));
        assert!(matches!(
            renderer.prepare(&mut scene),
            Err(EngineError::InvalidArgument(_))
        ));
    }
}

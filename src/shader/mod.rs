//! # Shader Module
//!
//! Named shader program cache. Sources are validated with naga at
//! registration time, so bad WGSL is reported before any GPU work, and
//! pipelines are compiled eagerly once a context exists. Draw calls that
//! reference a missing or failed program fall back to the default.

use std::collections::HashMap;

use crate::core::EngineError;
use crate::geometry::Vertex;
use crate::gpu::Context;

/// Name of the default program used as fallback.
pub const DEFAULT_PROGRAM: &str = "lit";

/// Per-program rasterizer options.
#[derive(Debug, Clone, Copy)]
struct PipelineOptions {
    cull_back: bool,
    depth_write: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            cull_back: true,
            depth_write: true,
        }
    }
}

/// A named shader program: validated WGSL source plus the compiled
/// pipeline once a context is available.
pub struct ShaderProgram {
    /// Program name.
    pub name: String,
    /// WGSL source text.
    pub source: String,
    /// Compiled pipeline. `None` until compiled against a context, or
    /// after a context loss.
    pub pipeline: Option<wgpu::RenderPipeline>,
    options: PipelineOptions,
}

/// Cache of named shader programs and the shared bind group layouts.
#[derive(Default)]
pub struct ShaderLibrary {
    programs: HashMap<String, ShaderProgram>,
    globals_layout: Option<wgpu::BindGroupLayout>,
    model_layout: Option<wgpu::BindGroupLayout>,
}

impl ShaderLibrary {
    /// Create a library preloaded with the built-in programs.
    pub fn new() -> Self {
        let mut library = Self::default();
        // Built-in sources are known good; registration cannot fail.
        library
            .register(DEFAULT_PROGRAM, include_str!("../shaders/lit.wgsl"))
            .expect("built-in lit shader is valid");
        library
            .register("unlit", include_str!("../shaders/unlit.wgsl"))
            .expect("built-in unlit shader is valid");
        library
            .register_with(
                "wireframe",
                include_str!("../shaders/wireframe.wgsl"),
                PipelineOptions {
                    cull_back: false,
                    depth_write: false,
                },
            )
            .expect("built-in wireframe shader is valid");
        library
    }

    /// Register a program under `name`, validating the WGSL source.
    ///
    /// Registering an existing name replaces its source and drops any
    /// compiled pipeline.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), EngineError> {
        self.register_with(name, source, PipelineOptions::default())
    }

    fn register_with(
        &mut self,
        name: &str,
        source: &str,
        options: PipelineOptions,
    ) -> Result<(), EngineError> {
        validate_wgsl(name, source)?;
        self.programs.insert(
            name.to_string(),
            ShaderProgram {
                name: name.to_string(),
                source: source.to_string(),
                pipeline: None,
                options,
            },
        );
        Ok(())
    }

    /// Compile every registered program against the context.
    ///
    /// Returns the errors for programs that failed; those programs stay
    /// registered without a pipeline and resolve to the default.
    pub fn compile_all(&mut self, context: &Context) -> Vec<EngineError> {
        let globals_layout = create_uniform_layout(&context.device, "Globals Bind Group Layout");
        let model_layout = create_uniform_layout(&context.device, "Model Bind Group Layout");

        let mut failures = Vec::new();
        for program in self.programs.values_mut() {
            match build_pipeline(context, program, &globals_layout, &model_layout) {
                Ok(pipeline) => program.pipeline = Some(pipeline),
                Err(err) => {
                    log::warn!("shader '{}' failed to compile: {err}", program.name);
                    program.pipeline = None;
                    failures.push(err);
                }
            }
        }

        self.globals_layout = Some(globals_layout);
        self.model_layout = Some(model_layout);
        failures
    }

    /// Look up a program by name, falling back to the default when the
    /// name is unknown or its pipeline failed to compile.
    pub fn resolve(&self, name: &str) -> Option<&ShaderProgram> {
        match self.programs.get(name) {
            Some(program) if program.pipeline.is_some() => Some(program),
            _ => self.programs.get(DEFAULT_PROGRAM),
        }
    }

    /// Look up a program by exact name.
    pub fn get(&self, name: &str) -> Option<&ShaderProgram> {
        self.programs.get(name)
    }

    /// Layout for the per-frame globals uniform.
    pub fn globals_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.globals_layout.as_ref()
    }

    /// Layout for the per-model uniform.
    pub fn model_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.model_layout.as_ref()
    }

    /// Drop compiled pipelines and layouts but keep the sources.
    ///
    /// Called on context loss; [`ShaderLibrary::compile_all`] restores them.
    pub fn invalidate(&mut self) {
        for program in self.programs.values_mut() {
            program.pipeline = None;
        }
        self.globals_layout = None;
        self.model_layout = None;
    }

    /// Release everything, sources included.
    pub fn dispose(&mut self) {
        self.programs.clear();
        self.globals_layout = None;
        self.model_layout = None;
    }

    /// Number of registered programs.
    #[inline]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether no programs are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

/// Parse and validate WGSL without a GPU device.
fn validate_wgsl(name: &str, source: &str) -> Result<(), EngineError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| EngineError::Shader {
        name: name.to_string(),
        diagnostic: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|e| EngineError::Shader {
            name: name.to_string(),
            diagnostic: e.to_string(),
        })?;
    Ok(())
}

fn create_uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn build_pipeline(
    context: &Context,
    program: &ShaderProgram,
    globals_layout: &wgpu::BindGroupLayout,
    model_layout: &wgpu::BindGroupLayout,
) -> Result<wgpu::RenderPipeline, EngineError> {
    // Re-validate so stale sources fail here instead of inside the driver.
    validate_wgsl(&program.name, &program.source)?;

    let device = &context.device;
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&program.name),
        source: wgpu::ShaderSource::Wgsl(program.source.as_str().into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Prism Pipeline Layout"),
        bind_group_layouts: &[globals_layout, model_layout],
        push_constant_ranges: &[],
    });

    Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&program.name),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: context.surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: program.options.cull_back.then_some(wgpu::Face::Back),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: context.depth_format,
            depth_write_enabled: program.options.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let library = ShaderLibrary::new();
        assert_eq!(library.len(), 3);
        assert!(library.get("lit").is_some());
        assert!(library.get("unlit").is_some());
        assert!(library.get("wireframe").is_some());
    }

    #[test]
    fn test_register_rejects_bad_wgsl() {
        let mut library = ShaderLibrary::new();
        let err = library.register("broken", "fn vs_main( {").unwrap_err();
        match err {
            EngineError::Shader { name, diagnostic } => {
                assert_eq!(name, "broken");
                assert!(!diagnostic.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        // A failed registration leaves the library unchanged.
        assert!(library.get("broken").is_none());
    }

    #[test]
    fn test_register_accepts_valid_wgsl() {
        let mut library = ShaderLibrary::new();
        let source = r#"
            @vertex
            fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
                return vec4<f32>(pos, 1.0);
            }
            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return vec4<f32>(1.0, 0.0, 1.0, 1.0);
            }
        "#;
        library.register("custom", source).unwrap();
        assert!(library.get("custom").is_some());
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let library = ShaderLibrary::new();
        // Nothing is compiled yet, so every name resolves to the default.
        let program = library.resolve("no-such-program").unwrap();
        assert_eq!(program.name, DEFAULT_PROGRAM);
    }

    #[test]
    fn test_invalidate_keeps_sources() {
        let mut library = ShaderLibrary::new();
        library.invalidate();
        assert_eq!(library.len(), 3);
        assert!(library.get("lit").unwrap().pipeline.is_none());
    }
}

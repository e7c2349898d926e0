//! Retained mesh registry with GPU buffer lifecycle.
//!
//! CPU-side mesh data is kept for the lifetime of each entry so GPU buffers
//! can be recreated after a context loss. Byte accounting tracks only what
//! is currently resident on the GPU.

use std::collections::HashMap;

use wgpu::util::BufferInitDescriptor;

use crate::core::{EngineError, Id};
use crate::geometry::MeshData;
use crate::gpu::Context;

/// Opaque handle to a registered mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(Id);

impl std::fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// GPU buffers for one mesh.
pub struct GpuMesh {
    /// Vertex buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer.
    pub index_buffer: wgpu::Buffer,
}

struct MeshEntry {
    data: MeshData,
    gpu: Option<GpuMesh>,
}

/// Registry of mesh data and the GPU buffers backing it.
#[derive(Default)]
pub struct Resources {
    entries: HashMap<MeshHandle, MeshEntry>,
    gpu_bytes: u64,
    disposed: bool,
}

impl Resources {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register mesh data. No GPU work happens until [`Resources::upload`].
    pub fn register(&mut self, data: MeshData) -> Result<MeshHandle, EngineError> {
        self.check_live()?;
        let handle = MeshHandle(Id::new());
        self.entries.insert(handle, MeshEntry { data, gpu: None });
        Ok(handle)
    }

    /// Upload one mesh to the GPU. A no-op if already resident.
    pub fn upload(&mut self, context: &Context, handle: MeshHandle) -> Result<(), EngineError> {
        self.check_live()?;
        let entry = self
            .entries
            .get_mut(&handle)
            .ok_or(EngineError::ResourceDisposed)?;
        if entry.gpu.is_some() {
            return Ok(());
        }

        let vertex_buffer = context.create_buffer_init(&BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&entry.data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = context.create_buffer_init(&BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&entry.data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        entry.gpu = Some(GpuMesh {
            vertex_buffer,
            index_buffer,
        });
        self.gpu_bytes += entry.data.total_bytes();
        Ok(())
    }

    /// Upload every mesh that is not yet resident.
    pub fn upload_all(&mut self, context: &Context) -> Result<(), EngineError> {
        self.check_live()?;
        let handles: Vec<MeshHandle> = self.entries.keys().copied().collect();
        for handle in handles {
            self.upload(context, handle)?;
        }
        Ok(())
    }

    /// Retained CPU data for a mesh.
    pub fn data(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.entries.get(&handle).map(|e| &e.data)
    }

    /// GPU buffers for a mesh, if resident.
    pub fn gpu_mesh(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.entries.get(&handle).and_then(|e| e.gpu.as_ref())
    }

    /// Free one mesh entry, releasing its GPU buffers.
    pub fn free(&mut self, handle: MeshHandle) {
        if let Some(entry) = self.entries.remove(&handle) {
            if entry.gpu.is_some() {
                self.gpu_bytes -= entry.data.total_bytes();
            }
        }
    }

    /// Drop every GPU buffer but keep the CPU-side data.
    ///
    /// Called on context loss; the retained data is re-uploaded on recovery.
    pub fn invalidate(&mut self) {
        for entry in self.entries.values_mut() {
            entry.gpu = None;
        }
        self.gpu_bytes = 0;
    }

    /// Release everything. Idempotent; further use returns
    /// [`EngineError::ResourceDisposed`].
    pub fn dispose(&mut self) {
        self.entries.clear();
        self.gpu_bytes = 0;
        self.disposed = true;
    }

    /// Bytes currently resident on the GPU.
    #[inline]
    pub fn gpu_memory_bytes(&self) -> u64 {
        self.gpu_bytes
    }

    /// Number of registered meshes.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_live(&self) -> Result<(), EngineError> {
        if self.disposed {
            Err(EngineError::ResourceDisposed)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::build_cube;
    use crate::math::Color;

    fn cube_data() -> MeshData {
        build_cube(1.0, Color::WHITE).unwrap()
    }

    #[test]
    fn test_register_keeps_cpu_data_without_gpu() {
        let mut resources = Resources::new();
        let handle = resources.register(cube_data()).unwrap();
        assert!(resources.data(handle).is_some());
        assert!(resources.gpu_mesh(handle).is_none());
        assert_eq!(resources.gpu_memory_bytes(), 0);
    }

    #[test]
    fn test_invalidate_retains_data() {
        let mut resources = Resources::new();
        let handle = resources.register(cube_data()).unwrap();
        resources.invalidate();
        assert!(resources.data(handle).is_some());
        assert_eq!(resources.gpu_memory_bytes(), 0);
    }

    #[test]
    fn test_free_removes_entry() {
        let mut resources = Resources::new();
        let handle = resources.register(cube_data()).unwrap();
        resources.free(handle);
        assert!(resources.data(handle).is_none());
        assert!(resources.is_empty());
    }

    #[test]
    fn test_dispose_is_idempotent_and_final() {
        let mut resources = Resources::new();
        resources.register(cube_data()).unwrap();
        resources.dispose();
        resources.dispose();
        assert_eq!(resources.gpu_memory_bytes(), 0);
        assert!(matches!(
            resources.register(cube_data()),
            Err(EngineError::ResourceDisposed)
        ));
    }
}

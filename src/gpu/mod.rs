//! # GPU Module
//!
//! wgpu context acquisition and the retained mesh resource registry.

mod context;
mod resources;

pub use context::Context;
pub use resources::{GpuMesh, MeshHandle, Resources};

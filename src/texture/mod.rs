//! # Texture Module
//!
//! CPU-side texture data, procedural generators, and the named texture
//! cache with deferred image loading.

mod data;
mod manager;

pub use data::TextureData;
pub use manager::{GpuTexture, TextureManager};

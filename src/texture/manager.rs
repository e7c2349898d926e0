//! Named texture cache with deferred image decoding.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use super::TextureData;
use crate::core::EngineError;
use crate::gpu::Context;
use crate::math::Color;

/// GPU texture and its view.
pub struct GpuTexture {
    /// The GPU texture.
    pub texture: wgpu::Texture,
    /// Default view.
    pub view: wgpu::TextureView,
}

struct TextureEntry {
    data: TextureData,
    gpu: Option<GpuTexture>,
}

struct PendingLoad {
    name: String,
    bytes: Vec<u8>,
}

/// Cache of named textures.
///
/// Creation is idempotent per name: asking again for an existing name
/// returns the cached entry without regenerating pixels. Encoded image
/// loads are queued and decoded on a later tick; until then the entry
/// holds a 1x1 placeholder.
#[derive(Default)]
pub struct TextureManager {
    entries: HashMap<String, TextureEntry>,
    pending: Vec<PendingLoad>,
    gpu_bytes: u64,
}

impl TextureManager {
    /// Placeholder color shown while a load is pending.
    const PLACEHOLDER: Color = Color::new(0.5, 0.5, 0.5, 1.0);

    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a 1x1 solid color texture.
    pub fn create_solid(&mut self, name: &str, color: Color) -> &TextureData {
        self.create_with(name, || TextureData::solid(color))
    }

    /// Create a grayscale noise texture, deterministic in `seed`.
    pub fn create_noise(&mut self, name: &str, size: u32, seed: u32) -> &TextureData {
        self.create_with(name, || TextureData::noise(size, seed))
    }

    /// Create a vertical gradient texture.
    pub fn create_gradient(
        &mut self,
        name: &str,
        top: Color,
        bottom: Color,
        width: u32,
        height: u32,
    ) -> &TextureData {
        self.create_with(name, || TextureData::gradient(top, bottom, width, height))
    }

    fn create_with(&mut self, name: &str, build: impl FnOnce() -> TextureData) -> &TextureData {
        if !self.entries.contains_key(name) {
            self.entries.insert(
                name.to_string(),
                TextureEntry {
                    data: build(),
                    gpu: None,
                },
            );
        }
        &self.entries[name].data
    }

    /// Queue encoded image bytes for decoding on a later tick.
    ///
    /// The entry is created immediately with a placeholder so lookups
    /// succeed while the decode is pending. Idempotent per name like
    /// the other creation calls: if the name already exists the bytes
    /// are dropped and the cached entry stays.
    pub fn queue_load(&mut self, name: &str, bytes: Vec<u8>) {
        if self.entries.contains_key(name) {
            return;
        }
        self.entries.insert(
            name.to_string(),
            TextureEntry {
                data: TextureData::solid(Self::PLACEHOLDER),
                gpu: None,
            },
        );
        self.pending.push(PendingLoad {
            name: name.to_string(),
            bytes,
        });
    }

    /// Cancel a pending load. The placeholder entry stays.
    pub fn cancel_load(&mut self, name: &str) {
        self.pending.retain(|p| p.name != name);
    }

    /// Whether a load is queued for `name`.
    pub fn is_pending(&self, name: &str) -> bool {
        self.pending.iter().any(|p| p.name == name)
    }

    /// Decode every queued load. Failures leave the placeholder pixels
    /// in place and are returned to the caller.
    pub fn poll_pending(&mut self) -> Vec<EngineError> {
        let mut failures = Vec::new();
        for load in std::mem::take(&mut self.pending) {
            match TextureData::decode(&load.name, &load.bytes) {
                Ok(data) => {
                    if let Some(entry) = self.entries.get_mut(&load.name) {
                        if entry.gpu.is_some() {
                            self.gpu_bytes -= entry.data.byte_size();
                            entry.gpu = None;
                        }
                        entry.data = data;
                    }
                }
                Err(err) => {
                    log::warn!("texture load failed: {err}");
                    failures.push(err);
                }
            }
        }
        failures
    }

    /// Look up a texture's pixel data.
    pub fn get(&self, name: &str) -> Option<&TextureData> {
        self.entries.get(name).map(|e| &e.data)
    }

    /// Look up a texture's GPU copy, if resident.
    pub fn gpu_texture(&self, name: &str) -> Option<&GpuTexture> {
        self.entries.get(name).and_then(|e| e.gpu.as_ref())
    }

    /// Upload every texture that is not yet resident.
    pub fn upload_all(&mut self, context: &Context) {
        for entry in self.entries.values_mut() {
            if entry.gpu.is_some() {
                continue;
            }
            let texture = context.device.create_texture_with_data(
                &context.queue,
                &wgpu::TextureDescriptor {
                    label: Some("Cached Texture"),
                    size: wgpu::Extent3d {
                        width: entry.data.width,
                        height: entry.data.height,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: wgpu::TextureFormat::Rgba8UnormSrgb,
                    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                    view_formats: &[],
                },
                wgpu::util::TextureDataOrder::LayerMajor,
                &entry.data.rgba,
            );
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            entry.gpu = Some(GpuTexture { texture, view });
            self.gpu_bytes += entry.data.byte_size();
        }
    }

    /// Drop every GPU copy but keep the pixel data.
    pub fn invalidate(&mut self) {
        for entry in self.entries.values_mut() {
            entry.gpu = None;
        }
        self.gpu_bytes = 0;
    }

    /// Release everything, pending loads included. Idempotent.
    pub fn dispose(&mut self) {
        self.entries.clear();
        self.pending.clear();
        self.gpu_bytes = 0;
    }

    /// Bytes currently resident on the GPU.
    #[inline]
    pub fn gpu_memory_bytes(&self) -> u64 {
        self.gpu_bytes
    }

    /// Number of cached textures.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_is_idempotent_per_name() {
        let mut manager = TextureManager::new();
        let first = manager
            .create_gradient("sky", Color::BLACK, Color::WHITE, 8, 8)
            .clone();
        // A second request with different parameters returns the cached pixels.
        let second = manager
            .create_gradient("sky", Color::RED, Color::BLUE, 32, 16)
            .clone();
        assert_eq!(first, second);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_queued_load_starts_as_placeholder() {
        let mut manager = TextureManager::new();
        manager.queue_load("photo", vec![1, 2, 3]);
        assert!(manager.is_pending("photo"));
        let data = manager.get("photo").unwrap();
        assert_eq!((data.width, data.height), (1, 1));
    }

    #[test]
    fn test_failed_decode_keeps_placeholder_and_reports() {
        let mut manager = TextureManager::new();
        manager.queue_load("photo", vec![1, 2, 3]);
        let failures = manager.poll_pending();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            failures[0],
            EngineError::TextureDecode { ref name, .. } if name == "photo"
        ));
        // Placeholder pixels survive the failure.
        let data = manager.get("photo").unwrap();
        assert_eq!((data.width, data.height), (1, 1));
        assert!(!manager.is_pending("photo"));
    }

    #[test]
    fn test_successful_decode_replaces_placeholder() {
        // A 2x2 PNG encoded in memory.
        let mut png = Vec::new();
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut manager = TextureManager::new();
        manager.queue_load("photo", png);
        assert!(manager.poll_pending().is_empty());
        let data = manager.get("photo").unwrap();
        assert_eq!((data.width, data.height), (2, 2));
        assert_eq!(&data.rgba[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_queue_load_is_idempotent_per_name() {
        let mut png = Vec::new();
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let mut manager = TextureManager::new();
        manager.create_solid("tex", Color::RED);
        manager.queue_load("tex", png);

        // The existing entry wins; nothing is queued or replaced.
        assert!(!manager.is_pending("tex"));
        assert!(manager.poll_pending().is_empty());
        let data = manager.get("tex").unwrap();
        assert_eq!((data.width, data.height), (1, 1));
        assert_eq!(data.rgba, Color::RED.to_rgba8().to_vec());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_cancel_load_keeps_placeholder() {
        let mut manager = TextureManager::new();
        manager.queue_load("photo", vec![1, 2, 3]);
        manager.cancel_load("photo");
        assert!(!manager.is_pending("photo"));
        assert!(manager.poll_pending().is_empty());
        assert!(manager.get("photo").is_some());
    }

    #[test]
    fn test_dispose_clears_everything() {
        let mut manager = TextureManager::new();
        manager.create_solid("white", Color::WHITE);
        manager.queue_load("photo", vec![1]);
        manager.dispose();
        manager.dispose();
        assert!(manager.is_empty());
        assert_eq!(manager.gpu_memory_bytes(), 0);
    }
}

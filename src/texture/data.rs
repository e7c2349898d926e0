//! CPU-side RGBA8 texture data and procedural generators.

use crate::core::EngineError;
use crate::math::Color;

/// RGBA8 pixel data retained on the CPU.
///
/// Kept for the lifetime of a texture entry so the GPU copy can be
/// recreated after a context loss.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixels, row major.
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// A 1x1 texture of a single color.
    pub fn solid(color: Color) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: color.to_rgba8().to_vec(),
        }
    }

    /// A square grayscale value-noise texture, deterministic in `seed`.
    pub fn noise(size: u32, seed: u32) -> Self {
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                // Small integer hash, good enough for a dithery fill.
                let mut h = x.wrapping_mul(374_761_393)
                    ^ y.wrapping_mul(668_265_263)
                    ^ seed.wrapping_mul(2_246_822_519);
                h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
                let v = ((h ^ (h >> 16)) & 0xff) as u8;
                rgba.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    /// A vertical gradient from `top` to `bottom`.
    pub fn gradient(top: Color, bottom: Color, width: u32, height: u32) -> Self {
        let mut rgba = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            let t = if height > 1 {
                y as f32 / (height - 1) as f32
            } else {
                0.0
            };
            let row = top.lerp(&bottom, t).to_rgba8();
            for _ in 0..width {
                rgba.extend_from_slice(&row);
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Decode encoded image bytes (PNG, JPEG) into RGBA8.
    pub fn decode(name: &str, bytes: &[u8]) -> Result<Self, EngineError> {
        let img = image::load_from_memory(bytes).map_err(|e| EngineError::TextureDecode {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Byte size of the pixel data.
    #[inline]
    pub fn byte_size(&self) -> u64 {
        self.rgba.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_is_single_pixel() {
        let data = TextureData::solid(Color::RED);
        assert_eq!((data.width, data.height), (1, 1));
        assert_eq!(data.rgba, vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_noise_is_deterministic() {
        let a = TextureData::noise(16, 7);
        let b = TextureData::noise(16, 7);
        let c = TextureData::noise(16, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_gradient_endpoints() {
        let data = TextureData::gradient(Color::BLACK, Color::WHITE, 4, 4);
        assert_eq!(&data.rgba[0..4], &[0, 0, 0, 255]);
        let last = data.rgba.len() - 4;
        assert_eq!(&data.rgba[last..], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_gradient_supports_non_square_dimensions() {
        let data = TextureData::gradient(Color::BLACK, Color::WHITE, 2, 5);
        assert_eq!((data.width, data.height), (2, 5));
        assert_eq!(data.byte_size(), 2 * 5 * 4);
        // Rows are uniform; the ramp runs down the columns.
        assert_eq!(&data.rgba[0..4], &data.rgba[4..8]);
        assert_ne!(&data.rgba[0..4], &data.rgba[8..12]);
    }

    #[test]
    fn test_decode_garbage_reports_name() {
        let err = TextureData::decode("bad", &[0, 1, 2, 3]).unwrap_err();
        match err {
            EngineError::TextureDecode { name, .. } => assert_eq!(name, "bad"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Frame statistics snapshot and FPS tracking.

/// A synchronous snapshot of engine statistics. Fixed fields, no side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    /// Smoothed frames per second.
    pub fps: f32,
    /// Duration of the last frame in milliseconds.
    pub frame_time_ms: f32,
    /// Draw calls issued for the last frame.
    pub draw_calls: u32,
    /// Triangles in the active scene.
    pub triangle_count: u32,
    /// Models in the active scene.
    pub model_count: u32,
    /// Estimated GPU memory held by buffers and textures, in bytes.
    pub gpu_memory_bytes: u64,
}

/// Tracks frame cadence and a smoothed FPS figure.
#[derive(Debug, Default)]
pub struct FrameTimer {
    /// Last frame duration in milliseconds.
    frame_time_ms: f32,
    /// Exponentially smoothed FPS.
    fps: f32,
}

impl FrameTimer {
    /// Smoothing factor for the FPS moving average.
    const SMOOTHING: f32 = 0.1;

    /// Create a new frame timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame of `dt` seconds.
    pub fn record(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.frame_time_ms = dt * 1000.0;
        let instant_fps = 1.0 / dt;
        if self.fps == 0.0 {
            self.fps = instant_fps;
        } else {
            self.fps += (instant_fps - self.fps) * Self::SMOOTHING;
        }
    }

    /// Smoothed frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Last frame duration in milliseconds.
    #[inline]
    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }
}

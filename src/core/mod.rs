//! # Core Module
//!
//! Engine driver, configuration, errors, timing, and statistics.

mod clock;
mod engine;
mod error;
mod id;
mod stats;

pub use clock::Clock;
pub use engine::{Engine, LoopState};
pub use error::EngineError;
pub use id::Id;
pub use stats::{FrameTimer, Stats};

use crate::math::Color;

/// Engine configuration options.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Clear color for the color attachment.
    pub clear_color: Color,
    /// Power preference for GPU selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (vsync).
    pub present_mode: wgpu::PresentMode,
    /// GPU memory budget; exceeding it emits a memory warning event.
    pub memory_limit_bytes: u64,
    /// Angular rate of the built-in model spin animation, radians per second.
    pub spin_rate: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::rgb(0.1, 0.1, 0.1),
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::AutoVsync,
            memory_limit_bytes: 256 * 1024 * 1024,
            spin_rate: 0.5,
        }
    }
}

/// Events surfaced to the host application.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The GPU context was lost; frames are dropped until recovery.
    ContextLost,
    /// A shader failed to compile; the renderer fell back to the default.
    ShaderCompileError {
        /// Name of the failing program.
        name: String,
        /// Compiler diagnostic text.
        message: String,
    },
    /// GPU memory usage crossed the configured budget.
    MemoryWarning {
        /// Current usage in bytes.
        used_bytes: u64,
        /// Configured budget in bytes.
        limit_bytes: u64,
    },
    /// A queued texture load failed to decode; the placeholder stays.
    TextureLoadError {
        /// Name of the texture entry.
        name: String,
        /// Decoder error text.
        message: String,
    },
}

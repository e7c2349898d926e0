//! # Camera Module
//!
//! Perspective camera with validated parameters and lazily refreshed
//! matrices.

mod perspective;

pub use perspective::PerspectiveCamera;

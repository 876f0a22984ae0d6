//! Common utilities for the black hole renderers
//!
//! This crate provides the shared window/GPU setup and the camera controls
//! used by both the interactive viewer and the offline frame renderer.

pub mod camera;
pub mod graphics;

pub use camera::*;
pub use graphics::*;

/// Physical constants in geometrized units (G = c = 1)
pub mod constants {
    /// Gravitational constant (normalized)
    pub const G: f32 = 1.0;

    /// Speed of light (normalized)
    pub const C: f32 = 1.0;

    /// Schwarzschild radius coefficient: rs = 2GM/c²
    pub const SCHWARZSCHILD_COEFF: f32 = 2.0 * G / (C * C);
}

//! Black hole lensing on the CPU
//!
//! Light rays are launched from a pinhole camera and integrated through the
//! Schwarzschild geometry of a non-rotating black hole until they fall in,
//! strike the accretion disk, or run out of budget:
//!
//! - [`ray`]: per-ray state and the choice of stepping scheme
//! - [`integrator`]: Newtonian and exact-geodesic stepping
//! - [`collision`]: adaptive stepping and hit classification
//! - [`tracer`]: pixel → ray → color
//! - [`frame`]: column-partitioned parallel frame rendering
//! - [`config`]: scene geometry and tuned constants

pub mod collision;
pub mod config;
pub mod frame;
pub mod integrator;
pub mod ray;
pub mod tracer;

pub use collision::Collision;
pub use config::{Scene, TraceSettings};
pub use frame::{column_ranges, FrameConfig, FrameError, ParallelFrameRenderer};
pub use ray::{Cylindrical, Orbit, RayState};
pub use tracer::{PixelTracer, Termination};

/// Convert a linear color to clamped 8-bit RGBA
pub fn to_rgba8(color: glam::Vec3) -> [u8; 4] {
    let c = color.clamp(glam::Vec3::ZERO, glam::Vec3::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn rgba8_clamps_overbright_and_negative() {
        assert_eq!(to_rgba8(Vec3::new(2.0, -1.0, 0.5)), [255, 0, 128, 255]);
        assert_eq!(to_rgba8(Vec3::ZERO), [0, 0, 0, 255]);
    }
}

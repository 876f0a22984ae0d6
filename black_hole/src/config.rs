//! Scene geometry and integration tuning

use common::constants::SCHWARZSCHILD_COEFF;

/// Disk outer radius in units of the horizon radius
pub const DISK_RADIUS_FACTOR: f32 = 2.5;

/// Disk half-thickness in units of the disk outer radius
pub const DISK_HEIGHT_FACTOR: f32 = 0.015;

/// Central body and accretion disk for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    /// Gravitational parameter GM
    pub gm: f32,
    /// Radius of the absorbing sphere
    pub sphere_radius: f32,
    /// Outer radius of the disk
    pub disk_radius: f32,
    /// Half-thickness of the disk slab
    pub disk_height: f32,
}

impl Scene {
    /// Horizon-sized sphere with a thin disk out to 2.5 horizon radii
    pub fn schwarzschild(gm: f32) -> Self {
        let sphere_radius = SCHWARZSCHILD_COEFF * gm;
        Self::new(gm, sphere_radius, sphere_radius * DISK_RADIUS_FACTOR)
    }

    /// Scene with an explicit disk radius; the slab thickness follows it
    pub fn new(gm: f32, sphere_radius: f32, disk_radius: f32) -> Self {
        Self {
            gm,
            sphere_radius,
            disk_radius,
            disk_height: DISK_HEIGHT_FACTOR * disk_radius,
        }
    }

    /// Map a cylindrical radius onto [0, 1] between the sphere and the disk rim
    pub fn normalized_disk_radius(&self, r: f32) -> f32 {
        let span = self.disk_radius - self.sphere_radius;
        if span <= 0.0 {
            return 0.0;
        }
        ((r - self.sphere_radius) / span).clamp(0.0, 1.0)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::schwarzschild(1.0)
    }
}

/// Tuned constants of the integrator and the trace loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSettings {
    /// Nominal step handed to the collision check every iteration
    pub base_step: f32,
    /// Hard iteration cap per pixel
    pub max_steps: u32,
    /// Affine-parameter budget per pixel
    pub max_affine: f32,
    /// Floor of the adaptive step
    pub min_step: f32,
    /// Ceiling of the adaptive step, as a multiple of the nominal step
    pub max_step_growth: f32,
    /// Radial speed below which the exact scheme treats the ray as turning
    pub turning_epsilon: f32,
    /// Bias added to the cylindrical radius before the disk rim test
    pub disk_margin: f32,
    /// Lower clamp of r² in the Newtonian angular rate
    pub axis_r2_min: f32,
    /// Upper clamp of r² in the Newtonian angular rate
    pub axis_r2_max: f32,
    /// |e2| below which the orbital basis is considered degenerate
    pub degenerate_basis_tolerance: f32,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            base_step: 0.1,
            max_steps: 128,
            max_affine: 50.0,
            min_step: 0.005,
            max_step_growth: 2.0,
            turning_epsilon: 1e-3,
            disk_margin: 0.01,
            axis_r2_min: 1e-4,
            axis_r2_max: 1e6,
            degenerate_basis_tolerance: 1e-4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_matches_unit_mass() {
        let scene = Scene::default();
        assert_eq!(scene.gm, 1.0);
        assert_eq!(scene.sphere_radius, 2.0);
        assert_eq!(scene.disk_radius, 5.0);
        assert!((scene.disk_height - 0.075).abs() < 1e-6);
    }

    #[test]
    fn normalized_radius_is_clamped() {
        let scene = Scene::default();
        assert_eq!(scene.normalized_disk_radius(0.5), 0.0);
        assert_eq!(scene.normalized_disk_radius(9.0), 1.0);
        assert!((scene.normalized_disk_radius(3.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn normalized_radius_handles_empty_disk() {
        let scene = Scene::new(1.0, 2.0, 0.0);
        assert_eq!(scene.normalized_disk_radius(3.0), 0.0);
    }
}

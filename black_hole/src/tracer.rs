//! Per-pixel tracing and shading

use common::CameraFrame;
use glam::Vec3;

use crate::collision::Collision;
use crate::config::{Scene, TraceSettings};
use crate::ray::RayState;

/// Disk color at the inner edge
pub const DISK_INNER_COLOR: Vec3 = Vec3::new(1.0, 0.35, 0.1);
/// Disk color at the outer rim
pub const DISK_OUTER_COLOR: Vec3 = Vec3::new(1.0, 0.75, 0.25);
/// Sky color looking down
pub const BACKGROUND_BOTTOM: Vec3 = Vec3::new(0.1, 0.1, 0.25);
/// Sky color looking up
pub const BACKGROUND_TOP: Vec3 = Vec3::ZERO;

/// Glow bands on the disk: (normalized radius, width, weight)
pub const GLOW_RINGS: [(f32, f32, f32); 4] = [
    (0.15, 0.03, 1.0),
    (0.30, 0.06, 0.8),
    (0.51, 0.10, 0.5),
    (0.80, 0.16, 0.3),
];

/// How a trace ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    /// Fell into the central sphere
    Absorbed { steps: u32 },
    /// Hit the disk at cylindrical radius `r`
    Disk { r: f32, steps: u32 },
    /// Ran out of steps or affine budget; `y` is the last height
    Escaped { y: f32, steps: u32 },
}

/// Sum of the Gaussian glow bands at normalized disk radius `rn`
pub fn radial_glow(rn: f32) -> f32 {
    GLOW_RINGS
        .iter()
        .map(|&(centre, width, weight)| {
            let x = (rn - centre) / width;
            weight * (-x * x).exp()
        })
        .sum()
}

/// Disk emission at cylindrical radius `r`
pub fn disk_color(r: f32, scene: &Scene) -> Vec3 {
    let rn = scene.normalized_disk_radius(r);
    DISK_INNER_COLOR.lerp(DISK_OUTER_COLOR, rn) * radial_glow(rn)
}

/// Vertical sky gradient keyed on the final ray height
pub fn background_color(y: f32) -> Vec3 {
    BACKGROUND_BOTTOM.lerp(BACKGROUND_TOP, y.clamp(0.0, 1.0))
}

/// Traces rays through one scene with fixed settings
#[derive(Debug, Clone, Copy)]
pub struct PixelTracer {
    pub scene: Scene,
    pub settings: TraceSettings,
}

impl PixelTracer {
    pub fn new(scene: Scene, settings: TraceSettings) -> Self {
        Self { scene, settings }
    }

    /// Integrate one geodesic ray from `origin` until it terminates
    pub fn trace(&self, origin: Vec3, direction: Vec3) -> Termination {
        let scene = &self.scene;
        let settings = &self.settings;

        // Camera already inside the horizon
        if origin.length() <= scene.sphere_radius {
            return Termination::Absorbed { steps: 0 };
        }

        let mut ray = RayState::geodesic(origin, direction, scene.gm, scene.disk_height, settings);
        let mut steps = 0;

        for step in 1..=settings.max_steps {
            let collision = ray.check_scene(settings.base_step, scene, settings);
            steps = step;

            if ray.t() > settings.max_affine {
                break;
            }

            match collision {
                Collision::BlackHole => return Termination::Absorbed { steps: step },
                Collision::Disk => return Termination::Disk { r: ray.r(), steps: step },
                Collision::None => {}
            }
        }

        Termination::Escaped {
            y: ray.position().y,
            steps,
        }
    }

    /// Color for a finished trace
    pub fn shade(&self, termination: Termination) -> Vec3 {
        match termination {
            Termination::Absorbed { .. } => Vec3::ZERO,
            Termination::Disk { r, .. } => disk_color(r, &self.scene),
            Termination::Escaped { y, .. } => background_color(y),
        }
    }

    /// Color of a single ray
    pub fn color(&self, origin: Vec3, direction: Vec3) -> Vec3 {
        let termination = self.trace(origin, direction);
        log::trace!("ray {:?} -> {:?}", direction, termination);
        self.shade(termination)
    }

    /// Color of pixel (`col`, `row`) in a `width` x `height` image
    pub fn pixel(&self, col: u32, row: u32, width: u32, height: u32, camera: &CameraFrame) -> Vec3 {
        let u = (col as f32 + 0.5) / width as f32;
        let v = (row as f32 + 0.5) / height as f32;
        let aspect_ratio = width as f32 / height as f32;

        let direction = camera.ray_direction(u, v, aspect_ratio);
        self.color(camera.position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracer() -> PixelTracer {
        PixelTracer::new(Scene::default(), TraceSettings::default())
    }

    #[test]
    fn glow_peaks_at_inner_ring() {
        let peak = radial_glow(0.15);
        assert!(peak > 1.0);
        assert!(peak > radial_glow(0.0));
        assert!(peak > radial_glow(1.0));
        assert!(radial_glow(1.0) > 0.0);
    }

    #[test]
    fn background_gradient_endpoints() {
        assert_eq!(background_color(-3.0), BACKGROUND_BOTTOM);
        assert_eq!(background_color(7.0), BACKGROUND_TOP);
        let mid = background_color(0.5);
        assert!((mid - (BACKGROUND_BOTTOM * 0.5)).length() < 1e-6);
    }

    #[test]
    fn receding_ray_sees_background() {
        let tracer = tracer();
        let termination = tracer.trace(Vec3::new(8.0, -6.0, 20.0), Vec3::Z);
        assert!(matches!(termination, Termination::Escaped { steps: 128, .. }));

        let color = tracer.shade(termination);
        assert_eq!(color, BACKGROUND_BOTTOM);
        assert_ne!(color, Vec3::ZERO);
    }

    #[test]
    fn polar_infall_is_black() {
        let tracer = tracer();
        let termination = tracer.trace(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y);
        assert!(matches!(termination, Termination::Absorbed { .. }));
        assert_eq!(tracer.shade(termination), Vec3::ZERO);
    }

    #[test]
    fn disk_hit_color_is_finite_and_lit() {
        let tracer = tracer();
        let origin = Vec3::new(3.5, 0.9 * tracer.scene.disk_height, 0.0);
        let termination = tracer.trace(origin, Vec3::new(0.0, -0.2, 1.0));

        let r = match termination {
            Termination::Disk { r, .. } => r,
            other => panic!("expected disk hit, got {:?}", other),
        };
        assert!(r > tracer.scene.sphere_radius && r < tracer.scene.disk_radius);

        let color = tracer.shade(termination);
        assert!(color.is_finite());
        assert!(color.min_element() >= 0.0);
        assert!(color.max_element() > 0.0);
        assert!(color.max_element() < 10.0);
    }

    #[test]
    fn ray_sinking_onto_disk_is_shaded() {
        let tracer = tracer();
        let termination = tracer.trace(Vec3::new(4.0, 0.4, -2.0), Vec3::new(0.0, -0.1, 1.0));

        let (r, steps) = match termination {
            Termination::Disk { r, steps } => (r, steps),
            other => panic!("expected disk hit, got {:?}", other),
        };
        assert!(steps > 5);
        assert!(r > tracer.scene.sphere_radius && r < tracer.scene.disk_radius);
        assert_eq!(tracer.shade(termination), disk_color(r, &tracer.scene));
    }

    #[test]
    fn camera_inside_horizon_is_black() {
        let tracer = tracer();
        assert_eq!(tracer.color(Vec3::new(0.5, 0.0, 0.0), Vec3::X), Vec3::ZERO);
    }

    #[test]
    fn pixel_aimed_at_hole_is_black() {
        let tracer = tracer();
        // Looking straight down the pole
        let camera = CameraFrame::look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO, Vec3::Z, 0.5);
        let color = tracer.pixel(4, 4, 9, 9, &camera);
        assert_eq!(color, Vec3::ZERO);
    }
}

//! One adaptive step plus classification against the scene geometry

use crate::config::{Scene, TraceSettings};
use crate::ray::RayState;

/// Outcome of a single collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    None,
    BlackHole,
    Disk,
}

impl Collision {
    pub fn is_terminal(self) -> bool {
        self != Collision::None
    }
}

/// Step size scaled by distance from the centre, bounded on both sides
pub fn adaptive_step(dt: f32, rho: f32, sphere_radius: f32, settings: &TraceSettings) -> f32 {
    let scaled = dt * (rho / sphere_radius);
    scaled.max(settings.min_step).min(dt * settings.max_step_growth)
}

impl RayState {
    /// Take one adaptive step and report what the ray ran into.
    ///
    /// The sphere is tested before the disk, so a step that lands inside both
    /// counts as absorbed.
    pub fn check_collision(
        &mut self,
        dt: f32,
        sphere_radius: f32,
        disk_radius: f32,
        settings: &TraceSettings,
    ) -> Collision {
        let dt = adaptive_step(dt, self.rho, sphere_radius, settings);
        self.step(dt, settings);

        if self.rho <= sphere_radius {
            return Collision::BlackHole;
        }

        let p = self.position;
        if p.y.abs() < self.disk_height && p.x.hypot(p.z) + settings.disk_margin < disk_radius {
            return Collision::Disk;
        }

        Collision::None
    }

    /// Collision check against a [`Scene`]
    pub fn check_scene(&mut self, dt: f32, scene: &Scene, settings: &TraceSettings) -> Collision {
        self.check_collision(dt, scene.sphere_radius, scene.disk_radius, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn settings() -> TraceSettings {
        TraceSettings::default()
    }

    #[test]
    fn adaptive_step_bounds() {
        let s = settings();
        // Far away: capped at twice the nominal step
        assert!((adaptive_step(0.1, 50.0, 2.0, &s) - 0.2).abs() < 1e-6);
        // Close in: shrinks with rho
        assert!((adaptive_step(0.1, 3.0, 2.0, &s) - 0.15).abs() < 1e-6);
        // Never below the floor
        assert!((adaptive_step(0.1, 0.01, 2.0, &s) - 0.005).abs() < 1e-6);
    }

    #[test]
    fn black_hole_takes_precedence_over_disk() {
        let s = settings();
        let scene = Scene::default();
        // In the disk plane, one step from the sphere
        let mut ray = RayState::geodesic(Vec3::new(2.05, 0.0, 0.0), -Vec3::X, scene.gm, scene.disk_height, &s);
        let hit = ray.check_scene(s.base_step, &scene, &s);

        let p = ray.position();
        assert!(p.y.abs() < scene.disk_height);
        assert!(p.x.hypot(p.z) + s.disk_margin < scene.disk_radius);
        assert!(ray.rho() <= scene.sphere_radius);
        assert_eq!(hit, Collision::BlackHole);
    }

    #[test]
    fn direct_hit_is_absorbed() {
        let s = settings();
        // No disk, so only the sphere can stop the ray
        let scene = Scene::new(1.0, 2.0, 0.0);
        let mut ray = RayState::geodesic(Vec3::new(10.0, 0.0, 0.0), -Vec3::X, scene.gm, scene.disk_height, &s);

        let mut outcome = Collision::None;
        for _ in 0..s.max_steps {
            outcome = ray.check_scene(s.base_step, &scene, &s);
            if ray.t() > s.max_affine || outcome.is_terminal() {
                break;
            }
        }
        assert_eq!(outcome, Collision::BlackHole);
        assert!(ray.t() <= s.max_affine);
        assert!(ray.rho() > 0.0);
    }

    #[test]
    fn shallow_crossing_hits_disk() {
        let s = settings();
        let scene = Scene::default();
        let origin = Vec3::new(3.5, 0.9 * scene.disk_height, 0.0);
        let mut ray = RayState::geodesic(origin, Vec3::new(0.0, -0.2, 1.0), scene.gm, scene.disk_height, &s);

        let hit = ray.check_scene(s.base_step, &scene, &s);
        assert_eq!(hit, Collision::Disk);
        assert!(ray.r() > scene.sphere_radius && ray.r() < scene.disk_radius);
    }

    #[test]
    fn descent_from_above_lands_on_disk() {
        let s = settings();
        let scene = Scene::default();
        // Starts well above the slab and sinks through it over several steps
        let origin = Vec3::new(4.0, 0.4, -2.0);
        assert!(origin.y > 5.0 * scene.disk_height);
        let mut ray = RayState::geodesic(origin, Vec3::new(0.0, -0.1, 1.0), scene.gm, scene.disk_height, &s);

        let mut hit = Collision::None;
        let mut steps = 0;
        let mut last_y = origin.y;
        while steps < s.max_steps {
            hit = ray.check_scene(s.base_step, &scene, &s);
            steps += 1;
            if hit.is_terminal() {
                break;
            }
            assert!(ray.position().y >= scene.disk_height);
            assert!(ray.position().y < last_y);
            last_y = ray.position().y;
        }

        assert_eq!(hit, Collision::Disk);
        assert!(steps > 5, "hit after {} steps", steps);
        assert!(ray.position().y.abs() < scene.disk_height);
        assert!(ray.r() > scene.sphere_radius && ray.r() < scene.disk_radius);
    }

    #[test]
    fn receding_ray_never_collides() {
        let s = settings();
        let scene = Scene::default();
        let mut ray = RayState::geodesic(Vec3::new(8.0, -6.0, 20.0), Vec3::Z, scene.gm, scene.disk_height, &s);
        for _ in 0..s.max_steps {
            assert_eq!(ray.check_scene(s.base_step, &scene, &s), Collision::None);
        }
    }

    #[test]
    fn newtonian_ray_can_be_classified_too() {
        let s = settings();
        let scene = Scene::new(1.0, 2.0, 0.0);
        let mut ray = RayState::newtonian(Vec3::new(0.0, 10.0, 0.0), -Vec3::Y, scene.gm, scene.disk_height);
        let mut hit = Collision::None;
        for _ in 0..s.max_steps {
            hit = ray.check_scene(s.base_step, &scene, &s);
            if hit.is_terminal() {
                break;
            }
        }
        assert_eq!(hit, Collision::BlackHole);
    }
}

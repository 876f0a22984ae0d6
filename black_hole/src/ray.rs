//! Light ray state
//!
//! A [`RayState`] carries the quantities shared by both integration schemes
//! (Cartesian position, launch direction, radii, affine parameter) plus the
//! extra state of whichever scheme drives it: [`Cylindrical`] for the
//! Newtonian scheme or [`Orbit`] for the geodesic one. The scheme is picked
//! once, by the constructor.

use glam::{Vec2, Vec3};

use crate::config::TraceSettings;

/// State of one photon, owned by a single trace
#[derive(Debug, Clone)]
pub struct RayState {
    pub(crate) position: Vec3,
    pub(crate) direction: Vec3,
    /// Distance from the y axis
    pub(crate) r: f32,
    /// Distance from the centre
    pub(crate) rho: f32,
    pub(crate) t: f32,
    pub(crate) gm: f32,
    pub(crate) disk_height: f32,
    pub(crate) scheme: Scheme,
}

/// Stepping strategy together with the state only it needs
#[derive(Debug, Clone)]
pub(crate) enum Scheme {
    Newtonian(Cylindrical),
    Geodesic(Orbit),
}

/// Cylindrical coordinates and rates for the Newtonian scheme
#[derive(Debug, Clone, Copy)]
pub struct Cylindrical {
    pub(crate) theta: f32,
    pub(crate) y: f32,
    pub(crate) r_dot: f32,
    pub(crate) theta_dot: f32,
    pub(crate) y_dot: f32,
    /// Specific angular momentum about the y axis
    pub(crate) h: f32,
}

/// Orbital-plane parameters for the exact Schwarzschild scheme
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub(crate) u: f32,
    pub(crate) b: f32,
    pub(crate) phi: f32,
    pub(crate) e1: Vec3,
    pub(crate) e2: Vec3,
    pub(crate) sign: f32,
    pub(crate) r_dot: f32,
    pub(crate) turning_epsilon: f32,
    /// Cleared by a turning point, set again once |r_dot| clears epsilon
    pub(crate) armed: bool,
    pub(crate) turning_points: u32,
}

impl Cylindrical {
    /// Project the launch direction onto the local cylindrical frame at `position`
    fn from_launch(position: Vec3, direction: Vec3, r: f32) -> Self {
        let theta = position.z.atan2(position.x);
        let (sin_t, cos_t) = theta.sin_cos();

        let radial = Vec3::new(cos_t, 0.0, sin_t);
        let tangential = Vec3::new(-sin_t, 0.0, cos_t);

        let r_dot = direction.dot(radial);
        let v_t = direction.dot(tangential);
        let theta_dot = if r > 0.0 { v_t / r } else { 0.0 };

        Self {
            theta,
            y: position.y,
            r_dot,
            theta_dot,
            y_dot: direction.y,
            h: r * v_t,
        }
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// Conserved angular momentum `r * v_tangential`
    pub fn angular_momentum(&self) -> f32 {
        self.h
    }
}

impl Orbit {
    /// Impact parameter, fixed at launch
    pub fn impact_parameter(&self) -> f32 {
        self.b
    }

    /// Angle swept in the orbital plane since launch
    pub fn phi(&self) -> f32 {
        self.phi
    }

    /// Fixed in-plane basis: launch radial direction and its in-plane normal
    pub fn basis(&self) -> (Vec3, Vec3) {
        (self.e1, self.e2)
    }

    /// +1 while receding from the centre, -1 while falling in
    pub fn sign(&self) -> f32 {
        self.sign
    }

    /// Signed radial rate from the last step
    pub fn radial_rate(&self) -> f32 {
        self.r_dot
    }

    /// Number of radial turning points crossed so far
    pub fn turning_points(&self) -> u32 {
        self.turning_points
    }
}

impl RayState {
    /// Ray advanced with the flat-space cylindrical approximation
    pub fn newtonian(origin: Vec3, direction: Vec3, gm: f32, disk_height: f32) -> Self {
        let direction = direction.normalize();
        let r = Vec2::new(origin.x, origin.z).length();
        let cylindrical = Cylindrical::from_launch(origin, direction, r);

        Self {
            position: origin,
            direction,
            r,
            rho: origin.length(),
            t: 0.0,
            gm,
            disk_height,
            scheme: Scheme::Newtonian(cylindrical),
        }
    }

    /// Ray advanced along the exact Schwarzschild photon orbit
    pub fn geodesic(
        origin: Vec3,
        direction: Vec3,
        gm: f32,
        disk_height: f32,
        settings: &TraceSettings,
    ) -> Self {
        let direction = direction.normalize();
        let r = Vec2::new(origin.x, origin.z).length();
        let rho = origin.length();

        let normal = origin.cross(direction);
        let b = normal.length();

        let e1 = origin.try_normalize().unwrap_or(Vec3::X);
        let e2_raw = normal.cross(e1);
        let e2 = if e2_raw.length() < settings.degenerate_basis_tolerance {
            // Radial launch: the orbital plane is undefined, any plane through e1 works
            log::warn!(
                "degenerate orbital basis at {:?} along {:?}, substituting an orthogonal vector",
                origin,
                direction
            );
            e1.any_orthonormal_vector()
        } else {
            e2_raw.normalize()
        };

        let sign = if origin.dot(direction) >= 0.0 { 1.0 } else { -1.0 };

        let orbit = Orbit {
            u: 1.0 / rho,
            b,
            phi: 0.0,
            e1,
            e2,
            sign,
            r_dot: 0.0,
            turning_epsilon: settings.turning_epsilon,
            armed: true,
            turning_points: 0,
        };

        Self {
            position: origin,
            direction,
            r,
            rho,
            t: 0.0,
            gm,
            disk_height,
            scheme: Scheme::Geodesic(orbit),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Launch direction, unit length
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Distance from the y axis
    pub fn r(&self) -> f32 {
        self.r
    }

    /// Distance from the centre
    pub fn rho(&self) -> f32 {
        self.rho
    }

    /// Affine parameter accumulated since launch
    pub fn t(&self) -> f32 {
        self.t
    }

    pub fn orbit(&self) -> Option<&Orbit> {
        match &self.scheme {
            Scheme::Geodesic(orbit) => Some(orbit),
            Scheme::Newtonian(_) => None,
        }
    }

    pub fn cylindrical(&self) -> Option<&Cylindrical> {
        match &self.scheme {
            Scheme::Newtonian(cyl) => Some(cyl),
            Scheme::Geodesic(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn settings() -> TraceSettings {
        TraceSettings::default()
    }

    #[test]
    fn direction_is_normalized() {
        let ray = RayState::newtonian(Vec3::new(5.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 3.0), 1.0, 0.1);
        assert!((ray.direction().length() - 1.0).abs() < EPS);
        assert_eq!(ray.direction(), Vec3::Z);
    }

    #[test]
    fn newtonian_cylindrical_projection() {
        // On the +x axis moving along +z: purely tangential
        let ray = RayState::newtonian(Vec3::new(4.0, 0.5, 0.0), Vec3::Z, 1.0, 0.1);
        let cyl = ray.cylindrical().expect("newtonian scheme");
        assert!((ray.r() - 4.0).abs() < EPS);
        assert!(cyl.theta().abs() < EPS);
        assert!((cyl.y() - 0.5).abs() < EPS);
        assert!(cyl.r_dot.abs() < EPS);
        assert!((cyl.angular_momentum() - 4.0).abs() < EPS);
        assert!((cyl.theta_dot - 0.25).abs() < EPS);
        assert!(ray.orbit().is_none());
    }

    #[test]
    fn geodesic_orbital_parameters() {
        let origin = Vec3::new(-20.0, 0.0, 6.0);
        let ray = RayState::geodesic(origin, Vec3::X, 1.0, 0.1, &settings());
        let orbit = ray.orbit().expect("geodesic scheme");

        assert!((orbit.impact_parameter() - 6.0).abs() < 1e-4);
        assert!((ray.rho() - origin.length()).abs() < EPS);
        assert!((orbit.u - 1.0 / origin.length()).abs() < EPS);
        assert_eq!(orbit.phi(), 0.0);
        assert_eq!(orbit.sign(), -1.0);
        assert!(ray.cylindrical().is_none());
    }

    #[test]
    fn geodesic_basis_is_orthonormal_and_in_plane() {
        let origin = Vec3::new(3.0, 2.0, -7.0);
        let direction = Vec3::new(-0.2, 0.4, 1.0);
        let ray = RayState::geodesic(origin, direction, 1.0, 0.1, &settings());
        let (e1, e2) = ray.orbit().expect("geodesic scheme").basis();

        assert!((e1.length() - 1.0).abs() < EPS);
        assert!((e2.length() - 1.0).abs() < EPS);
        assert!(e1.dot(e2).abs() < EPS);

        let normal = origin.cross(direction).normalize();
        assert!(e1.dot(normal).abs() < EPS);
        assert!(e2.dot(normal).abs() < EPS);
        // e2 points along the launch's tangential motion
        assert!(e2.dot(ray.direction()) > 0.0);
    }

    #[test]
    fn outgoing_launch_has_positive_sign() {
        let ray = RayState::geodesic(Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.3, 0.0, 1.0), 1.0, 0.1, &settings());
        assert_eq!(ray.orbit().expect("geodesic scheme").sign(), 1.0);
    }

    #[test]
    fn radial_launch_gets_fallback_basis() {
        let ray = RayState::geodesic(Vec3::new(10.0, 0.0, 0.0), -Vec3::X, 1.0, 0.1, &settings());
        let orbit = ray.orbit().expect("geodesic scheme");
        let (e1, e2) = orbit.basis();

        assert!(orbit.impact_parameter().abs() < EPS);
        assert!(e2.is_finite());
        assert!((e2.length() - 1.0).abs() < EPS);
        assert!(e1.dot(e2).abs() < EPS);
    }
}

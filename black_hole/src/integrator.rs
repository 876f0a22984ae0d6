//! Stepping schemes
//!
//! Two ways to advance a [`RayState`] by one affine step:
//!
//! - Newtonian: inverse-square pull split into cylindrical components and
//!   integrated with semi-implicit Euler. Stable but not exact near the
//!   photon sphere.
//! - Geodesic: the Schwarzschild photon orbit written in terms of the
//!   conserved impact parameter `b`,
//!
//!   ```text
//!   dphi/dlambda = b u²
//!   (dr/dlambda)² = 1 - (1 - 2 GM u) b² u²        u = 1/r
//!   ```
//!
//!   with the position rebuilt every step from the launch basis, so the
//!   orbital plane never drifts.

use glam::Vec3;

use crate::config::TraceSettings;
use crate::ray::{Cylindrical, Orbit, RayState, Scheme};

impl RayState {
    /// Advance by `dt` with whichever scheme the ray was built with
    pub fn step(&mut self, dt: f32, settings: &TraceSettings) {
        match &mut self.scheme {
            Scheme::Newtonian(cyl) => {
                newtonian_step(cyl, &mut self.r, &mut self.rho, self.gm, dt, settings);
                self.position = Vec3::new(
                    self.r * cyl.theta.cos(),
                    cyl.y,
                    self.r * cyl.theta.sin(),
                );
            }
            Scheme::Geodesic(orbit) => {
                geodesic_step(orbit, &mut self.rho, self.gm, dt);
                self.position = self.rho * (orbit.phi.cos() * orbit.e1 + orbit.phi.sin() * orbit.e2);
                self.r = self.position.x.hypot(self.position.z);
            }
        }
        self.t += dt;
    }
}

fn newtonian_step(
    cyl: &mut Cylindrical,
    r: &mut f32,
    rho: &mut f32,
    gm: f32,
    dt: f32,
    settings: &TraceSettings,
) {
    let (sin_t, cos_t) = cyl.theta.sin_cos();

    *rho = (*r * *r + cyl.y * cyl.y).sqrt();
    let g_magnitude = gm / (*rho * *rho);
    let toward_centre = -Vec3::new(*r * cos_t, cyl.y, *r * sin_t).normalize_or_zero();
    let g = toward_centre * g_magnitude;

    let g_r = g.dot(Vec3::new(cos_t, 0.0, sin_t));
    let g_y = g.y;

    cyl.theta_dot = cyl.h / (*r * *r).clamp(settings.axis_r2_min, settings.axis_r2_max);
    cyl.r_dot += (g_r + *r * cyl.theta_dot * cyl.theta_dot) * dt;
    cyl.y_dot += g_y * dt;

    *r += cyl.r_dot * dt;
    cyl.theta += cyl.theta_dot * dt;
    cyl.y += cyl.y_dot * dt;
}

fn geodesic_step(orbit: &mut Orbit, rho: &mut f32, gm: f32, lambda: f32) {
    orbit.phi += orbit.b * orbit.u * orbit.u * lambda;

    let bu = orbit.b * orbit.u;
    let radicand = 1.0 - (1.0 - 2.0 * gm * orbit.u) * bu * bu;
    let mut speed = radicand.max(0.0).sqrt();

    if speed < orbit.turning_epsilon {
        if orbit.armed {
            orbit.sign = -orbit.sign;
            orbit.armed = false;
            orbit.turning_points += 1;
        }
        // Past the turning radius the radicand goes negative; walk back out at
        // the mirrored speed instead of sitting at zero.
        speed = (-radicand).max(0.0).sqrt().max(orbit.turning_epsilon);
    } else {
        orbit.armed = true;
    }

    orbit.r_dot = orbit.sign * speed;
    *rho += orbit.r_dot * lambda;
    orbit.u = 1.0 / *rho;
}

//! Camera system for the ray-traced views

use glam::Vec3;

/// Pitch limit in degrees, keeps the view from flipping over the pole
pub const PITCH_LIMIT: f32 = 89.0;

/// Snapshot of the camera for one frame: origin, orthonormal basis and
/// vertical field of view in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub fov: f32,
}

impl CameraFrame {
    /// Build a frame looking from `position` towards `target`
    pub fn look_at(position: Vec3, target: Vec3, world_up: Vec3, fov: f32) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(world_up).normalize();
        let up = right.cross(forward).normalize();

        Self {
            position,
            forward,
            right,
            up,
            fov,
        }
    }

    /// World-space direction through normalized screen coordinates
    /// (`u`, `v` in [0, 1], `v` growing downwards).
    pub fn ray_direction(&self, u: f32, v: f32, aspect_ratio: f32) -> Vec3 {
        let ndc_x = 2.0 * u - 1.0;
        let ndc_y = 1.0 - 2.0 * v;
        let scale = (self.fov * 0.5).tan();

        let x = ndc_x * aspect_ratio * scale;
        let y = ndc_y * scale;

        (self.right * x + self.up * y + self.forward).normalize()
    }
}

/// First-person camera driven by yaw/pitch angles (degrees)
#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub world_up: Vec3,
    pub sensitivity: f32,
}

impl FlyCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: 45.0f32.to_radians(),
            world_up: Vec3::Y,
            sensitivity: 0.1,
        }
    }

    /// Place the camera at `position` and aim it at `target`
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        let dir = (target - position).normalize();
        let pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees();
        let yaw = dir.z.atan2(dir.x).to_degrees();
        Self::new(position, yaw, pitch)
    }

    /// Forward, right and up vectors for the current yaw/pitch
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        let forward = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        let right = forward.cross(self.world_up).normalize();
        let up = right.cross(forward).normalize();

        (forward, right, up)
    }

    /// Apply a mouse delta in pixels; screen y grows downwards
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move along the camera's own axes; `vertical` follows world up
    pub fn translate_local(&mut self, forward: f32, right: f32, vertical: f32, amount: f32) {
        let (f, r, _) = self.basis();
        self.position += (f * forward + r * right + self.world_up * vertical) * amount;
    }

    /// Freeze the current state into a per-frame snapshot
    pub fn frame(&self) -> CameraFrame {
        let (forward, right, up) = self.basis();
        CameraFrame {
            position: self.position,
            forward,
            right,
            up,
            fov: self.fov,
        }
    }
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 7.0, 7.0), Vec3::ZERO)
    }
}

//! Perspective orbit camera and screen-to-world rays.

use crate::picking::Ray;
use glam::{Mat4, Vec2, Vec3};

/// Viewports narrower than this many pixels get the pulled-back framing.
pub const NARROW_VIEWPORT: u32 = 768;

const ORBIT_SENSITIVITY: f32 = 0.005;
const MAX_PITCH: f32 = 1.5;
const ZOOM_STEP: f32 = 8.0;
const MIN_DISTANCE: f32 = 20.0;
const MAX_DISTANCE: f32 = 600.0;

/// Orbit camera looking at the tree.
///
/// With zero yaw and pitch the eye sits at `target + (0, 0, distance)` and
/// looks straight down -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Frame the tree for a viewport of `width` x `height` pixels.
    ///
    /// Narrow (phone-sized) viewports move the eye lower and further back so
    /// the whole tree fits.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let (eye_height, distance) = if width < NARROW_VIEWPORT {
            (50.0, 200.0)
        } else {
            (60.0, 170.0)
        };
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance,
            target: Vec3::new(0.0, eye_height, 0.0),
            fov_y: 75.0_f32.to_radians(),
            aspect: aspect_ratio(width, height),
            near: 0.1,
            far: 5000.0,
        }
    }

    /// Rotate around the target by a pointer drag of `delta` pixels.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch + delta.y * ORBIT_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move toward (positive `scroll`) or away from the target.
    pub fn zoom(&mut self, scroll: f32) {
        self.distance = (self.distance - scroll * ZOOM_STEP).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Track a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the eye through a point in normalized device coordinates.
    ///
    /// `ndc` runs from -1 to 1 on both axes, +Y up.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        // Unprojecting through the full view-projection loses precision with a
        // 0.1..5000 depth range, so build the view-space direction directly.
        let half_height = (self.fov_y * 0.5).tan();
        let view_dir = Vec3::new(ndc.x * half_height * self.aspect, ndc.y * half_height, -1.0);
        let world_dir = self.view_matrix().inverse().transform_vector3(view_dir);
        Ray::new(self.position(), world_dir)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::for_viewport(1280, 720)
    }
}

/// Convert a pixel position to normalized device coordinates.
///
/// Origin is at the center of the viewport, +Y up.
pub fn pixel_to_ndc(x: f32, y: f32, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2::new((x / w) * 2.0 - 1.0, 1.0 - (y / h) * 2.0)
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_framing() {
        let cam = Camera::for_viewport(1280, 720);
        assert!((cam.position() - Vec3::new(0.0, 60.0, 170.0)).length() < 1e-4);

        let narrow = Camera::for_viewport(400, 800);
        assert!((narrow.position() - Vec3::new(0.0, 50.0, 200.0)).length() < 1e-4);
    }

    #[test]
    fn test_orbit_and_zoom_are_clamped() {
        let mut cam = Camera::default();
        cam.orbit(Vec2::new(0.0, 10_000.0));
        assert_eq!(cam.pitch, 1.5);
        cam.orbit(Vec2::new(100.0, 0.0));
        assert!((cam.yaw + 0.5).abs() < 1e-6);

        cam.zoom(1000.0);
        assert_eq!(cam.distance, 20.0);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, 600.0);
    }

    #[test]
    fn test_center_ray_looks_down_negative_z() {
        let cam = Camera::default();
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert!((ray.origin - cam.position()).length() < 1e-4);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_corner_ray_points_up_right() {
        let cam = Camera::default();
        let ray = cam.ray_from_ndc(Vec2::new(1.0, 1.0));
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.y > 0.0);
        assert!(ray.direction.z < 0.0);
    }

    #[test]
    fn test_pixel_to_ndc() {
        let center = pixel_to_ndc(400.0, 300.0, 800, 600);
        assert!(center.length() < 1e-6);
        let top_left = pixel_to_ndc(0.0, 0.0, 800, 600);
        assert_eq!(top_left, Vec2::new(-1.0, 1.0));
    }
}

//! Perspective camera

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use viewer_core::FramingResult;

/// Camera uniform buffer data sent to GPU (80 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position (xyz), w unused
    pub eye: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Y-up perspective camera looking at a target point
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees,
            aspect: sanitize_aspect(aspect),
            near,
            far,
        }
    }

    /// Builder-style position override
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Update the aspect ratio; zero or non-finite ratios are ignored
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Place the camera according to an auto-framing result
    pub fn apply_framing(&mut self, framing: &FramingResult) {
        self.position = framing.camera_position;
        self.target = framing.look_at_target;
    }

    /// Distance from the camera to its target
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            eye: self.position.extend(1.0).to_array(),
        }
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use viewer_core::{BoundingVolume, DeviceProfile, compute_framing};

    #[test]
    fn test_apply_framing() {
        let mut camera = PerspectiveCamera::new(5.0, 1.5, 0.1, 1000.0);
        let volume = BoundingVolume::new(Vec3::ZERO, Vec3::splat(2.0));
        let framing = compute_framing(&volume, camera.fov_degrees, DeviceProfile::MOBILE);

        camera.apply_framing(&framing);
        assert_relative_eq!(camera.position.x, -1.0);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = PerspectiveCamera::new(45.0, 1.0, 0.1, 100.0)
            .with_position(Vec3::new(3.0, 0.0, 4.0));
        let clip = camera.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_invalid_aspect_ignored() {
        let mut camera = PerspectiveCamera::new(5.0, 0.0, 0.1, 1000.0);
        assert_eq!(camera.aspect, 1.0);

        camera.set_aspect(16.0 / 9.0);
        camera.set_aspect(f32::NAN);
        camera.set_aspect(-1.0);
        assert_relative_eq!(camera.aspect, 16.0 / 9.0);
    }

    #[test]
    fn test_uniform_eye() {
        let camera = PerspectiveCamera::new(5.0, 1.0, 0.1, 1000.0)
            .with_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.uniform().eye, [1.0, 2.0, 3.0, 1.0]);
    }
}

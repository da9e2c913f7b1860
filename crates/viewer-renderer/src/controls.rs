//! Constrained orbit controls

use std::f32::consts::TAU;

use glam::Vec3;
use viewer_core::InteractionConstraints;

use crate::camera::PerspectiveCamera;

/// Relative displacement below which a rotation counts as no movement
const MOVE_TOLERANCE: f32 = 1e-5;

/// Pointer input delivered by the surface, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Primary-button drag
    Rotate { dx: f32, dy: f32 },
    /// Scroll wheel / pinch
    Zoom { delta: f32 },
    /// Secondary-button drag
    Pan { dx: f32, dy: f32 },
}

/// Orbits a camera around a fixed pivot under [`InteractionConstraints`].
///
/// Angles are spherical coordinates around +Y: the azimuth is measured in
/// the XZ plane from +Z, the polar angle from +Y.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    target: Vec3,
    constraints: InteractionConstraints,
    rotate_speed: f32,
    /// Height of the surface in pixels; a full-height drag is one turn
    viewport_height: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3, constraints: InteractionConstraints) -> Self {
        Self {
            target,
            constraints,
            rotate_speed: 1.0,
            viewport_height: 1.0,
        }
    }

    pub fn with_rotate_speed(mut self, speed: f32) -> Self {
        self.rotate_speed = speed;
        self
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn constraints(&self) -> &InteractionConstraints {
        &self.constraints
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        if height.is_finite() && height >= 1.0 {
            self.viewport_height = height;
        }
    }

    /// Apply one input event. Returns true if the camera moved.
    pub fn handle(&self, input: &PointerInput, camera: &mut PerspectiveCamera) -> bool {
        match *input {
            PointerInput::Rotate { dx, dy } if self.constraints.rotate_enabled => {
                let per_pixel = TAU / self.viewport_height * self.rotate_speed;
                self.rotate(camera, -dx * per_pixel, -dy * per_pixel)
            }
            PointerInput::Zoom { .. } if self.constraints.zoom_enabled => {
                tracing::warn!("Zoom is not supported by orbit controls");
                false
            }
            PointerInput::Pan { .. } if self.constraints.pan_enabled => {
                tracing::warn!("Pan is not supported by orbit controls");
                false
            }
            _ => false,
        }
    }

    fn rotate(&self, camera: &mut PerspectiveCamera, d_azimuth: f32, d_polar: f32) -> bool {
        let offset = camera.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return false;
        }

        let azimuth = offset.x.atan2(offset.z) + d_azimuth;
        let polar = self
            .constraints
            .clamp_polar((offset.y / radius).clamp(-1.0, 1.0).acos() + d_polar);

        let new_offset = Vec3::new(
            radius * polar.sin() * azimuth.sin(),
            radius * polar.cos(),
            radius * polar.sin() * azimuth.cos(),
        );

        let position = self.target + new_offset;
        let moved = position.distance(camera.position) > MOVE_TOLERANCE * radius.max(1.0)
            || camera.target != self.target;
        camera.set_position(position);
        camera.look_at(self.target);
        moved
    }
}

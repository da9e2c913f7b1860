//! Auto-framing: fit a bounding volume into the camera view

use glam::Vec3;

use crate::bounds::BoundingVolume;
use crate::device::DeviceProfile;

/// Distance used when the bounding volume has no extent
pub const MIN_FRAMING_DISTANCE: f32 = 1.0;

/// Camera placement produced by [`compute_framing`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingResult {
    pub camera_position: Vec3,
    pub look_at_target: Vec3,
    /// Framing distance before the device distance factor is applied
    pub distance: f32,
}

impl DeviceProfile {
    /// Horizontal offset factor applied to the largest dimension
    pub fn zoom_factor(&self) -> f32 {
        if self.is_mobile { 0.5 } else { 0.7 }
    }

    /// Multiplier on the framing distance
    pub fn distance_factor(&self) -> f32 {
        if self.is_mobile { 1.0 } else { 0.5 }
    }
}

/// Compute a camera placement that frames `volume` with a vertical field of
/// view of `fov_degrees`.
///
/// The camera sits on the +Z side of the volume, shifted along -X by a
/// device-dependent fraction of the largest dimension, and looks at the
/// volume center.
pub fn compute_framing(
    volume: &BoundingVolume,
    fov_degrees: f32,
    device: DeviceProfile,
) -> FramingResult {
    let center = volume.center;
    let max_dim = if volume.is_degenerate() { 0.0 } else { volume.max_dim() };

    let distance = framing_distance(max_dim, fov_degrees);

    let camera_position = Vec3::new(
        center.x - max_dim * device.zoom_factor(),
        center.y,
        center.z + distance * device.distance_factor(),
    );

    FramingResult {
        camera_position,
        look_at_target: center,
        distance,
    }
}

/// Distance at which an object of size `max_dim` fills the field of view.
/// Falls back to [`MIN_FRAMING_DISTANCE`] when the result is unusable.
fn framing_distance(max_dim: f32, fov_degrees: f32) -> f32 {
    let distance = max_dim / (fov_degrees.to_radians() / 2.0).tan();
    if max_dim > 0.0 && distance.is_finite() && distance > 0.0 {
        distance
    } else {
        tracing::debug!(
            max_dim,
            fov_degrees,
            "Degenerate framing input, using minimum distance"
        );
        MIN_FRAMING_DISTANCE
    }
}

/// Offset that moves a model centered at `center` onto `scene_origin`.
///
/// The model's position is translated by the negated offset.
pub fn recenter_offset(center: Vec3, scene_origin: Vec3) -> Vec3 {
    center - scene_origin
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mobile_scenario() {
        let volume = BoundingVolume::new(Vec3::ZERO, Vec3::splat(2.0));
        let framing = compute_framing(&volume, 5.0, DeviceProfile::MOBILE);

        let expected_distance = 2.0 / (5.0f32.to_radians() / 2.0).tan();
        assert_relative_eq!(framing.camera_position.x, -1.0);
        assert_relative_eq!(framing.camera_position.y, 0.0);
        assert_relative_eq!(framing.camera_position.z, expected_distance, epsilon = 1e-3);
        assert_eq!(framing.look_at_target, Vec3::ZERO);
    }

    #[test]
    fn test_desktop_factors() {
        let volume = BoundingVolume::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 4.0, 2.0));
        let framing = compute_framing(&volume, 45.0, DeviceProfile::DESKTOP);

        let distance = 4.0 / (22.5f32.to_radians()).tan();
        assert_relative_eq!(framing.distance, distance, epsilon = 1e-4);
        assert_relative_eq!(framing.camera_position.x, 1.0 - 4.0 * 0.7, epsilon = 1e-5);
        assert_relative_eq!(framing.camera_position.y, 2.0);
        assert_relative_eq!(framing.camera_position.z, 3.0 + distance * 0.5, epsilon = 1e-4);
        assert_eq!(framing.look_at_target, volume.center);
    }

    #[test]
    fn test_positive_distance_is_deterministic() {
        let sizes = [0.001, 0.5, 1.0, 37.0, 1200.0];
        for size in sizes {
            let volume = BoundingVolume::new(Vec3::new(3.0, -1.0, 0.5), Vec3::new(size, size * 0.5, 0.1));
            for device in [DeviceProfile::MOBILE, DeviceProfile::DESKTOP] {
                let a = compute_framing(&volume, 5.0, device);
                let b = compute_framing(&volume, 5.0, device);
                assert_eq!(a, b);
                assert!(a.distance > 0.0);
                assert!(a.distance.is_finite());
            }
        }
    }

    #[test]
    fn test_degenerate_volume_uses_floor() {
        let volume = BoundingVolume::new(Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO);
        let framing = compute_framing(&volume, 5.0, DeviceProfile::DESKTOP);

        assert_eq!(framing.distance, MIN_FRAMING_DISTANCE);
        assert!(framing.camera_position.is_finite());
        assert_relative_eq!(framing.camera_position.z, 1.0 + MIN_FRAMING_DISTANCE * 0.5);
        assert_eq!(framing.look_at_target, volume.center);
    }

    #[test]
    fn test_degenerate_fov_uses_floor() {
        let volume = BoundingVolume::new(Vec3::ZERO, Vec3::ONE);
        let framing = compute_framing(&volume, 0.0, DeviceProfile::MOBILE);
        assert_eq!(framing.distance, MIN_FRAMING_DISTANCE);
        assert!(framing.camera_position.is_finite());
    }

    #[test]
    fn test_non_finite_size_uses_floor() {
        let volume = BoundingVolume::new(Vec3::ZERO, Vec3::new(f32::NAN, 1.0, 1.0));
        let framing = compute_framing(&volume, 5.0, DeviceProfile::MOBILE);
        assert!(framing.distance.is_finite());
        assert!(framing.distance > 0.0);
    }

    #[test]
    fn test_recenter_offset_honors_scene_origin() {
        let offset = recenter_offset(Vec3::new(2.0, 3.0, 4.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(offset, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(recenter_offset(Vec3::ONE, Vec3::ONE), Vec3::ZERO);
    }
}

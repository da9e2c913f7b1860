//! Orbit interaction policy

use std::f32::consts::FRAC_PI_2;

/// Fixed interaction policy: the camera may only orbit around the vertical
/// axis at a fixed elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConstraints {
    pub rotate_enabled: bool,
    pub zoom_enabled: bool,
    pub pan_enabled: bool,
    /// Minimum polar angle from +Y (radians)
    pub min_polar_angle: f32,
    /// Maximum polar angle from +Y (radians)
    pub max_polar_angle: f32,
}

impl InteractionConstraints {
    /// The only policy the viewer applies
    pub const HORIZONTAL_ORBIT: Self = Self {
        rotate_enabled: true,
        zoom_enabled: false,
        pan_enabled: false,
        min_polar_angle: FRAC_PI_2,
        max_polar_angle: FRAC_PI_2,
    };

    /// Clamp a polar angle into the allowed range
    pub fn clamp_polar(&self, polar: f32) -> f32 {
        polar.clamp(self.min_polar_angle, self.max_polar_angle)
    }
}

impl Default for InteractionConstraints {
    fn default() -> Self {
        Self::HORIZONTAL_ORBIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_policy() {
        let c = InteractionConstraints::default();
        assert!(c.rotate_enabled);
        assert!(!c.zoom_enabled);
        assert!(!c.pan_enabled);
        assert_eq!(c.min_polar_angle, FRAC_PI_2);
        assert_eq!(c.max_polar_angle, FRAC_PI_2);
    }

    #[test]
    fn test_clamp_polar_pins_to_equator() {
        let c = InteractionConstraints::HORIZONTAL_ORBIT;
        assert_eq!(c.clamp_polar(0.0), FRAC_PI_2);
        assert_eq!(c.clamp_polar(3.0), FRAC_PI_2);
    }
}

//! Ambient and directional lights

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Light uniform buffer data sent to GPU (64 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// Direction towards the light (normalized, world space) - xyz = direction, w = unused
    pub direction: [f32; 4],
    /// Directional light color (RGB) and intensity (A)
    pub color_intensity: [f32; 4],
    /// Ambient color (RGB) and intensity (A)
    pub ambient: [f32; 4],
    /// x = casts shadow (1.0 or 0.0), yzw unused
    pub shadow_params: [f32; 4],
}

impl Default for LightUniform {
    fn default() -> Self {
        AmbientLight::default().uniform_with(&DirectionalLight::default())
    }
}

/// Uniform light applied to every surface regardless of orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Combine with a directional light into the GPU uniform
    pub fn uniform_with(&self, directional: &DirectionalLight) -> LightUniform {
        let dir = directional.direction();
        LightUniform {
            direction: [dir.x, dir.y, dir.z, 0.0],
            color_intensity: [
                directional.color.x,
                directional.color.y,
                directional.color.z,
                directional.intensity,
            ],
            ambient: [self.color.x, self.color.y, self.color.z, self.intensity],
            shadow_params: [
                if directional.cast_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
                0.0,
            ],
        }
    }
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self::new(Vec3::ONE, 0.8)
    }
}

/// Directional light
///
/// Rays are parallel and travel from `position` towards `target`, like a
/// distant sun placed above and in front of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub cast_shadow: bool,
}

impl DirectionalLight {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            target: Vec3::ZERO,
            color,
            intensity,
            cast_shadow: false,
        }
    }

    pub fn with_shadow(mut self, cast_shadow: bool) -> Self {
        self.cast_shadow = cast_shadow;
        self
    }

    /// Normalized direction from the target towards the light
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target)
            .try_normalize()
            .unwrap_or(Vec3::Y)
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 10.0, 10.0), Vec3::ONE, 0.5).with_shadow(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_points_to_light() {
        let light = DirectionalLight::default();
        let dir = light.direction();
        assert_relative_eq!(dir.x, 0.0);
        assert_relative_eq!(dir.y, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
        assert_relative_eq!(dir.z, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_direction_falls_back() {
        let light = DirectionalLight::new(Vec3::ZERO, Vec3::ONE, 1.0);
        assert_eq!(light.direction(), Vec3::Y);
    }

    #[test]
    fn test_uniform_packing() {
        let uniform = LightUniform::default();
        assert_eq!(uniform.ambient, [1.0, 1.0, 1.0, 0.8]);
        assert_eq!(uniform.color_intensity, [1.0, 1.0, 1.0, 0.5]);
        assert_eq!(uniform.shadow_params[0], 1.0);
        assert_eq!(std::mem::size_of::<LightUniform>(), 64);
    }
}

//! Scene graph: lights, origin and render-on-demand state.
//!
//! The scene owns no asset data. The loaded model is kept by the viewer and
//! handed to the renderer alongside the scene.

use glam::Vec3;

use crate::light::{AmbientLight, DirectionalLight, LightUniform};

/// Scene containing the lighting rig.
pub struct Scene {
    origin: Vec3,
    ambient: AmbientLight,
    directional: DirectionalLight,
    dirty: bool,
}

/// Creates a fresh scene lit by one ambient and one shadow-casting
/// directional light.
pub fn build_scene() -> Scene {
    let scene = Scene {
        origin: Vec3::ZERO,
        ambient: AmbientLight::default(),
        directional: DirectionalLight::default(),
        dirty: true,
    };
    tracing::debug!(
        "Built scene: ambient {:.1}, directional {:.1} at {:?}",
        scene.ambient.intensity,
        scene.directional.intensity,
        scene.directional.position
    );
    scene
}

impl Scene {
    /// Position of the scene root. Models are re-centered onto this point.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn ambient(&self) -> &AmbientLight {
        &self.ambient
    }

    pub fn directional(&self) -> &DirectionalLight {
        &self.directional
    }

    pub fn light_count(&self) -> usize {
        2
    }

    pub fn light_uniform(&self) -> LightUniform {
        self.ambient.uniform_with(&self.directional)
    }

    /// Returns true if the scene has been modified since last render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the scene as dirty (needs re-render).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Marks the scene as clean (called after rendering).
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_scene_lights() {
        let scene = build_scene();
        assert_eq!(scene.light_count(), 2);
        assert_eq!(scene.origin(), Vec3::ZERO);
        assert_eq!(scene.ambient().intensity, 0.8);
        assert_eq!(scene.directional().intensity, 0.5);
        assert_eq!(scene.directional().position, Vec3::new(0.0, 10.0, 10.0));
        assert!(scene.directional().cast_shadow);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut scene = build_scene();
        assert!(scene.is_dirty());
        scene.mark_clean();
        assert!(!scene.is_dirty());
        scene.mark_dirty();
        assert!(scene.is_dirty());
    }
}

//! Axis-aligned bounding volumes

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box tightly enclosing a model's geometry.
///
/// Stored as center + size. An empty set of points yields a zero-sized
/// volume at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    pub center: Vec3,
    pub size: Vec3,
}

impl BoundingVolume {
    /// Zero-sized volume at the origin
    pub const EMPTY: Self = Self {
        center: Vec3::ZERO,
        size: Vec3::ZERO,
    };

    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// Build from min/max corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    /// Bounds of a point cloud
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut any = false;

        for p in points {
            min = min.min(p);
            max = max.max(p);
            any = true;
        }

        if any {
            Self::from_min_max(min, max)
        } else {
            Self::EMPTY
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Largest extent along any axis
    pub fn max_dim(&self) -> f32 {
        self.size.max_element()
    }

    /// True if the volume encloses no extent (empty or a single point)
    pub fn is_degenerate(&self) -> bool {
        let max_dim = self.max_dim();
        !max_dim.is_finite() || max_dim <= 0.0
    }

    /// Returns a copy moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            center: self.center + offset,
            size: self.size,
        }
    }
}

impl Default for BoundingVolume {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points() {
        let volume = BoundingVolume::from_points([
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, 4.0, 2.0),
            Vec3::new(1.0, -2.0, 6.0),
        ]);
        assert_eq!(volume.center, Vec3::new(1.0, 1.0, 4.0));
        assert_eq!(volume.size, Vec3::new(4.0, 6.0, 4.0));
        assert_eq!(volume.max_dim(), 6.0);
        assert!(!volume.is_degenerate());
    }

    #[test]
    fn test_empty_points_are_degenerate() {
        let volume = BoundingVolume::from_points(std::iter::empty());
        assert_eq!(volume, BoundingVolume::EMPTY);
        assert!(volume.is_degenerate());

        let single = BoundingVolume::from_points([Vec3::new(5.0, 5.0, 5.0)]);
        assert_eq!(single.center, Vec3::splat(5.0));
        assert!(single.is_degenerate());
    }

    #[test]
    fn test_translated_keeps_size() {
        let volume = BoundingVolume::new(Vec3::new(11.0, 3.0, 1.0), Vec3::new(2.0, 6.0, 2.0));
        let moved = volume.translated(Vec3::new(-11.0, -3.0, -1.0));
        assert_relative_eq!(moved.center.x, 0.0);
        assert_relative_eq!(moved.center.y, 0.0);
        assert_relative_eq!(moved.center.z, 0.0);
        assert_eq!(moved.size, volume.size);
    }
}

//! Loaded model data

use glam::{Mat4, Vec3};
use uuid::Uuid;

use crate::bounds::BoundingVolume;

/// Triangle list with per-vertex normals, in the owning node's local space
#[derive(Debug, Clone, Default)]
pub struct MeshPrimitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Base color (RGBA)
    pub base_color: [f32; 4],
}

impl MeshPrimitive {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }
}

/// Node of the model's scene graph
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: Option<String>,
    /// Transform relative to the parent node
    pub local_transform: Mat4,
    pub primitives: Vec<MeshPrimitive>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn new(name: Option<String>, local_transform: Mat4) -> Self {
        Self {
            name,
            local_transform,
            primitives: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Depth-first walk yielding each node with its accumulated transform
    fn visit<'a>(&'a self, parent: Mat4, f: &mut impl FnMut(Mat4, &'a ModelNode)) {
        let world = parent * self.local_transform;
        f(world, self);
        for child in &self.children {
            child.visit(world, f);
        }
    }
}

/// A loaded model: a node tree plus a model-level translation.
///
/// The translation is the only state mutated after loading (re-centering).
#[derive(Debug, Clone)]
pub struct Model {
    pub id: Uuid,
    pub name: String,
    pub root: ModelNode,
    /// Translation of the whole model in scene space
    pub position: Vec3,
}

impl Model {
    pub fn new(name: impl Into<String>, root: ModelNode) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            root,
            position: Vec3::ZERO,
        }
    }

    /// Model-to-scene transform
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    /// Every primitive with its transform relative to the model origin
    pub fn primitives(&self) -> Vec<(Mat4, &MeshPrimitive)> {
        let mut out = Vec::new();
        self.root.visit(Mat4::IDENTITY, &mut |world, node| {
            for primitive in &node.primitives {
                out.push((world, primitive));
            }
        });
        out
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives().len()
    }

    /// Bounds in scene space, including the model translation
    pub fn bounding_volume(&self) -> BoundingVolume {
        let model = self.transform();
        let points = self.primitives().into_iter().flat_map(|(local, primitive)| {
            let world = model * local;
            primitive
                .positions
                .iter()
                .map(move |p| world.transform_point3(Vec3::from(*p)))
        });
        BoundingVolume::from_points(points)
    }

    /// Move the model by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Move the model so its bounds center lands on `scene_origin`.
    ///
    /// Returns the applied translation.
    pub fn recenter(&mut self, scene_origin: Vec3) -> Vec3 {
        let center = self.bounding_volume().center;
        let offset = crate::framing::recenter_offset(center, scene_origin);
        self.translate(-offset);
        -offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube_primitive(min: [f32; 3], max: [f32; 3]) -> MeshPrimitive {
        MeshPrimitive {
            positions: vec![min, max, [min[0], max[1], min[2]]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
            base_color: [1.0; 4],
        }
    }

    fn sample_model() -> Model {
        let mut root = ModelNode::new(Some("root".into()), Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        root.primitives.push(cube_primitive([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]));
        let mut child = ModelNode::new(None, Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0)));
        child.primitives.push(cube_primitive([0.0, 0.0, 0.0], [2.0, 2.0, 2.0]));
        root.children.push(child);
        Model::new("sample", root)
    }

    #[test]
    fn test_bounds_accumulate_node_transforms() {
        let model = sample_model();
        assert_eq!(model.primitive_count(), 2);

        let volume = model.bounding_volume();
        assert_relative_eq!(volume.min().x, 10.0);
        assert_relative_eq!(volume.max().y, 6.0);
        assert_relative_eq!(volume.center.x, 11.0);
        assert_relative_eq!(volume.center.y, 3.0);
    }

    #[test]
    fn test_recenter_moves_center_to_origin() {
        let mut model = sample_model();
        let applied = model.recenter(Vec3::ZERO);

        assert_relative_eq!(applied.x, -11.0);
        let center = model.bounding_volume().center;
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(center.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_recenter_is_idempotent() {
        let mut model = sample_model();
        model.recenter(Vec3::ZERO);
        let position = model.position;

        let second = model.recenter(Vec3::ZERO);
        assert!(second.length() < 1e-5);
        assert!((model.position - position).length() < 1e-5);
    }

    #[test]
    fn test_recenter_onto_moved_scene_origin() {
        let mut model = sample_model();
        let origin = Vec3::new(1.0, -2.0, 0.5);
        model.recenter(origin);
        let center = model.bounding_volume().center;
        assert!((center - origin).length() < 1e-5);
    }

    #[test]
    fn test_empty_model_has_degenerate_bounds() {
        let model = Model::new("empty", ModelNode::new(None, Mat4::IDENTITY));
        assert!(model.bounding_volume().is_degenerate());
        assert_eq!(model.primitive_count(), 0);
    }
}

//! Model Viewer Core
//!
//! Renderer-independent pieces of the model viewer:
//! - BoundingVolume: axis-aligned bounds of a loaded model
//! - Framing: camera placement that fits a model into view
//! - DeviceProfile: mobile/desktop classification driving the framing factors
//! - InteractionConstraints: the fixed orbit policy
//! - Model: node tree of triangle primitives loaded from glTF
//! - Loader: async asset loading behind the `AssetLoader` trait

pub mod bounds;
pub mod constraints;
pub mod device;
pub mod framing;
pub mod loader;
pub mod model;

pub use bounds::*;
pub use constraints::*;
pub use device::*;
pub use framing::*;
pub use loader::*;
pub use model::*;

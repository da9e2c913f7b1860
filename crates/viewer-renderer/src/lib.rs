//! Model Viewer Renderer
//!
//! WGPU-based rendering for the model viewer.
//!
//! # Architecture
//!
//! - [`scene::Scene`] - Lights and the render-on-demand dirty flag
//! - [`camera::PerspectiveCamera`] - Camera placement and projection
//! - [`controls::OrbitControls`] - Constrained orbit around the model
//! - [`renderer::Renderer`] - Pipeline, uniforms and GPU meshes for one surface
//!
//! Rendering is on demand: callers render once per scene mutation rather than
//! running a continuous frame loop.

pub mod camera;
pub mod controls;
pub mod gpu_resources;
pub mod light;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod vertex;

pub use camera::{CameraUniform, PerspectiveCamera};
pub use controls::{OrbitControls, PointerInput};
pub use light::{AmbientLight, DirectionalLight, LightUniform};
pub use renderer::Renderer;
pub use scene::{Scene, build_scene};
pub use vertex::MeshVertex;

//! Model Viewer Frontend
//!
//! egui-based host for an interactive 3D model viewer whose render surface
//! is mounted and torn down with its visibility.

mod app;
pub mod config;
pub mod contact;
pub mod gpu_surface;
pub mod interaction;
pub mod lifecycle;
pub mod viewer;

pub use app::ModelViewerApp;
pub use config::{AppConfig, ConfigManager, ViewerConfig};
pub use viewer::{LifecycleError, PhaseEvent, Viewer, ViewerPhase, ViewerState};

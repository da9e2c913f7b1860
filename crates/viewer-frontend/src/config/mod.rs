//! Application configuration module
//!
//! Viewer defaults are read from a RON file in the OS configuration
//! directory. Nothing is written back.

mod manager;

pub use manager::{ConfigError, ConfigManager};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Viewer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Path or http(s) URL of the glTF asset to show
    pub asset: String,
    /// Share of the viewport taken by the render surface on each axis
    pub surface_fraction: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera position before a model is framed
    pub default_camera_position: Vec3,
    /// Orbit speed multiplier
    pub rotate_speed: f32,
    /// Surface background (RGBA)
    pub clear_color: [f32; 4],
    /// Overrides device detection, e.g. "iPhone" to force the mobile framing
    pub user_agent: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset: "img/scene-27.gltf".to_string(),
            surface_fraction: 0.7,
            fov_degrees: 5.0,
            near: 0.1,
            far: 1000.0,
            default_camera_position: Vec3::new(0.0, 0.0, 10.0),
            rotate_speed: 1.0,
            clear_color: [0.0, 0.0, 0.0, 0.0],
            user_agent: None,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    /// Viewer settings
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl AppConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}

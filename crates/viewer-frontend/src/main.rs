//! Model viewer entry point
//!
//! Usage: `model-viewer [ASSET]`, where ASSET is a path or http(s) URL of a
//! `.glb`/`.gltf` file overriding the configured one.

use viewer_frontend::{ConfigManager, ModelViewerApp};

fn main() -> eframe::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "viewer_frontend=debug,viewer_core=info,viewer_renderer=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Model Viewer");

    let mut config = ConfigManager::new().config().clone();
    if let Some(asset) = std::env::args().nth(1) {
        tracing::info!("Using asset from command line: {}", asset);
        config.viewer.asset = asset;
    }

    let wgpu_options = egui_wgpu::WgpuConfiguration {
        wgpu_setup: egui_wgpu::WgpuSetup::CreateNew {
            supported_backends: wgpu::Backends::PRIMARY | wgpu::Backends::GL,
            power_preference: wgpu::PowerPreference::LowPower,
            // Surface textures follow the window size and may exceed downlevel limits
            device_descriptor: std::sync::Arc::new(|adapter| wgpu::DeviceDescriptor {
                label: Some("model-viewer device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
            }),
        },
        ..Default::default()
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Model Viewer"),
        wgpu_options,
        ..Default::default()
    };

    eframe::run_native(
        "model-viewer",
        native_options,
        Box::new(|cc| Ok(Box::new(ModelViewerApp::new(cc, config)))),
    )
}

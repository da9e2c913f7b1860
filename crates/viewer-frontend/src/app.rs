//! Main application

use std::sync::Arc;

use viewer_core::GltfLoader;
use viewer_renderer::PointerInput;

use crate::config::AppConfig;
use crate::contact::ContactForm;
use crate::gpu_surface::EguiHost;
use crate::lifecycle::{RenderTarget, ThreadSpawner, ViewportSize};
use crate::viewer::{Viewer, ViewerPhase};

/// Contact panel with a model viewer revealed on submission
pub struct ModelViewerApp {
    viewer: Viewer<EguiHost>,
    contact: ContactForm,
}

impl ModelViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let viewer_config = config.viewer;
        let host = EguiHost::new(cc.wgpu_render_state.clone(), viewer_config.clear_color);
        let viewer = Viewer::new(
            host,
            Arc::new(GltfLoader::new()),
            Arc::new(ThreadSpawner),
            viewer_config,
        );

        let ctx = cc.egui_ctx.clone();
        viewer.events().set_waker(move || ctx.request_repaint());

        Self {
            viewer,
            contact: ContactForm::default(),
        }
    }

    fn contact_panel(&mut self, ui: &mut egui::Ui) {
        if self.contact.ui(ui).is_some() {
            self.viewer.set_visible(true);
        }

        if self.viewer.is_visible() {
            ui.add_space(16.0);
            if ui.button("Close viewer").clicked() {
                self.viewer.set_visible(false);
            }
        }
    }

    fn viewer_panel(&mut self, ui: &mut egui::Ui) {
        let Some((texture_id, size)) = self.viewer.state().and_then(|state| {
            let surface = state.surface();
            let size = surface.size();
            surface
                .texture_id()
                .map(|id| (id, egui::vec2(size.width as f32, size.height as f32)))
        }) else {
            return;
        };

        let response = ui.add(egui::Image::new((texture_id, size)).sense(egui::Sense::drag()));

        match self.viewer.phase() {
            ViewerPhase::Loading => {
                ui.label("Loading model...");
            }
            ViewerPhase::LoadFailed => {
                let reason = self
                    .viewer
                    .last_error()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                ui.colored_label(egui::Color32::LIGHT_RED, format!("Could not load model: {reason}"));
            }
            _ => {}
        }

        let Some(pointer) = self.viewer.surface_pointer_events() else {
            return;
        };
        let delta = response.drag_delta();
        if response.dragged_by(egui::PointerButton::Primary) {
            pointer.emit(&PointerInput::Rotate {
                dx: delta.x,
                dy: delta.y,
            });
        } else if response.dragged_by(egui::PointerButton::Secondary) {
            pointer.emit(&PointerInput::Pan {
                dx: delta.x,
                dy: delta.y,
            });
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                pointer.emit(&PointerInput::Zoom { delta: scroll });
            }
        }
    }
}

impl eframe::App for ModelViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let screen = ctx.screen_rect();
        let host = self.viewer.host_mut();
        host.set_pixels_per_point(ctx.pixels_per_point());
        host.set_viewport_size(ViewportSize::new(screen.width(), screen.height()));

        egui::SidePanel::left("contact_panel")
            .resizable(false)
            .default_width(320.0)
            .show(ctx, |ui| self.contact_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.viewer_panel(ui));

        self.viewer.pump();
    }
}

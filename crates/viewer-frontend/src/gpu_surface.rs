//! wgpu render surface hosted in an egui window
//!
//! The viewer renders into an offscreen texture that is registered with the
//! egui renderer and shown as an image. Surface sizes are logical points;
//! the texture is allocated in physical pixels.

use std::sync::Arc;

use parking_lot::Mutex;

use viewer_renderer::gpu_resources::create_color_texture;
use viewer_renderer::{PointerInput, Renderer};

use crate::lifecycle::{
    EventSource, Frame, RenderTarget, SurfaceError, SurfaceHost, SurfaceSize, ViewportSize,
};

/// Host backed by eframe's wgpu render state
pub struct EguiHost {
    render_state: Option<egui_wgpu::RenderState>,
    viewport: ViewportSize,
    viewport_events: EventSource<ViewportSize>,
    pixels_per_point: Arc<Mutex<f32>>,
    clear_color: [f32; 4],
}

impl EguiHost {
    pub fn new(render_state: Option<egui_wgpu::RenderState>, clear_color: [f32; 4]) -> Self {
        if render_state.is_none() {
            tracing::warn!("No wgpu render state; the viewer cannot be mounted");
        }
        Self {
            render_state,
            viewport: ViewportSize::default(),
            viewport_events: EventSource::new(),
            pixels_per_point: Arc::new(Mutex::new(1.0)),
            clear_color,
        }
    }

    /// Report the display scale factor.
    ///
    /// A change is announced as a viewport event so a mounted surface
    /// redraws at the new resolution.
    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        if !pixels_per_point.is_finite() || pixels_per_point <= 0.0 {
            return;
        }
        {
            let mut current = self.pixels_per_point.lock();
            if *current == pixels_per_point {
                return;
            }
            *current = pixels_per_point;
        }
        tracing::debug!("Display scale changed to {}", pixels_per_point);
        self.viewport_events.emit(&self.viewport);
    }

    /// Report the current viewport size, notifying listeners on change.
    pub fn set_viewport_size(&mut self, size: ViewportSize) {
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        self.viewport_events.emit(&size);
    }
}

impl SurfaceHost for EguiHost {
    type Target = GpuTarget;

    fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    fn viewport_events(&self) -> EventSource<ViewportSize> {
        self.viewport_events.clone()
    }

    fn create_surface(&mut self, size: SurfaceSize) -> Result<GpuTarget, SurfaceError> {
        let render_state = self
            .render_state
            .as_ref()
            .ok_or(SurfaceError::NoRenderState)?;
        if size.width == 0 || size.height == 0 {
            return Err(SurfaceError::InvalidSize(size.width, size.height));
        }
        Ok(GpuTarget::new(
            render_state,
            size,
            Arc::clone(&self.pixels_per_point),
            self.clear_color,
        ))
    }

    fn attach(&mut self, target: &mut GpuTarget) -> Result<(), SurfaceError> {
        let render_state = self
            .render_state
            .as_ref()
            .ok_or(SurfaceError::NoRenderState)?;
        let texture_id = render_state.renderer.write().register_native_texture(
            &render_state.device,
            &target.color_view,
            wgpu::FilterMode::Linear,
        );
        target.texture_id = Some(texture_id);
        Ok(())
    }

    fn detach(&mut self, target: &mut GpuTarget) {
        let (Some(render_state), Some(texture_id)) =
            (self.render_state.as_ref(), target.texture_id.take())
        else {
            return;
        };
        render_state.renderer.write().free_texture(&texture_id);
    }
}

/// Offscreen render target shown through an egui texture
pub struct GpuTarget {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    egui_renderer: Arc<egui::mutex::RwLock<egui_wgpu::Renderer>>,
    renderer: Renderer,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    size: SurfaceSize,
    pixel_size: SurfaceSize,
    pixels_per_point: Arc<Mutex<f32>>,
    texture_id: Option<egui::TextureId>,
    pointer_events: EventSource<PointerInput>,
    released: bool,
}

impl GpuTarget {
    fn new(
        render_state: &egui_wgpu::RenderState,
        size: SurfaceSize,
        pixels_per_point: Arc<Mutex<f32>>,
        clear_color: [f32; 4],
    ) -> Self {
        let device = Arc::clone(&render_state.device);
        let format = render_state.target_format;
        let pixel_size = size.to_pixels(*pixels_per_point.lock());

        let mut renderer = Renderer::new(&device, format, pixel_size.width, pixel_size.height);
        renderer.set_clear_color(clear_color);
        let (color_texture, color_view) =
            create_color_texture(&device, format, pixel_size.width, pixel_size.height);

        Self {
            device,
            queue: Arc::clone(&render_state.queue),
            egui_renderer: Arc::clone(&render_state.renderer),
            renderer,
            color_texture,
            color_view,
            size,
            pixel_size,
            pixels_per_point,
            texture_id: None,
            pointer_events: EventSource::new(),
            released: false,
        }
    }

    /// egui texture showing this surface, once attached
    pub fn texture_id(&self) -> Option<egui::TextureId> {
        self.texture_id
    }

    /// Reallocate the color and depth buffers if the pixel extent changed.
    fn fit_to_display(&mut self) {
        let pixel_size = self.size.to_pixels(*self.pixels_per_point.lock());
        if pixel_size == self.pixel_size {
            return;
        }

        let (color_texture, color_view) = create_color_texture(
            &self.device,
            self.renderer.format(),
            pixel_size.width,
            pixel_size.height,
        );
        if let Some(texture_id) = self.texture_id {
            self.egui_renderer
                .write()
                .update_egui_texture_from_wgpu_texture(
                    &self.device,
                    &color_view,
                    wgpu::FilterMode::Linear,
                    texture_id,
                );
        }
        self.color_texture.destroy();
        self.color_texture = color_texture;
        self.color_view = color_view;

        self.renderer
            .resize(&self.device, pixel_size.width, pixel_size.height);
        self.pixel_size = pixel_size;
    }
}

impl RenderTarget for GpuTarget {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        if self.released || size == self.size {
            return;
        }
        self.size = size;
        self.fit_to_display();
    }

    fn render(&mut self, frame: &Frame<'_>) {
        if self.released {
            return;
        }

        self.fit_to_display();
        self.renderer.sync_model(&self.device, frame.model);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewer Render Encoder"),
            });

        self.renderer.render(
            &mut encoder,
            &self.color_view,
            &self.queue,
            frame.scene,
            frame.camera,
            frame.model,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.renderer.release();
        self.color_texture.destroy();
        self.released = true;
    }

    fn pointer_events(&self) -> EventSource<PointerInput> {
        self.pointer_events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_host() -> (EguiHost, Arc<AtomicUsize>, crate::lifecycle::Subscription) {
        let mut host = EguiHost::new(None, [0.0; 4]);
        host.set_viewport_size(ViewportSize::new(1000.0, 500.0));
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let subscription = host.viewport_events().subscribe(move |size: &ViewportSize| {
            assert_eq!(*size, ViewportSize::new(1000.0, 500.0));
            c.fetch_add(1, Ordering::SeqCst);
        });
        (host, count, subscription)
    }

    #[test]
    fn test_scale_change_announces_viewport() {
        let (mut host, count, _subscription) = counting_host();

        host.set_pixels_per_point(2.0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(*host.pixels_per_point.lock(), 2.0);

        host.set_pixels_per_point(2.0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_scale_is_ignored() {
        let (mut host, count, _subscription) = counting_host();

        host.set_pixels_per_point(0.0);
        host.set_pixels_per_point(f32::NAN);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(*host.pixels_per_point.lock(), 1.0);
    }

    #[test]
    fn test_create_surface_without_render_state_fails() {
        let mut host = EguiHost::new(None, [0.0; 4]);
        let result = host.create_surface(SurfaceSize::new(700, 350));
        assert!(matches!(result, Err(SurfaceError::NoRenderState)));
    }
}

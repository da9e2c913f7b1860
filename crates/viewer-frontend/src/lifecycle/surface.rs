//! Host and render target abstractions

use viewer_core::Model;
use viewer_renderer::{PerspectiveCamera, PointerInput, Scene};

use super::events::EventSource;

/// Logical size of the host viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, `None` when either side is not positive
    pub fn aspect(&self) -> Option<f32> {
        let aspect = self.width / self.height;
        (self.width > 0.0 && self.height > 0.0 && aspect.is_finite()).then_some(aspect)
    }
}

/// Size of a render surface in logical points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `fraction` of the viewport on each axis, at least one point
    pub fn fraction_of(viewport: ViewportSize, fraction: f32) -> Self {
        Self {
            width: scale_extent(viewport.width, fraction),
            height: scale_extent(viewport.height, fraction),
        }
    }

    /// Physical pixel extent for a display scale factor.
    ///
    /// Non-positive or non-finite factors are treated as 1.
    pub fn to_pixels(self, pixels_per_point: f32) -> Self {
        let factor = if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
            pixels_per_point
        } else {
            1.0
        };
        Self {
            width: scale_extent(self.width as f32, factor),
            height: scale_extent(self.height as f32, factor),
        }
    }
}

fn scale_extent(value: f32, factor: f32) -> u32 {
    let scaled = (value * factor).round();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled as u32
    } else {
        1
    }
}

/// Errors raised while creating or attaching a surface
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("no GPU render state available")]
    NoRenderState,
    #[error("invalid surface size {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("failed to attach surface: {0}")]
    Attach(String),
}

/// Everything needed to draw one frame
pub struct Frame<'a> {
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
    pub model: Option<&'a Model>,
}

/// A GPU rendering context bound to one surface
pub trait RenderTarget {
    fn size(&self) -> SurfaceSize;

    fn resize(&mut self, size: SurfaceSize);

    /// Draw a single frame. Called only when something changed.
    fn render(&mut self, frame: &Frame<'_>);

    /// Free all GPU resources. Must be safe to call more than once.
    fn release(&mut self);

    /// Pointer input delivered on this surface
    fn pointer_events(&self) -> EventSource<PointerInput>;
}

/// The element a viewer mounts its surface into
pub trait SurfaceHost {
    type Target: RenderTarget;

    fn viewport_size(&self) -> ViewportSize;

    /// Fired whenever the viewport changes size
    fn viewport_events(&self) -> EventSource<ViewportSize>;

    fn create_surface(&mut self, size: SurfaceSize) -> Result<Self::Target, SurfaceError>;

    fn attach(&mut self, target: &mut Self::Target) -> Result<(), SurfaceError>;

    fn detach(&mut self, target: &mut Self::Target);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_of_viewport() {
        let size = SurfaceSize::fraction_of(ViewportSize::new(1000.0, 500.0), 0.7);
        assert_eq!(size, SurfaceSize::new(700, 350));
    }

    #[test]
    fn test_fraction_of_empty_viewport_is_one_pixel() {
        let size = SurfaceSize::fraction_of(ViewportSize::default(), 0.7);
        assert_eq!(size, SurfaceSize::new(1, 1));

        let size = SurfaceSize::fraction_of(ViewportSize::new(f32::NAN, 100.0), 0.7);
        assert_eq!(size, SurfaceSize::new(1, 70));
    }

    #[test]
    fn test_to_pixels_scales_by_display_factor() {
        let size = SurfaceSize::new(700, 350);
        assert_eq!(size.to_pixels(2.0), SurfaceSize::new(1400, 700));
        assert_eq!(size.to_pixels(1.5), SurfaceSize::new(1050, 525));
        assert_eq!(size.to_pixels(0.0), size);
        assert_eq!(size.to_pixels(f32::NAN), size);
    }

    #[test]
    fn test_aspect() {
        assert_eq!(ViewportSize::new(200.0, 100.0).aspect(), Some(2.0));
        assert_eq!(ViewportSize::new(200.0, 0.0).aspect(), None);
        assert_eq!(ViewportSize::default().aspect(), None);
    }
}

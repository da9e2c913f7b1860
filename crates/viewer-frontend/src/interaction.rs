//! Pointer interaction attached to a render surface

use viewer_renderer::{OrbitControls, PerspectiveCamera, PointerInput};

use crate::lifecycle::{EventQueue, EventSource, Subscription, ViewerEvent};

/// Orbit controls listening to a surface's pointer events.
///
/// Pointer events are forwarded to the viewer's queue tagged with the mount
/// generation; the viewer applies them through [`InteractionHandle::handle`].
pub struct InteractionHandle {
    controls: OrbitControls,
    subscription: Option<Subscription>,
}

impl InteractionHandle {
    pub fn attach(
        pointer_events: &EventSource<PointerInput>,
        queue: EventQueue,
        generation: u64,
        controls: OrbitControls,
    ) -> Self {
        let subscription = pointer_events.subscribe(move |input| {
            queue.post(ViewerEvent::Pointer {
                generation,
                input: *input,
            });
        });
        tracing::debug!("Interaction attached (generation {})", generation);

        Self {
            controls,
            subscription: Some(subscription),
        }
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.controls.set_viewport_height(height);
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Apply pointer input to the camera. Returns true if the camera moved.
    pub fn handle(&self, input: &PointerInput, camera: &mut PerspectiveCamera) -> bool {
        self.is_attached() && self.controls.handle(input, camera)
    }

    /// Stop listening for pointer input. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            tracing::debug!("Interaction disposed");
        }
    }
}

impl Drop for InteractionHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use viewer_core::InteractionConstraints;

    fn attach(source: &EventSource<PointerInput>, queue: &EventQueue) -> InteractionHandle {
        let controls = OrbitControls::new(Vec3::ZERO, InteractionConstraints::HORIZONTAL_ORBIT);
        InteractionHandle::attach(source, queue.clone(), 1, controls)
    }

    #[test]
    fn test_pointer_events_are_queued() {
        let source = EventSource::new();
        let queue = EventQueue::new();
        let _handle = attach(&source, &queue);

        source.emit(&PointerInput::Rotate { dx: 4.0, dy: 0.0 });

        let events = queue.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            ViewerEvent::Pointer {
                generation: 1,
                input: PointerInput::Rotate { .. }
            }
        ));
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let source = EventSource::new();
        let queue = EventQueue::new();
        let mut handle = attach(&source, &queue);
        assert_eq!(source.listener_count(), 1);

        handle.dispose();
        handle.dispose();
        assert!(!handle.is_attached());
        assert_eq!(source.listener_count(), 0);

        source.emit(&PointerInput::Rotate { dx: 4.0, dy: 0.0 });
        assert!(queue.is_empty());
    }

    #[test]
    fn test_disposed_handle_ignores_input() {
        let source = EventSource::new();
        let queue = EventQueue::new();
        let mut handle = attach(&source, &queue);
        handle.dispose();

        let mut camera = PerspectiveCamera::new(5.0, 1.0, 0.1, 1000.0);
        let before = camera.position;
        assert!(!handle.handle(&PointerInput::Rotate { dx: 50.0, dy: 0.0 }, &mut camera));
        assert_eq!(camera.position, before);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let source = EventSource::new();
        let queue = EventQueue::new();
        drop(attach(&source, &queue));
        assert_eq!(source.listener_count(), 0);
    }
}

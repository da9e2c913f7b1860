//! Viewer orchestrator
//!
//! A [`Viewer`] composes the scene, camera, interaction, asset loading and
//! render surface into one unit that is mounted when the caller makes it
//! visible and torn down when it is hidden:
//!
//! ```text
//! Hidden -> Mounting -> Loading -> {Framed | LoadFailed} -> Unmounting -> Hidden
//! ```
//!
//! All state changes happen on the thread that owns the viewer. The asset is
//! loaded in the background and its result is applied by [`Viewer::pump`].

use std::sync::Arc;

use viewer_core::{
    AssetLoader, AssetReference, DeviceProfile, InteractionConstraints, LoadError, Model,
    compute_framing,
};
use viewer_renderer::{OrbitControls, PerspectiveCamera, PointerInput, Scene, build_scene};

use crate::config::ViewerConfig;
use crate::interaction::InteractionHandle;
use crate::lifecycle::{
    EventQueue, EventSource, Frame, Liveness, LoadTicket, RenderTarget, Subscription,
    SurfaceError, SurfaceHost, SurfaceSize, TaskSpawner, ViewerEvent, ViewportSize,
};

/// Lifecycle phase of a viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    Hidden,
    Mounting,
    Loading,
    Framed,
    LoadFailed,
    Unmounting,
}

/// Inputs driving [`ViewerPhase`] transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Show,
    Mounted,
    LoadSucceeded,
    LoadFailed,
    Hide,
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot apply {event:?} while {phase:?}")]
    InvalidTransition {
        phase: ViewerPhase,
        event: PhaseEvent,
    },
}

impl ViewerPhase {
    /// Next phase after `event`, or an error if `event` is not valid now.
    pub fn next(self, event: PhaseEvent) -> Result<Self, LifecycleError> {
        use PhaseEvent as E;
        use ViewerPhase as P;

        match (self, event) {
            (P::Hidden, E::Show) => Ok(P::Mounting),
            (P::Mounting, E::Mounted) => Ok(P::Loading),
            (P::Loading, E::LoadSucceeded) => Ok(P::Framed),
            (P::Loading, E::LoadFailed) => Ok(P::LoadFailed),
            (P::Mounting | P::Loading | P::Framed | P::LoadFailed, E::Hide) => Ok(P::Unmounting),
            (P::Unmounting, E::TornDown) => Ok(P::Hidden),
            (phase, event) => Err(LifecycleError::InvalidTransition { phase, event }),
        }
    }

    /// True while a surface is (or is being) mounted
    pub fn is_visible(self) -> bool {
        !matches!(self, ViewerPhase::Hidden | ViewerPhase::Unmounting)
    }
}

/// Everything a mounted viewer owns
pub struct ViewerState<T> {
    surface: T,
    scene: Scene,
    camera: PerspectiveCamera,
    interaction: Option<InteractionHandle>,
    model: Option<Model>,
    resize_subscription: Option<Subscription>,
    liveness: Liveness,
    pending_load: Option<LoadTicket>,
}

impl<T: RenderTarget> ViewerState<T> {
    pub fn surface(&self) -> &T {
        &self.surface
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn interaction(&self) -> Option<&InteractionHandle> {
        self.interaction.as_ref()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.liveness.generation()
    }

    pub fn is_load_pending(&self) -> bool {
        self.pending_load.is_some()
    }

    fn apply_resize(&mut self, viewport: ViewportSize, fraction: f32) {
        if let Some(aspect) = viewport.aspect() {
            self.camera.set_aspect(aspect);
        }
        let size = SurfaceSize::fraction_of(viewport, fraction);
        if size != self.surface.size() {
            self.surface.resize(size);
        }
        if let Some(interaction) = self.interaction.as_mut() {
            interaction.set_viewport_height(size.height as f32);
        }
        self.scene.mark_dirty();
    }

    fn render_if_dirty(&mut self) -> bool {
        if !self.scene.is_dirty() {
            return false;
        }
        self.surface.render(&Frame {
            scene: &self.scene,
            camera: &self.camera,
            model: self.model.as_ref(),
        });
        self.scene.mark_clean();
        true
    }
}

/// Interactive model viewer mounted into a [`SurfaceHost`]
pub struct Viewer<H: SurfaceHost> {
    host: H,
    loader: Arc<dyn AssetLoader>,
    spawner: Arc<dyn TaskSpawner>,
    config: ViewerConfig,
    asset: AssetReference,
    device: DeviceProfile,
    phase: ViewerPhase,
    state: Option<ViewerState<H::Target>>,
    events: EventQueue,
    generation: u64,
    load_seq: u64,
    last_error: Option<LoadError>,
}

impl<H: SurfaceHost> Viewer<H> {
    pub fn new(
        host: H,
        loader: Arc<dyn AssetLoader>,
        spawner: Arc<dyn TaskSpawner>,
        config: ViewerConfig,
    ) -> Self {
        let device = DeviceProfile::detect(config.user_agent.as_deref());
        let asset = AssetReference::parse(&config.asset);

        Self {
            host,
            loader,
            spawner,
            config,
            asset,
            device,
            phase: ViewerPhase::Hidden,
            state: None,
            events: EventQueue::new(),
            generation: 0,
            load_seq: 0,
            last_error: None,
        }
    }

    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.phase.is_visible()
    }

    pub fn state(&self) -> Option<&ViewerState<H::Target>> {
        self.state.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn asset(&self) -> &AssetReference {
        &self.asset
    }

    pub fn device(&self) -> DeviceProfile {
        self.device
    }

    /// Queue of deferred events; set its waker to get notified of new work.
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Error of the most recent failed load
    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    /// Pointer event source of the mounted surface
    pub fn surface_pointer_events(&self) -> Option<EventSource<PointerInput>> {
        self.state.as_ref().map(|state| state.surface.pointer_events())
    }

    /// Mount when `visible` turns on, tear down when it turns off.
    /// Repeating the current visibility does nothing.
    pub fn set_visible(&mut self, visible: bool) {
        let event = if visible {
            PhaseEvent::Show
        } else {
            PhaseEvent::Hide
        };
        if let Err(e) = self.phase.next(event) {
            tracing::debug!("Ignoring visibility change: {}", e);
            return;
        }

        if visible {
            self.mount();
        } else {
            self.unmount();
        }
    }

    /// Swap the host element. A visible viewer is torn down and remounted
    /// into the new host. Returns the previous host.
    pub fn replace_host(&mut self, host: H) -> H {
        let was_visible = self.phase.is_visible();
        if was_visible {
            self.unmount();
        }
        let old = std::mem::replace(&mut self.host, host);
        if was_visible {
            self.mount();
        }
        old
    }

    /// Apply deferred events and render if anything changed.
    /// Returns the number of events drained.
    pub fn pump(&mut self) -> usize {
        let events = self.events.drain();
        let count = events.len();
        for event in events {
            self.apply(event);
        }
        if let Some(state) = self.state.as_mut() {
            state.render_if_dirty();
        }
        count
    }

    fn advance(&mut self, event: PhaseEvent) {
        match self.phase.next(event) {
            Ok(next) => {
                tracing::info!("Viewer {:?} -> {:?}", self.phase, next);
                self.phase = next;
            }
            Err(e) => tracing::debug!("{}", e),
        }
    }

    fn mount(&mut self) {
        self.advance(PhaseEvent::Show);
        self.generation += 1;

        match self.acquire(self.generation) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                tracing::error!("Failed to mount viewer: {}", e);
                self.advance(PhaseEvent::Hide);
                self.advance(PhaseEvent::TornDown);
                return;
            }
        }

        self.advance(PhaseEvent::Mounted);
        if let Some(state) = self.state.as_mut() {
            state.render_if_dirty();
        }
        self.start_load();
    }

    /// Create and attach the surface, then build the scene around it.
    fn acquire(&mut self, generation: u64) -> Result<ViewerState<H::Target>, SurfaceError> {
        let viewport = self.host.viewport_size();
        let size = SurfaceSize::fraction_of(viewport, self.config.surface_fraction);

        let mut surface = self.host.create_surface(size)?;
        if let Err(e) = self.host.attach(&mut surface) {
            surface.release();
            return Err(e);
        }

        let scene = build_scene();
        let camera = PerspectiveCamera::new(
            self.config.fov_degrees,
            viewport.aspect().unwrap_or(1.0),
            self.config.near,
            self.config.far,
        )
        .with_position(self.config.default_camera_position);

        let queue = self.events.clone();
        let resize_subscription = self.host.viewport_events().subscribe(move |size| {
            queue.post(ViewerEvent::Resized {
                generation,
                size: *size,
            });
        });

        tracing::debug!(
            "Mounted {}x{} surface (generation {})",
            size.width,
            size.height,
            generation
        );

        Ok(ViewerState {
            surface,
            scene,
            camera,
            interaction: None,
            model: None,
            resize_subscription: Some(resize_subscription),
            liveness: Liveness::new(generation),
            pending_load: None,
        })
    }

    fn start_load(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        self.load_seq += 1;
        let ticket = LoadTicket {
            generation: state.liveness.generation(),
            seq: self.load_seq,
        };
        state.model = None;
        state.pending_load = Some(ticket);

        tracing::info!("Loading model from {}", self.asset);
        let load = self.loader.load(self.asset.clone());
        let liveness = state.liveness.clone();
        let queue = self.events.clone();
        let task = async move {
            let result = load.await;
            if liveness.is_alive() {
                queue.post(ViewerEvent::LoadFinished { ticket, result });
            } else {
                tracing::debug!("Viewer unmounted before load {:?} finished", ticket);
            }
        };

        if let Err(e) = self.spawner.spawn("asset-loader", Box::pin(task)) {
            tracing::error!("Failed to spawn asset loader: {}", e);
            self.finish_load(Err(LoadError::Io(e.to_string())));
        }
    }

    fn apply(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::Resized { generation, size } => {
                let fraction = self.config.surface_fraction;
                match self
                    .state
                    .as_mut()
                    .filter(|state| state.liveness.is_current(generation))
                {
                    Some(state) => state.apply_resize(size, fraction),
                    None => tracing::debug!("Dropping resize from stale mount {}", generation),
                }
            }
            ViewerEvent::Pointer { generation, input } => {
                let Some(state) = self
                    .state
                    .as_mut()
                    .filter(|state| state.liveness.is_current(generation))
                else {
                    tracing::debug!("Dropping pointer input from stale mount {}", generation);
                    return;
                };
                let moved = match state.interaction.as_ref() {
                    Some(interaction) => interaction.handle(&input, &mut state.camera),
                    None => false,
                };
                if moved {
                    state.scene.mark_dirty();
                }
            }
            ViewerEvent::LoadFinished { ticket, result } => {
                let current = self.state.as_ref().is_some_and(|state| {
                    state.liveness.is_current(ticket.generation)
                        && state.pending_load == Some(ticket)
                });
                if current {
                    self.finish_load(result);
                } else {
                    tracing::debug!("Discarding stale load result {:?}", ticket);
                }
            }
        }
    }

    fn finish_load(&mut self, result: Result<Model, LoadError>) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.pending_load = None;
        state.scene.mark_dirty();

        let event = match result {
            Ok(mut model) => {
                let loaded = model.bounding_volume();
                let shift = model.recenter(state.scene.origin());
                let volume = loaded.translated(shift);
                if volume.is_degenerate() {
                    tracing::debug!("Model '{}' has no spatial extent", model.name);
                }
                let framing = compute_framing(&volume, self.config.fov_degrees, self.device);
                state.camera.apply_framing(&framing);

                let mut controls = OrbitControls::new(
                    framing.look_at_target,
                    InteractionConstraints::HORIZONTAL_ORBIT,
                )
                .with_rotate_speed(self.config.rotate_speed);
                controls.set_viewport_height(state.surface.size().height as f32);

                if let Some(mut previous) = state.interaction.take() {
                    previous.dispose();
                }
                state.interaction = Some(InteractionHandle::attach(
                    &state.surface.pointer_events(),
                    self.events.clone(),
                    state.liveness.generation(),
                    controls,
                ));

                tracing::info!(
                    "Framed model '{}' ({} primitives): shifted by {:?}, camera distance {:.2}",
                    model.name,
                    model.primitive_count(),
                    shift,
                    framing.distance
                );
                state.model = Some(model);
                self.last_error = None;
                PhaseEvent::LoadSucceeded
            }
            Err(e) => {
                tracing::error!("Failed to load model from {}: {}", self.asset, e);
                self.last_error = Some(e);
                PhaseEvent::LoadFailed
            }
        };

        self.advance(event);
    }

    fn unmount(&mut self) {
        self.advance(PhaseEvent::Hide);
        self.teardown();
        self.advance(PhaseEvent::TornDown);
    }

    /// Release everything the mount acquired, in reverse dependency order.
    fn teardown(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        state.liveness.revoke();
        if let Some(subscription) = state.resize_subscription.take() {
            subscription.cancel();
            tracing::debug!("Resize listener removed");
        }
        if let Some(mut interaction) = state.interaction.take() {
            interaction.dispose();
        }
        state.surface.release();
        self.host.detach(&mut state.surface);

        tracing::debug!("Viewer torn down (generation {})", state.liveness.generation());
    }
}

impl<H: SurfaceHost> Drop for Viewer<H> {
    fn drop(&mut self) {
        if self.phase.is_visible() {
            self.unmount();
        }
    }
}

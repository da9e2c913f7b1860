//! Viewer lifecycle plumbing
//!
//! Event sources and subscriptions, mount liveness, background task spawning
//! and the host/render target traits the viewer mounts into.

mod events;
mod liveness;
mod spawner;
mod surface;

pub use events::{EventQueue, EventSource, Subscription, ViewerEvent};
pub use liveness::{LoadTicket, Liveness};
pub use spawner::{Task, TaskSpawner, ThreadSpawner};
pub use surface::{Frame, RenderTarget, SurfaceError, SurfaceHost, SurfaceSize, ViewportSize};

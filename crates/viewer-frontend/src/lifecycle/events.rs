//! Event sources, subscriptions and the viewer's deferred event queue

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use viewer_core::{LoadError, Model};
use viewer_renderer::PointerInput;

use super::liveness::LoadTicket;
use super::surface::ViewportSize;

type Listener<E> = Box<dyn FnMut(&E) + Send>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// Multi-listener event source.
///
/// Clones share the same listener registry. Listeners must not subscribe or
/// emit on the source they are called from.
pub struct EventSource<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for EventSource<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> Default for EventSource<E> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl<E: 'static> EventSource<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is cancelled or dropped.
    pub fn subscribe(&self, listener: impl FnMut(&E) + Send + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Box::new(listener)));
            id
        };

        let registry: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.lock().listeners.retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    /// Deliver `event` to every registered listener.
    pub fn emit(&self, event: &E) {
        let mut registry = self.registry.lock();
        for (_, listener) in registry.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

/// Handle to a registered listener
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Remove the listener. Dropping the subscription has the same effect.
    pub fn cancel(mut self) {
        self.unsubscribe_now();
    }

    pub fn is_active(&self) -> bool {
        self.unsubscribe.is_some()
    }

    fn unsubscribe_now(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe_now();
    }
}

/// Work handed back to the UI thread
#[derive(Debug)]
pub enum ViewerEvent {
    /// The host viewport changed size
    Resized { generation: u64, size: ViewportSize },
    /// Pointer input on the render surface
    Pointer { generation: u64, input: PointerInput },
    /// An asset load completed
    LoadFinished {
        ticket: LoadTicket,
        result: Result<Model, LoadError>,
    },
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Shared FIFO of [`ViewerEvent`]s drained by the viewer on the UI thread
#[derive(Clone, Default)]
pub struct EventQueue {
    events: Arc<Mutex<VecDeque<ViewerEvent>>>,
    waker: Arc<Mutex<Option<Waker>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called after every post, e.g. to request a repaint.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.waker.lock() = Some(Arc::new(waker));
    }

    pub fn post(&self, event: ViewerEvent) {
        self.events.lock().push_back(event);
        let waker = self.waker.lock().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    pub fn drain(&self) -> Vec<ViewerEvent> {
        self.events.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

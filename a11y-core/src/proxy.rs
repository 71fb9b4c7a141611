//! Proxy host objects.
//!
//! Hosts that cannot implement [`RenderNode`] or [`SceneHost`] on their own
//! types (a JavaScript engine behind wasm-bindgen, a test) hold a proxy and
//! push transform, bounds and lifecycle changes into it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::host::{
    LifecycleEvent, LifecycleHandler, LifecycleSource, RenderNode, SceneHost, SubscriptionId,
};
use crate::transform::{Affine, Bounds};

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(LifecycleEvent, SubscriptionId, LifecycleHandler)>,
}

/// A minimal [`LifecycleSource`].
///
/// Handlers may subscribe or unsubscribe while an event is being emitted.
/// A handler removed during emission is not called afterwards.
#[derive(Clone, Default)]
pub struct EventEmitter {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("handlers", &self.registry.borrow().handlers.len())
            .finish()
    }
}

impl EventEmitter {
    /// Create an emitter with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Call every handler registered for `event`, in registration order.
    pub fn emit(&self, event: LifecycleEvent) {
        let snapshot: Vec<(SubscriptionId, LifecycleHandler)> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .filter(|(e, _, _)| *e == event)
            .map(|(_, id, handler)| (*id, Rc::clone(handler)))
            .collect();

        for (id, handler) in snapshot {
            if self.is_registered(event, id) {
                handler();
            }
        }
    }

    /// Number of handlers registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: LifecycleEvent) -> usize {
        self.registry
            .borrow()
            .handlers
            .iter()
            .filter(|(e, _, _)| *e == event)
            .count()
    }

    fn is_registered(&self, event: LifecycleEvent, id: SubscriptionId) -> bool {
        self.registry
            .borrow()
            .handlers
            .iter()
            .any(|(e, i, _)| *e == event && *i == id)
    }
}

impl LifecycleSource for EventEmitter {
    fn on(&self, event: LifecycleEvent, handler: LifecycleHandler) -> SubscriptionId {
        let mut registry = self.registry.borrow_mut();
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.handlers.push((event, id, handler));
        id
    }

    fn off(&self, event: LifecycleEvent, id: SubscriptionId) {
        self.registry
            .borrow_mut()
            .handlers
            .retain(|(e, i, _)| !(*e == event && *i == id));
    }
}

/// A render node whose transform and bounds are pushed by the host.
#[derive(Debug, Default)]
pub struct ProxyNode {
    events: EventEmitter,
    transform: Cell<Affine>,
    bounds: Cell<Bounds>,
    destroyed: Cell<bool>,
}

impl ProxyNode {
    /// Create a node with the given world transform and local bounds.
    #[must_use]
    pub fn new(transform: Affine, bounds: Bounds) -> Self {
        Self {
            events: EventEmitter::new(),
            transform: Cell::new(transform),
            bounds: Cell::new(bounds),
            destroyed: Cell::new(false),
        }
    }

    /// Replace the world transform.
    pub fn set_transform(&self, transform: Affine) {
        self.transform.set(transform);
    }

    /// Replace the local bounds.
    pub fn set_bounds(&self, bounds: Bounds) {
        self.bounds.set(bounds);
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Mark the node destroyed and notify listeners. Only the first call emits.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.events.emit(LifecycleEvent::Destroy);
    }

    /// The node's event emitter.
    #[must_use]
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }
}

impl LifecycleSource for ProxyNode {
    fn on(&self, event: LifecycleEvent, handler: LifecycleHandler) -> SubscriptionId {
        self.events.on(event, handler)
    }

    fn off(&self, event: LifecycleEvent, id: SubscriptionId) {
        self.events.off(event, id);
    }
}

impl RenderNode for ProxyNode {
    fn world_transform(&self) -> Affine {
        self.transform.get()
    }

    fn bounds(&self) -> Bounds {
        self.bounds.get()
    }
}

/// Scene run state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SceneStatus {
    /// Updating normally.
    #[default]
    Running,
    /// Paused; may resume.
    Paused,
    /// Shut down; may be restarted by the host.
    Shutdown,
    /// Destroyed for good.
    Destroyed,
}

/// A scene whose lifecycle is pushed by the host.
#[derive(Debug, Default)]
pub struct ProxyScene {
    events: EventEmitter,
    status: Cell<SceneStatus>,
}

impl ProxyScene {
    /// Create a running scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SceneStatus {
        self.status.get()
    }

    /// Pause a running scene.
    pub fn pause(&self) {
        if self.transition(SceneStatus::Running, SceneStatus::Paused) {
            self.events.emit(LifecycleEvent::Pause);
        }
    }

    /// Resume a paused scene.
    pub fn resume(&self) {
        if self.transition(SceneStatus::Paused, SceneStatus::Running) {
            self.events.emit(LifecycleEvent::Resume);
        }
    }

    /// Start a shut-down scene again.
    pub fn restart(&self) {
        self.transition(SceneStatus::Shutdown, SceneStatus::Running);
    }

    /// Shut the scene down.
    pub fn shutdown(&self) {
        if matches!(self.status(), SceneStatus::Running | SceneStatus::Paused) {
            self.status.set(SceneStatus::Shutdown);
            self.events.emit(LifecycleEvent::Shutdown);
        }
    }

    /// Destroy the scene. Only the first call emits.
    pub fn destroy(&self) {
        if self.status() != SceneStatus::Destroyed {
            self.status.set(SceneStatus::Destroyed);
            self.events.emit(LifecycleEvent::Destroy);
        }
    }

    /// Emit `event` without changing status, for hosts with their own state machine.
    pub fn emit_raw(&self, event: LifecycleEvent) {
        self.events.emit(event);
    }

    /// The scene's event emitter.
    #[must_use]
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    fn transition(&self, from: SceneStatus, to: SceneStatus) -> bool {
        if self.status() == from {
            self.status.set(to);
            true
        } else {
            false
        }
    }
}

impl LifecycleSource for ProxyScene {
    fn on(&self, event: LifecycleEvent, handler: LifecycleHandler) -> SubscriptionId {
        self.events.on(event, handler)
    }

    fn off(&self, event: LifecycleEvent, id: SubscriptionId) {
        self.events.off(event, id);
    }
}

impl SceneHost for ProxyScene {
    fn is_active(&self) -> bool {
        self.status() == SceneStatus::Running
    }
}

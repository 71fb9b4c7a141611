//! Host-side contracts.
//!
//! The overlay layer never depends on a particular engine. A host exposes
//! its render nodes and scenes through these traits; [`crate::proxy`] has
//! ready-made implementations for hosts that push state explicitly.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::transform::{Affine, Bounds};

/// Lifecycle signals an overlay listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// The scene stopped updating but remains alive.
    Pause,
    /// A paused scene continues.
    Resume,
    /// The scene is shutting down; its objects are about to go away.
    Shutdown,
    /// The scene or render node is destroyed.
    Destroy,
}

/// Identifies one subscription on a [`LifecycleSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Callback invoked when a lifecycle event fires.
pub type LifecycleHandler = Rc<dyn Fn()>;

/// Anything that emits lifecycle events.
pub trait LifecycleSource {
    /// Register `handler` for `event`.
    fn on(&self, event: LifecycleEvent, handler: LifecycleHandler) -> SubscriptionId;

    /// Remove a previously registered handler. Unknown ids are ignored.
    fn off(&self, event: LifecycleEvent, id: SubscriptionId);
}

/// A visual object drawn by the host that an overlay mirrors.
///
/// Emits [`LifecycleEvent::Destroy`] when the host destroys it.
pub trait RenderNode: LifecycleSource {
    /// Accumulated transform in the overlay container's coordinate space.
    fn world_transform(&self) -> Affine;

    /// Local bounding box before the transform.
    fn bounds(&self) -> Bounds;
}

/// The scene that owns a set of render nodes.
///
/// Emits pause, resume, shutdown and destroy.
pub trait SceneHost: LifecycleSource {
    /// Whether the scene is running. Paused and torn-down scenes are inactive.
    fn is_active(&self) -> bool;
}

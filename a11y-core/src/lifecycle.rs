//! Lifecycle bridging between host objects and overlays.
//!
//! Every subscription made on behalf of an overlay is paired with exactly
//! one deregistration entry in a [`CleanupStack`]. Whichever teardown path
//! fires first (explicit destroy, target destroyed, scene shut down or
//! destroyed) drains the stack; later paths find it empty.

use std::rc::{Rc, Weak};

use crate::dom::Cleanup;
use crate::host::{LifecycleEvent, LifecycleHandler, LifecycleSource, RenderNode, SceneHost};

/// What a cleanup entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupScope {
    /// Listeners on the current DOM element; released on recreate.
    Element,
    /// Subscriptions on the scene and render node; released on destroy.
    Host,
}

/// Ordered deregistration callbacks.
#[derive(Default)]
pub struct CleanupStack {
    entries: Vec<(CleanupScope, Cleanup)>,
}

impl std::fmt::Debug for CleanupStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupStack")
            .field("element", &self.count(CleanupScope::Element))
            .field("host", &self.count(CleanupScope::Host))
            .finish()
    }
}

impl CleanupStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cleanup.
    pub fn push(&mut self, scope: CleanupScope, cleanup: Cleanup) {
        self.entries.push((scope, cleanup));
    }

    /// Append several cleanups in order.
    pub fn extend(&mut self, scope: CleanupScope, cleanups: impl IntoIterator<Item = Cleanup>) {
        self.entries
            .extend(cleanups.into_iter().map(|cleanup| (scope, cleanup)));
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries in `scope`.
    #[must_use]
    pub fn count(&self, scope: CleanupScope) -> usize {
        self.entries.iter().filter(|(s, _)| *s == scope).count()
    }

    /// Remove every entry in registration order, without running them.
    ///
    /// Callers run the returned callbacks after releasing any borrow that
    /// guards the stack.
    #[must_use]
    pub fn take_all(&mut self) -> Vec<Cleanup> {
        self.entries.drain(..).map(|(_, cleanup)| cleanup).collect()
    }

    /// Remove the entries in `scope`, keeping the others.
    #[must_use]
    pub fn take_scope(&mut self, scope: CleanupScope) -> Vec<Cleanup> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|(s, _)| *s == scope);
        self.entries = kept;
        taken.into_iter().map(|(_, cleanup)| cleanup).collect()
    }
}

/// Run cleanups in order.
pub fn run_all(cleanups: Vec<Cleanup>) {
    for cleanup in cleanups {
        cleanup();
    }
}

/// Callbacks the bridge invokes on an overlay's behalf.
#[derive(Clone)]
pub struct LifecycleHooks {
    /// Scene paused.
    pub on_pause: LifecycleHandler,
    /// Scene resumed.
    pub on_resume: LifecycleHandler,
    /// Scene shut down or destroyed, or target destroyed.
    pub on_teardown: LifecycleHandler,
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks").finish_non_exhaustive()
    }
}

/// Subscribes overlays to host lifecycle signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleBridge;

impl LifecycleBridge {
    /// Subscribe `hooks` to `scene` (if any) and `target`.
    ///
    /// Returns one cleanup per subscription, in subscription order. The
    /// cleanups hold only weak references; a source that is already gone
    /// has nothing left to unsubscribe from.
    #[must_use]
    pub fn attach(
        scene: Option<&Rc<dyn SceneHost>>,
        target: &Rc<dyn RenderNode>,
        hooks: &LifecycleHooks,
    ) -> Vec<Cleanup> {
        let mut cleanups = Vec::with_capacity(5);

        if let Some(scene) = scene {
            for (event, handler) in [
                (LifecycleEvent::Pause, &hooks.on_pause),
                (LifecycleEvent::Resume, &hooks.on_resume),
                (LifecycleEvent::Shutdown, &hooks.on_teardown),
                (LifecycleEvent::Destroy, &hooks.on_teardown),
            ] {
                cleanups.push(subscribe(scene, event, Rc::clone(handler)));
            }
        }

        cleanups.push(subscribe(
            target,
            LifecycleEvent::Destroy,
            Rc::clone(&hooks.on_teardown),
        ));

        cleanups
    }
}

fn subscribe<S>(source: &Rc<S>, event: LifecycleEvent, handler: LifecycleHandler) -> Cleanup
where
    S: LifecycleSource + ?Sized + 'static,
{
    let id = source.on(event, handler);
    let weak: Weak<S> = Rc::downgrade(source);
    Box::new(move || {
        if let Some(source) = weak.upgrade() {
            source.off(event, id);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{ProxyNode, ProxyScene};
    use crate::transform::{Affine, Bounds};
    use std::cell::Cell;

    fn counting_hooks() -> (LifecycleHooks, Rc<[Cell<u32>; 3]>) {
        let counts = Rc::new([Cell::new(0), Cell::new(0), Cell::new(0)]);
        let bump = |index: usize| -> LifecycleHandler {
            let counts = Rc::clone(&counts);
            Rc::new(move || counts[index].set(counts[index].get() + 1))
        };
        let hooks = LifecycleHooks {
            on_pause: bump(0),
            on_resume: bump(1),
            on_teardown: bump(2),
        };
        (hooks, counts)
    }

    #[test]
    fn attach_subscribes_and_cleanup_unsubscribes() {
        let scene = Rc::new(ProxyScene::new());
        let node = Rc::new(ProxyNode::new(Affine::IDENTITY, Bounds::default()));
        let scene_dyn: Rc<dyn SceneHost> = scene.clone();
        let node_dyn: Rc<dyn RenderNode> = node.clone();
        let (hooks, counts) = counting_hooks();

        let cleanups = LifecycleBridge::attach(Some(&scene_dyn), &node_dyn, &hooks);
        assert_eq!(cleanups.len(), 5);

        scene.pause();
        scene.resume();
        node.destroy();
        assert_eq!(counts[0].get(), 1);
        assert_eq!(counts[1].get(), 1);
        assert_eq!(counts[2].get(), 1);

        run_all(cleanups);
        assert_eq!(scene.events().listener_count(LifecycleEvent::Pause), 0);
        assert_eq!(scene.events().listener_count(LifecycleEvent::Destroy), 0);
        assert_eq!(node.events().listener_count(LifecycleEvent::Destroy), 0);
    }

    #[test]
    fn cleanup_after_source_dropped_is_harmless() {
        let node_dyn: Rc<dyn RenderNode> =
            Rc::new(ProxyNode::new(Affine::IDENTITY, Bounds::default()));
        let (hooks, _counts) = counting_hooks();
        let cleanups = LifecycleBridge::attach(None, &node_dyn, &hooks);
        assert_eq!(cleanups.len(), 1);
        drop(node_dyn);
        run_all(cleanups);
    }

    #[test]
    fn stack_scopes() {
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut stack = CleanupStack::new();
        for (scope, name) in [
            (CleanupScope::Element, "e1"),
            (CleanupScope::Host, "h1"),
            (CleanupScope::Element, "e2"),
        ] {
            let log = Rc::clone(&log);
            stack.push(scope, Box::new(move || log.borrow_mut().push(name)));
        }

        run_all(stack.take_scope(CleanupScope::Element));
        assert_eq!(*log.borrow(), vec!["e1", "e2"]);
        assert_eq!(stack.count(CleanupScope::Host), 1);

        run_all(stack.take_all());
        assert_eq!(*log.borrow(), vec!["e1", "e2", "h1"]);
        assert!(stack.is_empty());
    }
}

//! Shared services for overlays.

use std::rc::Rc;

use crate::announcer::{Announcer, LiveAnnouncer};
use crate::config::OverlayConfig;
use crate::dom::Dom;
use crate::schedule::Scheduler;

/// Document, timer, configuration and announcer shared by a set of overlays.
///
/// Cloning is cheap; every clone refers to the same services.
pub struct OverlayContext<D: Dom> {
    dom: Rc<D>,
    scheduler: Rc<dyn Scheduler>,
    config: Rc<OverlayConfig>,
    announcer: Rc<dyn Announcer>,
}

impl<D: Dom> Clone for OverlayContext<D> {
    fn clone(&self) -> Self {
        Self {
            dom: Rc::clone(&self.dom),
            scheduler: Rc::clone(&self.scheduler),
            config: Rc::clone(&self.config),
            announcer: Rc::clone(&self.announcer),
        }
    }
}

impl<D: Dom> std::fmt::Debug for OverlayContext<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<D: Dom> OverlayContext<D> {
    /// Create a context with a [`LiveAnnouncer`] on the same document.
    pub fn new(dom: D, scheduler: Rc<dyn Scheduler>, config: OverlayConfig) -> Self {
        let dom = Rc::new(dom);
        let config = Rc::new(config);
        let announcer: Rc<dyn Announcer> = Rc::new(LiveAnnouncer::new(
            Rc::clone(&dom),
            Rc::clone(&scheduler),
            Rc::clone(&config),
        ));
        Self {
            dom,
            scheduler,
            config,
            announcer,
        }
    }

    /// Replace the announcer.
    #[must_use]
    pub fn with_announcer(mut self, announcer: Rc<dyn Announcer>) -> Self {
        self.announcer = announcer;
        self
    }

    /// The document backend.
    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Shared handle to the document backend.
    #[must_use]
    pub fn dom_handle(&self) -> Rc<D> {
        Rc::clone(&self.dom)
    }

    /// The timer.
    #[must_use]
    pub fn scheduler(&self) -> &Rc<dyn Scheduler> {
        &self.scheduler
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// The announcer.
    #[must_use]
    pub fn announcer(&self) -> &Rc<dyn Announcer> {
        &self.announcer
    }

    /// Announce `message` through the shared announcer.
    pub fn announce(&self, message: &str) {
        self.announcer.announce(message);
    }
}

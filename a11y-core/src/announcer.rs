//! Screen reader announcements through a shared live region.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::OverlayConfig;
use crate::dom::Dom;
use crate::schedule::Scheduler;
use crate::Politeness;

/// Something that can speak a message to assistive technology.
pub trait Announcer {
    /// Announce `message` with the configured politeness.
    fn announce(&self, message: &str);

    /// Announce `message` with an explicit politeness.
    fn announce_with(&self, message: &str, politeness: Politeness);
}

/// Announcer backed by a visually hidden `aria-live` element.
///
/// The region is looked up by id, or created on first use and appended to the
/// container. Each announcement clears the region immediately and writes the
/// message after `announce_delay_ms`; the gap makes screen readers treat
/// repeated identical text as a change. Pending writes are not cancelled, so
/// the last write to land wins.
pub struct LiveAnnouncer<D: Dom> {
    dom: Rc<D>,
    scheduler: Rc<dyn Scheduler>,
    config: Rc<OverlayConfig>,
    region: RefCell<Option<D::Node>>,
    written: Rc<RefCell<String>>,
}

impl<D: Dom> std::fmt::Debug for LiveAnnouncer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveAnnouncer")
            .field("region_id", &self.config.live_region_id)
            .field("resolved", &self.region.borrow().is_some())
            .finish_non_exhaustive()
    }
}

const VISUALLY_HIDDEN: [(&str, &str); 8] = [
    ("position", "absolute"),
    ("width", "1px"),
    ("height", "1px"),
    ("margin", "-1px"),
    ("padding", "0"),
    ("border", "0"),
    ("overflow", "hidden"),
    ("clip", "rect(0 0 0 0)"),
];

impl<D: Dom> LiveAnnouncer<D> {
    /// Create an announcer. The region is resolved lazily.
    pub fn new(dom: Rc<D>, scheduler: Rc<dyn Scheduler>, config: Rc<OverlayConfig>) -> Self {
        Self {
            dom,
            scheduler,
            config,
            region: RefCell::new(None),
            written: Rc::new(RefCell::new(String::new())),
        }
    }

    /// The live region element, resolving or creating it if needed.
    pub fn region(&self) -> Option<D::Node> {
        let cached = self.region.borrow().clone();
        if let Some(node) = cached.filter(|node| self.dom.is_attached(node)) {
            return Some(node);
        }

        let node = match self.dom.element_by_id(&self.config.live_region_id) {
            Some(node) => node,
            None => self.create_region()?,
        };
        *self.region.borrow_mut() = Some(node.clone());
        Some(node)
    }

    /// Empty the region without scheduling a write.
    pub fn clear(&self) {
        if let Some(node) = self.region() {
            self.dom.set_text(&node, "");
            self.written.borrow_mut().clear();
        }
    }

    fn create_region(&self) -> Option<D::Node> {
        let node = match self.dom.create_element("div") {
            Ok(node) => node,
            Err(err) => {
                warn!("Failed to create live region: {}", err);
                return None;
            }
        };
        self.dom
            .set_attribute(&node, "id", &self.config.live_region_id);
        self.dom
            .set_attribute(&node, "aria-live", self.config.live_politeness.as_str());
        self.dom.set_attribute(&node, "aria-atomic", "true");
        for (property, value) in VISUALLY_HIDDEN {
            self.dom.set_style(&node, property, value);
        }
        self.dom.set_style(&node, "white-space", "nowrap");

        let appended = self
            .dom
            .container()
            .and_then(|container| self.dom.append_child(&container, &node));
        if let Err(err) = appended {
            warn!("Failed to insert live region: {}", err);
            return None;
        }
        debug!("Created live region #{}", self.config.live_region_id);
        Some(node)
    }
}

impl<D: Dom> Announcer for LiveAnnouncer<D> {
    fn announce(&self, message: &str) {
        self.announce_with(message, self.config.live_politeness);
    }

    fn announce_with(&self, message: &str, politeness: Politeness) {
        let Some(node) = self.region() else {
            return;
        };
        self.dom.set_attribute(&node, "aria-live", politeness.as_str());
        self.dom.set_text(&node, "");
        self.written.borrow_mut().clear();

        let dom = Rc::clone(&self.dom);
        let written = Rc::clone(&self.written);
        let message = message.to_string();
        self.scheduler.delayed_call(
            self.config.announce_delay_ms,
            Box::new(move || {
                if !dom.is_attached(&node) {
                    return;
                }
                if *written.borrow() == message {
                    dom.set_text(&node, "");
                }
                dom.set_text(&node, &message);
                *written.borrow_mut() = message;
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use crate::schedule::ManualScheduler;

    fn announcer() -> (MemoryDom, ManualScheduler, LiveAnnouncer<MemoryDom>) {
        let dom = MemoryDom::new();
        let scheduler = ManualScheduler::new();
        let announcer = LiveAnnouncer::new(
            Rc::new(dom.clone()),
            Rc::new(scheduler.clone()),
            Rc::new(OverlayConfig::default()),
        );
        (dom, scheduler, announcer)
    }

    #[test]
    fn region_is_created_once() {
        let (dom, _scheduler, announcer) = announcer();
        let first = announcer.region().expect("region");
        let second = announcer.region().expect("region");
        assert_eq!(first, second);
        assert_eq!(dom.children(dom.body()).len(), 1);
        assert_eq!(dom.attribute(first, "aria-atomic").as_deref(), Some("true"));
        assert_eq!(dom.attribute(first, "aria-live").as_deref(), Some("polite"));
    }

    #[test]
    fn existing_region_is_reused() {
        let (dom, _scheduler, announcer) = announcer();
        let existing = dom.create_element("div").expect("create");
        dom.set_attribute(&existing, "id", "a11y-live-announcer");
        dom.append_child(&dom.body(), &existing).expect("append");
        assert_eq!(announcer.region(), Some(existing));
    }

    #[test]
    fn announce_clears_then_writes_after_delay() {
        let (dom, scheduler, announcer) = announcer();
        announcer.announce("Level complete");
        let region = announcer.region().expect("region");
        assert_eq!(dom.text(region), "");

        scheduler.advance(99);
        assert_eq!(dom.text(region), "");
        scheduler.advance(1);
        assert_eq!(dom.text(region), "Level complete");
    }

    #[test]
    fn repeated_message_passes_through_empty() {
        let (dom, scheduler, announcer) = announcer();
        announcer.announce("3");
        announcer.announce("3");
        scheduler.flush();

        let region = announcer.region().expect("region");
        let history = dom.text_history(region);
        assert_eq!(history.last().map(String::as_str), Some("3"));
        let first = history.iter().position(|t| t == "3").expect("written");
        assert_eq!(history[first + 1], "");
    }

    #[test]
    fn assertive_override_and_last_write_wins() {
        let (dom, scheduler, announcer) = announcer();
        announcer.announce("first");
        announcer.announce_with("second", Politeness::Assertive);
        scheduler.flush();

        let region = announcer.region().expect("region");
        assert_eq!(dom.text(region), "second");
        assert_eq!(dom.attribute(region, "aria-live").as_deref(), Some("assertive"));
    }

    #[test]
    fn removed_region_is_recreated() {
        let (dom, scheduler, announcer) = announcer();
        let old = announcer.region().expect("region");
        announcer.announce("gone");
        dom.remove(&old);
        scheduler.flush();
        assert_eq!(dom.text(old), "");

        let new = announcer.region().expect("region");
        assert_ne!(old, new);
    }
}

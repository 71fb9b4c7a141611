//! Text, heading and list overlays.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::warn;

use super::{AccessibleOverlay, ElementSpec, OverlayBase, OverlayOptions};
use crate::context::OverlayContext;
use crate::dom::Dom;
use crate::host::{RenderNode, SceneHost};
use crate::Politeness;

/// Shape of a text overlay's element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOptions {
    /// Element tag for plain text.
    pub tag: String,
    /// ARIA role, if any.
    pub role: Option<String>,
    /// `aria-live` politeness, if any.
    pub live: Option<Politeness>,
    /// Render a `<ul>` with one `<li>` per item instead of plain text.
    pub items: Option<Vec<String>>,
    /// Clear the text and write it after the announce delay.
    pub announce: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            tag: "p".to_string(),
            role: Some("status".to_string()),
            live: Some(Politeness::Polite),
            items: None,
            announce: false,
        }
    }
}

impl TextOptions {
    /// A polite `<p role="status">`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A `<ul>` list with native list semantics.
    #[must_use]
    pub fn list(items: Vec<String>) -> Self {
        Self {
            tag: "ul".to_string(),
            role: None,
            live: None,
            items: Some(items),
            announce: false,
        }
    }

    /// Use another tag for plain text.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Override the role; `None` leaves the element's native role.
    #[must_use]
    pub fn with_role(mut self, role: Option<&str>) -> Self {
        self.role = role.map(str::to_string);
        self
    }

    /// Override the live politeness.
    #[must_use]
    pub fn with_live(mut self, live: Option<Politeness>) -> Self {
        self.live = live;
        self
    }

    /// Enable announce mode.
    #[must_use]
    pub fn with_announce(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }
}

/// Text content of the canvas (scores, instructions, lists) exposed to
/// screen readers.
pub struct TextOverlay<D: Dom> {
    base: OverlayBase<D>,
    items: RefCell<Option<Vec<String>>>,
    announce: bool,
    generation: Rc<Cell<u64>>,
}

impl<D: Dom> std::fmt::Debug for TextOverlay<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextOverlay")
            .field("base", &self.base)
            .field("items", &self.items.borrow())
            .field("announce", &self.announce)
            .finish_non_exhaustive()
    }
}

impl<D: Dom> TextOverlay<D> {
    /// Create the overlay and insert its element.
    ///
    /// `options.label` is the text content (or the list's accessible name).
    pub fn new(
        ctx: &OverlayContext<D>,
        scene: Option<Rc<dyn SceneHost>>,
        target: Rc<dyn RenderNode>,
        mut options: OverlayOptions,
        text: TextOptions,
    ) -> Self {
        options.live = options.live.or(text.live);
        let spec = if text.items.is_some() {
            ElementSpec::new("ul", text.role.as_deref())
        } else {
            ElementSpec::new(&text.tag, text.role.as_deref()).manual_label()
        };
        let overlay = Self {
            base: OverlayBase::new(ctx, scene.as_ref(), &target, spec, options),
            items: RefCell::new(text.items),
            announce: text.announce,
            generation: Rc::new(Cell::new(0)),
        };
        overlay.create();
        overlay.base.attach_lifecycle(scene.as_ref(), &target);
        overlay
    }

    /// Current text content.
    #[must_use]
    pub fn content(&self) -> String {
        self.base.label()
    }

    /// Current list items, for list overlays.
    #[must_use]
    pub fn items(&self) -> Option<Vec<String>> {
        self.items.borrow().clone()
    }

    /// Replace the text content. In announce mode the write is deferred and
    /// only the newest pending value lands.
    pub fn update_content(&self, text: &str) {
        self.base.update_label(text);
        if self.is_list() {
            return;
        }
        if let Some(node) = self.base.element() {
            self.write_content(&node, text);
        }
    }

    /// Replace the list items. Ignored for plain text overlays.
    pub fn update_items(&self, items: Vec<String>) {
        {
            let mut current = self.items.borrow_mut();
            let Some(current) = current.as_mut() else {
                return;
            };
            *current = items;
        }
        if let Some(node) = self.base.element() {
            self.render_items(&node);
        }
    }

    fn is_list(&self) -> bool {
        self.items.borrow().is_some()
    }

    fn write_content(&self, node: &D::Node, text: &str) {
        let ctx = self.base.context();
        if !self.announce {
            ctx.dom().set_text(node, text);
            return;
        }

        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        ctx.dom().set_text(node, "");

        let latest = Rc::clone(&self.generation);
        let weak = self.base.downgrade();
        let text = text.to_string();
        ctx.scheduler().delayed_call(
            ctx.config().announce_delay_ms,
            Box::new(move || {
                if latest.get() != generation {
                    return;
                }
                let Some(base) = weak.upgrade() else {
                    return;
                };
                if let Some(node) = base.element() {
                    base.context().dom().set_text(&node, &text);
                }
            }),
        );
    }

    fn render_items(&self, node: &D::Node) {
        let dom = self.base.context().dom();
        dom.set_text(node, "");
        let items = self.items.borrow().clone().unwrap_or_default();
        for item in &items {
            let appended = dom.create_element("li").and_then(|li| {
                dom.set_text(&li, item);
                dom.append_child(node, &li)
            });
            if let Err(err) = appended {
                warn!("Failed to append list item: {}", err);
            }
        }
    }
}

impl<D: Dom> AccessibleOverlay for TextOverlay<D> {
    type Backend = D;

    fn base(&self) -> &OverlayBase<D> {
        &self.base
    }

    fn create(&self) {
        let Some(node) = self.base.create_with(|_, _| Vec::new()) else {
            return;
        };
        if self.is_list() {
            self.render_items(&node);
        } else {
            self.write_content(&node, &self.base.label());
        }
    }

    fn update_label(&self, text: &str) {
        self.update_content(text);
    }
}

//! Invisible DOM elements mirroring canvas objects.
//!
//! Every overlay follows one render node: it is sized and positioned from the
//! node's world transform, forwards keyboard and pointer input to host
//! callbacks, hides itself while the scene is paused, and removes itself when
//! the node or scene goes away.
//!
//! Canonical state (label, hidden, disabled) lives in the overlay; the DOM
//! element is only ever written, never read back.

mod button;
mod image;
mod progress;
mod slider;
mod text;

pub use button::ButtonOverlay;
pub use image::ImageOverlay;
pub use progress::ProgressBarOverlay;
pub use slider::{SliderOptions, SliderOverlay};
pub use text::{TextOptions, TextOverlay};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::context::OverlayContext;
use crate::dom::{Cleanup, Dom};
use crate::focus::InputGate;
use crate::host::{RenderNode, SceneHost};
use crate::lifecycle::{self, CleanupScope, CleanupStack, LifecycleBridge, LifecycleHooks};
use crate::pause::{OverlayStatus, PauseSnapshot, PauseState};
use crate::transform::{self, Placement};
use crate::Politeness;

/// Unique identifier for an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayId(Uuid);

impl OverlayId {
    /// Create a new unique overlay ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OverlayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options common to every overlay variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Accessible name, or text content for text overlays.
    pub label: String,
    /// DOM id. Generated from the overlay id when absent.
    pub id: Option<String>,
    /// Start disabled.
    pub disabled: bool,
    /// Start hidden from assistive technology.
    pub hidden: bool,
    /// `aria-live` politeness, if the element should be a live region.
    pub live: Option<Politeness>,
}

impl OverlayOptions {
    /// Options with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Use an explicit DOM id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the initial disabled flag.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the initial hidden flag.
    #[must_use]
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Make the element a live region.
    #[must_use]
    pub fn with_live(mut self, politeness: Politeness) -> Self {
        self.live = Some(politeness);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabelMode {
    /// Label projected as `aria-label`.
    AriaLabel,
    /// The variant manages label projection itself.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focusable {
    /// Natively focusable (`<button>`).
    Native,
    /// Needs `tabindex="0"`.
    TabIndex,
    /// Not in the tab order.
    No,
}

/// Static shape of a variant's element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElementSpec {
    pub(crate) tag: String,
    pub(crate) role: Option<String>,
    pub(crate) label_mode: LabelMode,
    pub(crate) focusable: Focusable,
    pub(crate) interactive: bool,
}

impl ElementSpec {
    pub(crate) fn new(tag: &str, role: Option<&str>) -> Self {
        Self {
            tag: tag.to_string(),
            role: role.map(str::to_string),
            label_mode: LabelMode::AriaLabel,
            focusable: Focusable::No,
            interactive: false,
        }
    }

    pub(crate) fn interactive(mut self, focusable: Focusable) -> Self {
        self.focusable = focusable;
        self.interactive = true;
        self
    }

    pub(crate) fn manual_label(mut self) -> Self {
        self.label_mode = LabelMode::Manual;
        self
    }
}

struct OverlayCore<D: Dom> {
    id: OverlayId,
    dom_id: String,
    spec: ElementSpec,
    label: String,
    live: Option<Politeness>,
    target: Option<Weak<dyn RenderNode>>,
    scene: Option<Weak<dyn SceneHost>>,
    element: Option<D::Node>,
    disabled: bool,
    hidden: bool,
    pause: PauseState,
    cleanup: CleanupStack,
    destroyed: bool,
    dom: Rc<D>,
}

impl<D: Dom> Drop for OverlayCore<D> {
    fn drop(&mut self) {
        if self.destroyed {
            return;
        }
        lifecycle::run_all(self.cleanup.take_all());
        if let Some(element) = self.element.take() {
            self.dom.remove(&element);
        }
    }
}

/// State and DOM projection shared by every overlay variant.
///
/// Clones share state. Lifecycle subscriptions and DOM listeners hold only
/// weak handles, so dropping the last owning handle tears the overlay down
/// exactly as [`destroy`](Self::destroy) would.
pub struct OverlayBase<D: Dom> {
    core: Rc<RefCell<OverlayCore<D>>>,
    ctx: OverlayContext<D>,
}

impl<D: Dom> Clone for OverlayBase<D> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            ctx: self.ctx.clone(),
        }
    }
}

impl<D: Dom> std::fmt::Debug for OverlayBase<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("OverlayBase")
            .field("id", &core.id)
            .field("dom_id", &core.dom_id)
            .field("tag", &core.spec.tag)
            .field("label", &core.label)
            .field("disabled", &core.disabled)
            .field("hidden", &core.hidden)
            .field("paused", &core.pause.is_paused())
            .field("destroyed", &core.destroyed)
            .finish_non_exhaustive()
    }
}

/// Non-owning handle to an overlay.
pub struct WeakOverlay<D: Dom> {
    core: Weak<RefCell<OverlayCore<D>>>,
    ctx: OverlayContext<D>,
}

impl<D: Dom> Clone for WeakOverlay<D> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
            ctx: self.ctx.clone(),
        }
    }
}

impl<D: Dom> WeakOverlay<D> {
    /// The overlay, if any owning handle is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<OverlayBase<D>> {
        self.core.upgrade().map(|core| OverlayBase {
            core,
            ctx: self.ctx.clone(),
        })
    }
}

const BASE_STYLE: [(&str, &str); 12] = [
    ("position", "absolute"),
    ("pointer-events", "auto"),
    ("margin", "0"),
    ("padding", "0"),
    ("border", "0"),
    ("box-sizing", "border-box"),
    ("overflow", "hidden"),
    ("touch-action", "none"),
    ("user-select", "none"),
    ("-webkit-user-select", "none"),
    ("-webkit-tap-highlight-color", "transparent"),
    ("background", "transparent"),
];

impl<D: Dom> OverlayBase<D> {
    pub(crate) fn new(
        ctx: &OverlayContext<D>,
        scene: Option<&Rc<dyn SceneHost>>,
        target: &Rc<dyn RenderNode>,
        spec: ElementSpec,
        options: OverlayOptions,
    ) -> Self {
        let id = OverlayId::new();
        let dom_id = options
            .id
            .unwrap_or_else(|| format!("a11y-overlay-{id}"));
        let core = OverlayCore {
            id,
            dom_id,
            spec,
            label: options.label,
            live: options.live,
            target: Some(Rc::downgrade(target)),
            scene: scene.map(Rc::downgrade),
            element: None,
            disabled: options.disabled,
            hidden: options.hidden,
            pause: PauseState::default(),
            cleanup: CleanupStack::new(),
            destroyed: false,
            dom: ctx.dom_handle(),
        };
        Self {
            core: Rc::new(RefCell::new(core)),
            ctx: ctx.clone(),
        }
    }

    /// Non-owning handle.
    #[must_use]
    pub fn downgrade(&self) -> WeakOverlay<D> {
        WeakOverlay {
            core: Rc::downgrade(&self.core),
            ctx: self.ctx.clone(),
        }
    }

    /// Shared services.
    #[must_use]
    pub fn context(&self) -> &OverlayContext<D> {
        &self.ctx
    }

    /// Overlay id.
    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.core.borrow().id
    }

    /// DOM id of the element.
    #[must_use]
    pub fn dom_id(&self) -> String {
        self.core.borrow().dom_id.clone()
    }

    /// Current label.
    #[must_use]
    pub fn label(&self) -> String {
        self.core.borrow().label.clone()
    }

    /// The element, while one exists.
    #[must_use]
    pub fn element(&self) -> Option<D::Node> {
        self.core.borrow().element.clone()
    }

    /// Whether [`destroy`](Self::destroy) has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.core.borrow().destroyed
    }

    /// Whether the element is hidden, including the forced hide of a pause.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.core.borrow().hidden
    }

    /// Whether the element is explicitly disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.core.borrow().disabled
    }

    /// Whether a pause snapshot is held.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.core.borrow().pause.is_paused()
    }

    /// The held pause snapshot.
    #[must_use]
    pub fn pause_snapshot(&self) -> Option<PauseSnapshot> {
        self.core.borrow().pause.snapshot().copied()
    }

    /// Number of pending cleanup handlers.
    #[must_use]
    pub fn cleanup_len(&self) -> usize {
        self.core.borrow().cleanup.len()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> OverlayStatus {
        let core = self.core.borrow();
        if core.destroyed {
            OverlayStatus::Destroyed
        } else if core.pause.is_paused() {
            OverlayStatus::Paused
        } else if core.hidden {
            OverlayStatus::Hidden
        } else if core.disabled {
            OverlayStatus::Disabled
        } else {
            OverlayStatus::Active
        }
    }

    /// Whether forwarded input may reach host callbacks right now.
    ///
    /// False once the scene is gone or inactive, or while the overlay is
    /// hidden, disabled, paused or destroyed.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        let scene = {
            let core = self.core.borrow();
            if core.destroyed || core.hidden || core.disabled || core.pause.is_paused() {
                return false;
            }
            core.scene.clone()
        };
        match scene {
            Some(scene) => scene.upgrade().is_some_and(|scene| scene.is_active()),
            None => true,
        }
    }

    /// A gate for DOM listeners that checks [`accepts_input`](Self::accepts_input).
    #[must_use]
    pub fn input_gate(&self) -> InputGate {
        let weak = self.downgrade();
        Rc::new(move || weak.upgrade().is_some_and(|base| base.accepts_input()))
    }

    /// Screen placement derived from the render node.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        let target = self.core.borrow().target.as_ref()?.upgrade()?;
        Some(transform::resolve(
            &target.world_transform(),
            &target.bounds(),
            self.ctx.config().fallback_size,
        ))
    }

    /// Build, decorate and insert the element unless one already exists.
    ///
    /// `decorate` adds variant attributes and listeners; the cleanups it
    /// returns are released with the element.
    pub(crate) fn create_with(
        &self,
        decorate: impl FnOnce(&D, &D::Node) -> Vec<Cleanup>,
    ) -> Option<D::Node> {
        let (spec, dom_id, label, live) = {
            let core = self.core.borrow();
            if core.destroyed || core.element.is_some() {
                return None;
            }
            (
                core.spec.clone(),
                core.dom_id.clone(),
                core.label.clone(),
                core.live,
            )
        };

        let dom = self.ctx.dom();
        let node = match dom.create_element(&spec.tag) {
            Ok(node) => node,
            Err(err) => {
                warn!("Failed to create <{}> overlay: {}", spec.tag, err);
                return None;
            }
        };

        dom.set_attribute(&node, "id", &dom_id);
        if let Some(role) = &spec.role {
            dom.set_attribute(&node, "role", role);
        }
        if let Some(live) = live {
            dom.set_attribute(&node, "aria-live", live.as_str());
        }
        self.apply_base_style(&node);
        if spec.label_mode == LabelMode::AriaLabel {
            project_label(dom, &node, &label);
        }
        if let Some(placement) = self.placement() {
            apply_placement(dom, &node, &placement);
        }
        self.project_state_onto(&node);

        let cleanups = decorate(dom, &node);
        let inserted = dom
            .container()
            .and_then(|container| dom.append_child(&container, &node));
        if let Err(err) = inserted {
            warn!("Failed to insert overlay #{}: {}", dom_id, err);
            lifecycle::run_all(cleanups);
            return None;
        }

        {
            let mut core = self.core.borrow_mut();
            core.element = Some(node.clone());
            core.cleanup.extend(CleanupScope::Element, cleanups);
        }
        debug!("Created overlay #{}", dom_id);
        Some(node)
    }

    /// Remove the element and its listeners, keeping host subscriptions.
    pub(crate) fn release_element(&self) {
        let (element, cleanups) = {
            let mut core = self.core.borrow_mut();
            (
                core.element.take(),
                core.cleanup.take_scope(CleanupScope::Element),
            )
        };
        lifecycle::run_all(cleanups);
        if let Some(element) = element {
            self.ctx.dom().remove(&element);
        }
    }

    /// Subscribe to scene pause/resume/teardown and target destruction.
    pub(crate) fn attach_lifecycle(
        &self,
        scene: Option<&Rc<dyn SceneHost>>,
        target: &Rc<dyn RenderNode>,
    ) {
        let hook = |action: fn(&Self)| -> Rc<dyn Fn()> {
            let weak = self.downgrade();
            Rc::new(move || {
                if let Some(base) = weak.upgrade() {
                    action(&base);
                }
            })
        };
        let hooks = LifecycleHooks {
            on_pause: hook(Self::pause),
            on_resume: hook(Self::resume),
            on_teardown: hook(Self::destroy),
        };
        let cleanups = LifecycleBridge::attach(scene, target, &hooks);
        self.core
            .borrow_mut()
            .cleanup
            .extend(CleanupScope::Host, cleanups);
    }

    /// Snapshot state and force the element hidden. No-op if already paused.
    pub fn pause(&self) {
        let dom_id = {
            let mut core = self.core.borrow_mut();
            if core.destroyed {
                return;
            }
            let had_focus = core
                .element
                .as_ref()
                .is_some_and(|node| self.ctx.dom().is_focused(node));
            let snapshot = PauseSnapshot {
                disabled: core.disabled,
                hidden: core.hidden,
                had_focus,
            };
            if !core.pause.capture(snapshot) {
                return;
            }
            core.hidden = true;
            core.dom_id.clone()
        };
        debug!("Paused overlay #{}", dom_id);
        self.project_state();
    }

    /// Restore the pre-pause state and focus. No-op if not paused.
    pub fn resume(&self) {
        let (snapshot, dom_id) = {
            let mut core = self.core.borrow_mut();
            if core.destroyed {
                return;
            }
            let Some(snapshot) = core.pause.take() else {
                return;
            };
            core.hidden = snapshot.hidden;
            core.disabled = snapshot.disabled;
            (snapshot, core.dom_id.clone())
        };
        debug!("Resumed overlay #{}", dom_id);
        self.project_state();

        if snapshot.had_focus && !snapshot.hidden && !snapshot.disabled {
            if let Some(node) = self.element() {
                if let Err(err) = self.ctx.dom().focus(&node) {
                    debug!("Focus not restored on #{}: {}", dom_id, err);
                }
            }
        }
    }

    /// Release every listener and subscription and remove the element.
    ///
    /// Safe to call any number of times.
    pub fn destroy(&self) {
        let (cleanups, element, dom_id) = {
            let mut core = self.core.borrow_mut();
            if core.destroyed {
                return;
            }
            core.destroyed = true;
            core.pause.clear();
            core.target = None;
            core.scene = None;
            (
                core.cleanup.take_all(),
                core.element.take(),
                core.dom_id.clone(),
            )
        };
        lifecycle::run_all(cleanups);
        if let Some(element) = element {
            self.ctx.dom().remove(&element);
        }
        debug!("Destroyed overlay #{}", dom_id);
    }

    /// Set the hidden flag. While paused, the change is applied on resume.
    pub fn set_aria_hidden(&self, hidden: bool) {
        {
            let mut core = self.core.borrow_mut();
            if core.destroyed || core.pause.defer(|snapshot| snapshot.hidden = hidden) {
                return;
            }
            core.hidden = hidden;
        }
        self.project_state();
    }

    /// Set the disabled flag. While paused, the change is applied on resume.
    pub fn set_disabled(&self, disabled: bool) {
        {
            let mut core = self.core.borrow_mut();
            if core.destroyed || core.pause.defer(|snapshot| snapshot.disabled = disabled) {
                return;
            }
            core.disabled = disabled;
        }
        self.project_state();
    }

    /// Replace the label.
    pub fn update_label(&self, text: &str) {
        let (element, mode) = {
            let mut core = self.core.borrow_mut();
            if core.destroyed {
                return;
            }
            text.clone_into(&mut core.label);
            (core.element.clone(), core.spec.label_mode)
        };
        if let (Some(node), LabelMode::AriaLabel) = (element, mode) {
            project_label(self.ctx.dom(), &node, text);
        }
    }

    /// Move keyboard focus to the element if it can take it.
    pub fn focus(&self) {
        let element = {
            let core = self.core.borrow();
            if core.destroyed || core.hidden || core.disabled || core.pause.is_paused() {
                return;
            }
            core.element.clone()
        };
        if let Some(node) = element {
            if let Err(err) = self.ctx.dom().focus(&node) {
                debug!("Focus failed: {}", err);
            }
        }
    }

    /// Re-read the render node and move the element to match.
    pub fn update_position(&self) {
        let Some(node) = self.element() else {
            return;
        };
        if let Some(placement) = self.placement() {
            apply_placement(self.ctx.dom(), &node, &placement);
        }
    }

    /// Write hidden/disabled state to the element.
    pub fn project_state(&self) {
        if let Some(node) = self.element() {
            self.project_state_onto(&node);
        }
    }

    fn project_state_onto(&self, node: &D::Node) {
        let (hidden, disabled, focusable, interactive) = {
            let core = self.core.borrow();
            (
                core.hidden,
                core.disabled,
                core.spec.focusable,
                core.spec.interactive,
            )
        };
        let dom = self.ctx.dom();
        let inert = hidden || disabled;

        if hidden {
            dom.set_attribute(node, "aria-hidden", "true");
        } else {
            dom.remove_attribute(node, "aria-hidden");
        }

        if inert {
            if interactive {
                dom.set_attribute(node, "disabled", "");
                dom.set_style(node, "cursor", "not-allowed");
            }
            dom.set_attribute(node, "aria-disabled", "true");
            dom.set_attribute(node, "tabindex", "-1");
        } else {
            dom.remove_attribute(node, "disabled");
            dom.remove_attribute(node, "aria-disabled");
            match focusable {
                Focusable::TabIndex => dom.set_attribute(node, "tabindex", "0"),
                Focusable::Native | Focusable::No => dom.remove_attribute(node, "tabindex"),
            }
            if interactive {
                dom.set_style(node, "cursor", "pointer");
            }
        }

        if inert && dom.is_focused(node) {
            dom.blur(node);
        }
    }

    fn apply_base_style(&self, node: &D::Node) {
        let dom = self.ctx.dom();
        for (property, value) in BASE_STYLE {
            dom.set_style(node, property, value);
        }
        if self.ctx.config().debug_visible {
            dom.set_style(node, "opacity", "0.35");
            dom.set_style(node, "outline", "2px solid magenta");
        } else {
            dom.set_style(node, "opacity", "0");
        }
    }
}

fn project_label<D: Dom>(dom: &D, node: &D::Node, label: &str) {
    if label.is_empty() {
        dom.remove_attribute(node, "aria-label");
    } else {
        dom.set_attribute(node, "aria-label", label);
    }
}

fn apply_placement<D: Dom>(dom: &D, node: &D::Node, placement: &Placement) {
    for (property, value) in placement.style_declarations() {
        dom.set_style(node, property, &value);
    }
}

/// Operations every overlay variant supports.
///
/// Variants supply [`base`](Self::base) and [`create`](Self::create); the
/// rest delegate to [`OverlayBase`].
pub trait AccessibleOverlay {
    /// Document backend.
    type Backend: Dom;

    /// Shared state.
    fn base(&self) -> &OverlayBase<Self::Backend>;

    /// Build and insert the element. No-op if it exists or the overlay is destroyed.
    fn create(&self);

    /// Replace the element with a freshly built one.
    fn recreate(&self) {
        self.base().release_element();
        self.create();
    }

    /// Replace the label.
    fn update_label(&self, text: &str) {
        self.base().update_label(text);
    }

    /// Hide from or expose to assistive technology.
    fn set_aria_hidden(&self, hidden: bool) {
        self.base().set_aria_hidden(hidden);
    }

    /// Disable or enable.
    fn set_disabled(&self, disabled: bool) {
        self.base().set_disabled(disabled);
    }

    /// Move keyboard focus to the element.
    fn focus(&self) {
        self.base().focus();
    }

    /// Follow the render node.
    fn update_position(&self) {
        self.base().update_position();
    }

    /// Tear down. Idempotent.
    fn destroy(&self) {
        self.base().destroy();
    }

    /// Same as [`destroy`](Self::destroy).
    fn cleanup(&self) {
        self.destroy();
    }

    /// Whether the overlay has been torn down.
    fn is_destroyed(&self) -> bool {
        self.base().is_destroyed()
    }

    /// Current lifecycle state.
    fn status(&self) -> OverlayStatus {
        self.base().status()
    }

    /// The element, while one exists.
    fn element(&self) -> Option<<Self::Backend as Dom>::Node> {
        self.base().element()
    }
}

//! DOM backend abstraction.
//!
//! Overlays talk to the document only through [`Dom`]. The browser
//! implementation lives in the `a11y-web` crate; [`MemoryDom`] is an
//! in-process document used by tests and headless hosts.

mod memory;

pub use memory::{MemoryDom, MemoryNode};

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::A11yResult;

/// DOM events the overlay layer listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomEventKind {
    /// Element gained focus.
    Focus,
    /// Element lost focus.
    Blur,
    /// Key pressed.
    KeyDown,
    /// Key released.
    KeyUp,
    /// Pointer pressed.
    PointerDown,
    /// Pointer released.
    PointerUp,
    /// Native click.
    Click,
    /// Native drag started.
    DragStart,
    /// Native drag in progress.
    Drag,
    /// Native drag finished.
    DragEnd,
    /// Touch started.
    TouchStart,
    /// Touch moved.
    TouchMove,
    /// Context menu requested.
    ContextMenu,
}

impl DomEventKind {
    /// The DOM event type name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::PointerDown => "pointerdown",
            Self::PointerUp => "pointerup",
            Self::Click => "click",
            Self::DragStart => "dragstart",
            Self::Drag => "drag",
            Self::DragEnd => "dragend",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::ContextMenu => "contextmenu",
        }
    }

    /// Whether the event has a default action a listener may cancel.
    ///
    /// Backends with passive listeners must register these non-passive,
    /// or [`Propagation::PreventDefault`] is ignored.
    #[must_use]
    pub fn is_cancelable(self) -> bool {
        !matches!(self, Self::Focus | Self::Blur)
    }
}

/// A DOM event as seen by overlay listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    /// Event type.
    pub kind: DomEventKind,
    /// `KeyboardEvent.key` for key events.
    pub key: Option<String>,
}

impl DomEvent {
    /// An event without a key.
    #[must_use]
    pub fn new(kind: DomEventKind) -> Self {
        Self { kind, key: None }
    }

    /// A keyboard event.
    #[must_use]
    pub fn key(kind: DomEventKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: Some(key.into()),
        }
    }

    /// Whether this is Enter or Space.
    #[must_use]
    pub fn is_activation_key(&self) -> bool {
        matches!(self.key.as_deref(), Some("Enter" | " " | "Spacebar"))
    }
}

/// What a listener asks the backend to do with the native default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Leave the default action alone.
    Continue,
    /// Call `preventDefault()`.
    PreventDefault,
}

/// An event listener.
pub type DomListener = Rc<dyn Fn(&DomEvent) -> Propagation>;

/// A deregistration callback. Runs at most once.
pub type Cleanup = Box<dyn FnOnce()>;

/// Document operations required by overlays.
///
/// Attribute, style and text setters are infallible from the caller's point
/// of view; backends log failures instead of returning them.
pub trait Dom: 'static {
    /// Element handle.
    type Node: Clone + 'static;

    /// Create a detached element.
    ///
    /// # Errors
    ///
    /// Returns an error if the document refuses the tag.
    fn create_element(&self, tag: &str) -> A11yResult<Self::Node>;

    /// The element overlays are inserted into.
    ///
    /// # Errors
    ///
    /// Returns an error if the container is gone.
    fn container(&self) -> A11yResult<Self::Node>;

    /// Append `child` to `parent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insertion fails.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> A11yResult<()>;

    /// Detach `node` from its parent. No-op if already detached.
    fn remove(&self, node: &Self::Node);

    /// Whether `node` is connected to the document.
    fn is_attached(&self, node: &Self::Node) -> bool;

    /// Look an element up by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Set an attribute.
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    /// Remove an attribute.
    fn remove_attribute(&self, node: &Self::Node, name: &str);

    /// Set an inline style property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    /// Replace all children with a single text node.
    fn set_text(&self, node: &Self::Node, text: &str);

    /// Move keyboard focus to `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot take focus (e.g. it is detached).
    fn focus(&self, node: &Self::Node) -> A11yResult<()>;

    /// Remove keyboard focus from `node` if it has it.
    fn blur(&self, node: &Self::Node);

    /// Whether `node` is the document's active element.
    fn is_focused(&self, node: &Self::Node) -> bool;

    /// Register `listener` for `kind` on `node`. The returned cleanup removes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot register the listener.
    fn listen(
        &self,
        node: &Self::Node,
        kind: DomEventKind,
        listener: DomListener,
    ) -> A11yResult<Cleanup>;
}

//! Focus and keyboard bridging.
//!
//! Keyboard and screen-reader users drive the same hover/press/release
//! transitions a mouse user triggers on the canvas: focus maps to hover,
//! Enter/Space or pointer down maps to press, key or pointer up maps to
//! release. Native gestures on the invisible element are cancelled so they
//! cannot double-fire an action or scroll the page out from under the canvas.

use std::cell::Cell;
use std::rc::Rc;

use crate::dom::{Cleanup, Dom, DomEvent, DomEventKind, DomListener, Propagation};

/// Host callback.
pub type Callback = Rc<dyn Fn()>;

/// Decides whether a forwarded event may reach host callbacks.
pub type InputGate = Rc<dyn Fn() -> bool>;

/// Host callbacks mirroring canvas hover/press visuals.
#[derive(Clone, Default)]
pub struct InteractionCallbacks {
    /// Enter/Space pressed, or pointer down.
    pub on_key_down: Option<Callback>,
    /// Enter/Space released, or pointer up.
    pub on_key_up: Option<Callback>,
    /// Element focused.
    pub on_focus: Option<Callback>,
    /// Element blurred.
    pub on_blur: Option<Callback>,
}

impl std::fmt::Debug for InteractionCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionCallbacks")
            .field("on_key_down", &self.on_key_down.is_some())
            .field("on_key_up", &self.on_key_up.is_some())
            .field("on_focus", &self.on_focus.is_some())
            .field("on_blur", &self.on_blur.is_some())
            .finish()
    }
}

impl InteractionCallbacks {
    /// No callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the press callback.
    #[must_use]
    pub fn with_key_down(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_key_down = Some(Rc::new(callback));
        self
    }

    /// Set the release callback.
    #[must_use]
    pub fn with_key_up(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_key_up = Some(Rc::new(callback));
        self
    }

    /// Set the focus callback.
    #[must_use]
    pub fn with_focus(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_focus = Some(Rc::new(callback));
        self
    }

    /// Set the blur callback.
    #[must_use]
    pub fn with_blur(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_blur = Some(Rc::new(callback));
        self
    }
}

/// Which inputs count as a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressInput {
    /// Pointer down/up and Enter/Space.
    PointerAndKeys,
    /// Pointer down/up only; keys are handled by the overlay itself.
    PointerOnly,
}

/// Wires DOM input on an overlay element to host callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusKeyboardBridge;

impl FocusKeyboardBridge {
    /// Forward focus and blur.
    #[must_use]
    pub fn wire_focus<D: Dom>(
        dom: &D,
        node: &D::Node,
        callbacks: &InteractionCallbacks,
        gate: &InputGate,
    ) -> Vec<Cleanup> {
        let mut cleanups = Vec::new();
        for (kind, callback) in [
            (DomEventKind::Focus, callbacks.on_focus.clone()),
            (DomEventKind::Blur, callbacks.on_blur.clone()),
        ] {
            let Some(callback) = callback else {
                continue;
            };
            let gate = Rc::clone(gate);
            let listener: DomListener = Rc::new(move |_: &DomEvent| {
                if gate() {
                    callback();
                }
                Propagation::Continue
            });
            push_listener(dom, node, kind, listener, &mut cleanups);
        }
        cleanups
    }

    /// Forward press and release.
    ///
    /// Auto-repeated key downs do not press again, and a release without a
    /// matching press is ignored.
    #[must_use]
    pub fn wire_press<D: Dom>(
        dom: &D,
        node: &D::Node,
        callbacks: &InteractionCallbacks,
        gate: &InputGate,
        input: PressInput,
    ) -> Vec<Cleanup> {
        let pressed = Rc::new(Cell::new(false));
        let mut cleanups = Vec::new();

        let press = {
            let pressed = Rc::clone(&pressed);
            let gate = Rc::clone(gate);
            let callback = callbacks.on_key_down.clone();
            move || {
                if pressed.get() || !gate() {
                    return;
                }
                pressed.set(true);
                if let Some(callback) = &callback {
                    callback();
                }
            }
        };
        let release = {
            let pressed = Rc::clone(&pressed);
            let gate = Rc::clone(gate);
            let callback = callbacks.on_key_up.clone();
            move || {
                if !pressed.replace(false) || !gate() {
                    return;
                }
                if let Some(callback) = &callback {
                    callback();
                }
            }
        };
        let press = Rc::new(press);
        let release = Rc::new(release);

        let on_pointer_down = Rc::clone(&press);
        push_listener(
            dom,
            node,
            DomEventKind::PointerDown,
            Rc::new(move |_: &DomEvent| {
                on_pointer_down();
                Propagation::PreventDefault
            }),
            &mut cleanups,
        );
        let on_pointer_up = Rc::clone(&release);
        push_listener(
            dom,
            node,
            DomEventKind::PointerUp,
            Rc::new(move |_: &DomEvent| {
                on_pointer_up();
                Propagation::PreventDefault
            }),
            &mut cleanups,
        );

        if input == PressInput::PointerAndKeys {
            push_listener(
                dom,
                node,
                DomEventKind::KeyDown,
                Rc::new(move |event: &DomEvent| {
                    if !event.is_activation_key() {
                        return Propagation::Continue;
                    }
                    press();
                    Propagation::PreventDefault
                }),
                &mut cleanups,
            );
            push_listener(
                dom,
                node,
                DomEventKind::KeyUp,
                Rc::new(move |event: &DomEvent| {
                    if !event.is_activation_key() {
                        return Propagation::Continue;
                    }
                    release();
                    Propagation::PreventDefault
                }),
                &mut cleanups,
            );
        }

        cleanups
    }

    /// Cancel native click, drag, touch scrolling and context menus.
    #[must_use]
    pub fn suppress_native_gestures<D: Dom>(dom: &D, node: &D::Node) -> Vec<Cleanup> {
        Self::prevent_defaults(
            dom,
            node,
            &[
                DomEventKind::Click,
                DomEventKind::DragStart,
                DomEventKind::TouchStart,
                DomEventKind::TouchMove,
                DomEventKind::ContextMenu,
            ],
        )
    }

    /// Register a listener that only cancels the default action, per kind.
    #[must_use]
    pub fn prevent_defaults<D: Dom>(
        dom: &D,
        node: &D::Node,
        kinds: &[DomEventKind],
    ) -> Vec<Cleanup> {
        let mut cleanups = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            push_listener(
                dom,
                node,
                kind,
                Rc::new(|_: &DomEvent| Propagation::PreventDefault),
                &mut cleanups,
            );
        }
        cleanups
    }
}

fn push_listener<D: Dom>(
    dom: &D,
    node: &D::Node,
    kind: DomEventKind,
    listener: DomListener,
    cleanups: &mut Vec<Cleanup>,
) {
    match dom.listen(node, kind, listener) {
        Ok(cleanup) => cleanups.push(cleanup),
        Err(err) => tracing::warn!("Failed to listen for {}: {}", kind.as_str(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    struct Counts {
        down: Rc<Cell<u32>>,
        up: Rc<Cell<u32>>,
        focus: Rc<Cell<u32>>,
    }

    fn callbacks() -> (InteractionCallbacks, Counts) {
        let counts = Counts {
            down: Rc::new(Cell::new(0)),
            up: Rc::new(Cell::new(0)),
            focus: Rc::new(Cell::new(0)),
        };
        let (down, up, focus) = (
            Rc::clone(&counts.down),
            Rc::clone(&counts.up),
            Rc::clone(&counts.focus),
        );
        let callbacks = InteractionCallbacks::new()
            .with_key_down(move || down.set(down.get() + 1))
            .with_key_up(move || up.set(up.get() + 1))
            .with_focus(move || focus.set(focus.get() + 1));
        (callbacks, counts)
    }

    fn open_gate() -> InputGate {
        Rc::new(|| true)
    }

    #[test]
    fn enter_presses_once_despite_repeat() {
        let dom = MemoryDom::new();
        let node = dom.create_element("button").expect("create");
        let (callbacks, counts) = callbacks();
        let _cleanups = FocusKeyboardBridge::wire_press(
            &dom,
            &node,
            &callbacks,
            &open_gate(),
            PressInput::PointerAndKeys,
        );

        assert!(dom.key(node, DomEventKind::KeyDown, "Enter"));
        assert!(dom.key(node, DomEventKind::KeyDown, "Enter"));
        assert_eq!(counts.down.get(), 1);

        assert!(dom.key(node, DomEventKind::KeyUp, "Enter"));
        assert!(dom.key(node, DomEventKind::KeyUp, "Enter"));
        assert_eq!(counts.up.get(), 1);

        assert!(!dom.key(node, DomEventKind::KeyDown, "Tab"));
        assert_eq!(counts.down.get(), 1);
    }

    #[test]
    fn pointer_press_and_release() {
        let dom = MemoryDom::new();
        let node = dom.create_element("div").expect("create");
        let (callbacks, counts) = callbacks();
        let _cleanups = FocusKeyboardBridge::wire_press(
            &dom,
            &node,
            &callbacks,
            &open_gate(),
            PressInput::PointerOnly,
        );

        dom.dispatch(node, &DomEvent::new(DomEventKind::PointerDown));
        dom.dispatch(node, &DomEvent::new(DomEventKind::PointerUp));
        assert_eq!((counts.down.get(), counts.up.get()), (1, 1));

        assert!(!dom.key(node, DomEventKind::KeyDown, " "));
        assert_eq!(counts.down.get(), 1);
    }

    #[test]
    fn closed_gate_blocks_callbacks() {
        let dom = MemoryDom::new();
        let node = dom.create_element("button").expect("create");
        dom.append_child(&dom.body(), &node).expect("append");
        let (callbacks, counts) = callbacks();
        let gate: InputGate = Rc::new(|| false);
        let _focus = FocusKeyboardBridge::wire_focus(&dom, &node, &callbacks, &gate);
        let _press = FocusKeyboardBridge::wire_press(
            &dom,
            &node,
            &callbacks,
            &gate,
            PressInput::PointerAndKeys,
        );

        dom.focus(&node).expect("focus");
        assert!(dom.key(node, DomEventKind::KeyDown, "Enter"));
        dom.key(node, DomEventKind::KeyUp, "Enter");
        assert_eq!(counts.focus.get(), 0);
        assert_eq!(counts.down.get(), 0);
        assert_eq!(counts.up.get(), 0);
    }

    #[test]
    fn native_gestures_are_cancelled() {
        let dom = MemoryDom::new();
        let node = dom.create_element("button").expect("create");
        let cleanups = FocusKeyboardBridge::suppress_native_gestures(&dom, &node);
        assert_eq!(cleanups.len(), 5);
        for kind in [DomEventKind::Click, DomEventKind::TouchMove, DomEventKind::DragStart] {
            assert!(dom.dispatch(node, &DomEvent::new(kind)));
        }
        for cleanup in cleanups {
            cleanup();
        }
        assert_eq!(dom.listener_count(node), 0);
    }
}

//! Button overlay.

use std::rc::Rc;

use super::{AccessibleOverlay, ElementSpec, Focusable, OverlayBase, OverlayOptions};
use crate::context::OverlayContext;
use crate::dom::Dom;
use crate::focus::{FocusKeyboardBridge, InteractionCallbacks, PressInput};
use crate::host::{RenderNode, SceneHost};

/// A `<button>` over a clickable canvas object.
///
/// Focus, Enter/Space and pointer press/release are forwarded to the host's
/// callbacks so the canvas shows the same hover and press visuals a mouse
/// user would see.
pub struct ButtonOverlay<D: Dom> {
    base: OverlayBase<D>,
    callbacks: InteractionCallbacks,
}

impl<D: Dom> std::fmt::Debug for ButtonOverlay<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonOverlay")
            .field("base", &self.base)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl<D: Dom> ButtonOverlay<D> {
    /// Create the overlay and insert its element.
    pub fn new(
        ctx: &OverlayContext<D>,
        scene: Option<Rc<dyn SceneHost>>,
        target: Rc<dyn RenderNode>,
        options: OverlayOptions,
        callbacks: InteractionCallbacks,
    ) -> Self {
        let spec = ElementSpec::new("button", Some("button")).interactive(Focusable::Native);
        let overlay = Self {
            base: OverlayBase::new(ctx, scene.as_ref(), &target, spec, options),
            callbacks,
        };
        overlay.create();
        overlay.base.attach_lifecycle(scene.as_ref(), &target);
        overlay
    }
}

impl<D: Dom> AccessibleOverlay for ButtonOverlay<D> {
    type Backend = D;

    fn base(&self) -> &OverlayBase<D> {
        &self.base
    }

    fn create(&self) {
        let gate = self.base.input_gate();
        self.base.create_with(|dom, node| {
            dom.set_attribute(node, "type", "button");
            let mut cleanups =
                FocusKeyboardBridge::wire_focus(dom, node, &self.callbacks, &gate);
            cleanups.extend(FocusKeyboardBridge::wire_press(
                dom,
                node,
                &self.callbacks,
                &gate,
                PressInput::PointerAndKeys,
            ));
            cleanups.extend(FocusKeyboardBridge::suppress_native_gestures(dom, node));
            cleanups
        });
    }
}

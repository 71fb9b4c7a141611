//! Image overlay.

use std::rc::Rc;

use super::{AccessibleOverlay, ElementSpec, OverlayBase, OverlayOptions};
use crate::context::OverlayContext;
use crate::dom::{Dom, DomEventKind};
use crate::focus::FocusKeyboardBridge;
use crate::host::{RenderNode, SceneHost};

/// An `<img>` describing a decorative or informative canvas sprite.
///
/// Native dragging is cancelled so a drag on the sprite reaches the canvas.
pub struct ImageOverlay<D: Dom> {
    base: OverlayBase<D>,
}

impl<D: Dom> std::fmt::Debug for ImageOverlay<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageOverlay")
            .field("base", &self.base)
            .finish()
    }
}

impl<D: Dom> ImageOverlay<D> {
    /// Create the overlay and insert its element.
    pub fn new(
        ctx: &OverlayContext<D>,
        scene: Option<Rc<dyn SceneHost>>,
        target: Rc<dyn RenderNode>,
        options: OverlayOptions,
    ) -> Self {
        let spec = ElementSpec::new("img", Some("img"));
        let overlay = Self {
            base: OverlayBase::new(ctx, scene.as_ref(), &target, spec, options),
        };
        overlay.create();
        overlay.base.attach_lifecycle(scene.as_ref(), &target);
        overlay
    }
}

impl<D: Dom> AccessibleOverlay for ImageOverlay<D> {
    type Backend = D;

    fn base(&self) -> &OverlayBase<D> {
        &self.base
    }

    fn create(&self) {
        let src = self.base.context().config().placeholder_src.clone();
        self.base.create_with(|dom, node| {
            dom.set_attribute(node, "src", &src);
            dom.set_attribute(node, "draggable", "false");
            FocusKeyboardBridge::prevent_defaults(
                dom,
                node,
                &[
                    DomEventKind::DragStart,
                    DomEventKind::Drag,
                    DomEventKind::DragEnd,
                ],
            )
        });
    }
}

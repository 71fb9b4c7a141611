//! Progress bar overlay.

use std::cell::Cell;
use std::rc::Rc;

use super::{AccessibleOverlay, ElementSpec, OverlayBase, OverlayOptions};
use crate::context::OverlayContext;
use crate::dom::Dom;
use crate::host::{RenderNode, SceneHost};

/// A `role="progressbar"` element reporting a percentage and an optional
/// streak count.
pub struct ProgressBarOverlay<D: Dom> {
    base: OverlayBase<D>,
    percent: Cell<u8>,
    streak: Cell<Option<u32>>,
}

impl<D: Dom> std::fmt::Debug for ProgressBarOverlay<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressBarOverlay")
            .field("base", &self.base)
            .field("percent", &self.percent.get())
            .field("streak", &self.streak.get())
            .finish()
    }
}

/// Clamp `progress` to `0..=1` and convert to a rounded percentage.
#[must_use]
pub(crate) fn percent_of(progress: f64) -> u8 {
    if progress.is_nan() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (progress.clamp(0.0, 1.0) * 100.0).round() as u8;
    percent
}

impl<D: Dom> ProgressBarOverlay<D> {
    /// Create the overlay at 0% and insert its element.
    pub fn new(
        ctx: &OverlayContext<D>,
        scene: Option<Rc<dyn SceneHost>>,
        target: Rc<dyn RenderNode>,
        options: OverlayOptions,
    ) -> Self {
        let spec = ElementSpec::new("div", Some("progressbar"));
        let overlay = Self {
            base: OverlayBase::new(ctx, scene.as_ref(), &target, spec, options),
            percent: Cell::new(0),
            streak: Cell::new(None),
        };
        overlay.create();
        overlay.base.attach_lifecycle(scene.as_ref(), &target);
        overlay
    }

    /// Set progress in `0..=1` (clamped; NaN counts as 0) and the streak.
    pub fn update_progress(&self, progress: f64, streak: Option<u32>) {
        self.percent.set(percent_of(progress));
        self.streak.set(streak);
        if let Some(node) = self.base.element() {
            self.project_value(&node);
        }
    }

    /// Current rounded percentage.
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent.get()
    }

    /// Current `aria-valuetext`.
    #[must_use]
    pub fn value_text(&self) -> String {
        self.base
            .context()
            .config()
            .progress_text(self.percent.get(), self.streak.get())
    }

    fn project_value(&self, node: &D::Node) {
        let dom = self.base.context().dom();
        dom.set_attribute(node, "aria-valuenow", &self.percent.get().to_string());
        dom.set_attribute(node, "aria-valuetext", &self.value_text());
    }
}

impl<D: Dom> AccessibleOverlay for ProgressBarOverlay<D> {
    type Backend = D;

    fn base(&self) -> &OverlayBase<D> {
        &self.base
    }

    fn create(&self) {
        let Some(node) = self.base.create_with(|dom, node| {
            dom.set_attribute(node, "aria-valuemin", "0");
            dom.set_attribute(node, "aria-valuemax", "100");
            Vec::new()
        }) else {
            return;
        };
        self.project_value(&node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_clamps_and_rounds() {
        assert_eq!(percent_of(0.5), 50);
        assert_eq!(percent_of(0.333), 33);
        assert_eq!(percent_of(0.996), 100);
        assert_eq!(percent_of(-1.0), 0);
        assert_eq!(percent_of(7.0), 100);
        assert_eq!(percent_of(f64::NAN), 0);
        assert_eq!(percent_of(f64::INFINITY), 100);
    }
}

//! Slider overlay.

use std::cell::Cell;
use std::rc::Rc;

use tracing::warn;

use super::{AccessibleOverlay, ElementSpec, Focusable, OverlayBase, OverlayOptions};
use crate::context::OverlayContext;
use crate::dom::{Dom, DomEvent, DomEventKind, DomListener, Propagation};
use crate::focus::{FocusKeyboardBridge, InteractionCallbacks, PressInput};
use crate::host::{RenderNode, SceneHost};
use crate::Orientation;

/// Range and step of a slider.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderOptions {
    /// Lowest value.
    pub min: f64,
    /// Highest value.
    pub max: f64,
    /// Arrow key increment. PageUp/PageDown move ten steps.
    pub step: f64,
    /// Initial value.
    pub value: f64,
    /// `aria-orientation`.
    pub orientation: Orientation,
    /// `aria-valuetext`. `{value}` is replaced by the current value.
    pub value_template: String,
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            value: 0.0,
            orientation: Orientation::Horizontal,
            value_template: "{value}".to_string(),
        }
    }
}

impl SliderOptions {
    /// A slider over `min..=max` with step 1, starting at `min`.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            value: min,
            ..Self::default()
        }
    }

    /// Set the step.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the initial value.
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    /// Set the orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the value text template.
    #[must_use]
    pub fn with_value_template(mut self, template: impl Into<String>) -> Self {
        self.value_template = template.into();
        self
    }

    fn normalized(mut self) -> Self {
        if self.min > self.max {
            std::mem::swap(&mut self.min, &mut self.max);
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            self.step = 1.0;
        }
        self.value = self.clamp(self.value);
        self
    }

    /// Clamp `value` into range. NaN becomes `min`.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    fn key_target(&self, current: f64, key: &str) -> Option<f64> {
        let target = match key {
            "ArrowRight" | "ArrowUp" => self.snap(current + self.step),
            "ArrowLeft" | "ArrowDown" => self.snap(current - self.step),
            "PageUp" => self.snap(current + self.step * 10.0),
            "PageDown" => self.snap(current - self.step * 10.0),
            "Home" => self.min,
            "End" => self.max,
            _ => return None,
        };
        Some(self.clamp(target))
    }

    /// Decimal places of the step grid.
    fn precision(&self) -> usize {
        decimals(self.step)
            .max(decimals(self.min))
            .max(decimals(self.max))
    }

    /// Nearest `min + k * step`, rounded to the grid's precision.
    fn snap(&self, value: f64) -> f64 {
        let snapped = self.min + ((value - self.min) / self.step).round() * self.step;
        let scale = 10f64.powi(i32::try_from(self.precision()).unwrap_or(0));
        self.clamp((snapped * scale).round() / scale)
    }

    /// `value` without float representation noise or trailing zeros.
    fn format_value(value: f64) -> String {
        let mut text = format!("{:.*}", MAX_DECIMALS, value);
        if text.contains('.') {
            let len = text.trim_end_matches('0').trim_end_matches('.').len();
            text.truncate(len);
        }
        if text == "-0" {
            text = "0".to_string();
        }
        text
    }

    fn value_text(&self, value: f64) -> String {
        self.value_template
            .replace("{value}", &Self::format_value(value))
    }
}

const MAX_DECIMALS: usize = 10;

fn decimals(value: f64) -> usize {
    value
        .abs()
        .to_string()
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len())
        .min(MAX_DECIMALS)
}

/// A `role="slider"` element over a draggable canvas control.
///
/// Arrow, Page and Home/End keys change the value; the host mirrors it on
/// the canvas from `on_change`. Pointer drags stay with the host, which
/// calls [`set_value`](Self::set_value) and
/// [`update_position`](AccessibleOverlay::update_position) as the knob moves.
pub struct SliderOverlay<D: Dom> {
    base: OverlayBase<D>,
    options: Rc<SliderOptions>,
    value: Rc<Cell<f64>>,
    callbacks: InteractionCallbacks,
    on_change: Option<Rc<dyn Fn(f64)>>,
}

impl<D: Dom> std::fmt::Debug for SliderOverlay<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SliderOverlay")
            .field("base", &self.base)
            .field("options", &self.options)
            .field("value", &self.value.get())
            .finish_non_exhaustive()
    }
}

fn project_value<D: Dom>(dom: &D, node: &D::Node, options: &SliderOptions, value: f64) {
    dom.set_attribute(node, "aria-valuenow", &SliderOptions::format_value(value));
    dom.set_attribute(node, "aria-valuetext", &options.value_text(value));
}

impl<D: Dom> SliderOverlay<D> {
    /// Create the overlay and insert its element.
    pub fn new(
        ctx: &OverlayContext<D>,
        scene: Option<Rc<dyn SceneHost>>,
        target: Rc<dyn RenderNode>,
        options: OverlayOptions,
        slider: SliderOptions,
        callbacks: InteractionCallbacks,
        on_change: Option<Rc<dyn Fn(f64)>>,
    ) -> Self {
        let slider = slider.normalized();
        let spec = ElementSpec::new("div", Some("slider")).interactive(Focusable::TabIndex);
        let overlay = Self {
            base: OverlayBase::new(ctx, scene.as_ref(), &target, spec, options),
            value: Rc::new(Cell::new(slider.value)),
            options: Rc::new(slider),
            callbacks,
            on_change,
        };
        overlay.create();
        overlay.base.attach_lifecycle(scene.as_ref(), &target);
        overlay
    }

    /// Current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    /// Set the value from the host side. Does not call `on_change`.
    pub fn set_value(&self, value: f64) {
        let value = self.options.clamp(value);
        self.value.set(value);
        if let Some(node) = self.base.element() {
            project_value(self.base.context().dom(), &node, &self.options, value);
        }
    }

    fn key_listener(&self, node: &D::Node) -> DomListener {
        let dom = self.base.context().dom_handle();
        let node = node.clone();
        let options = Rc::clone(&self.options);
        let value = Rc::clone(&self.value);
        let gate = self.base.input_gate();
        let on_change = self.on_change.clone();
        Rc::new(move |event: &DomEvent| {
            let Some(next) = event
                .key
                .as_deref()
                .and_then(|key| options.key_target(value.get(), key))
            else {
                return Propagation::Continue;
            };
            if !gate() || (next - value.get()).abs() < f64::EPSILON {
                return Propagation::PreventDefault;
            }
            value.set(next);
            project_value(&*dom, &node, &options, next);
            if let Some(on_change) = &on_change {
                on_change(next);
            }
            Propagation::PreventDefault
        })
    }
}

impl<D: Dom> AccessibleOverlay for SliderOverlay<D> {
    type Backend = D;

    fn base(&self) -> &OverlayBase<D> {
        &self.base
    }

    fn create(&self) {
        let gate = self.base.input_gate();
        self.base.create_with(|dom, node| {
            dom.set_attribute(node, "aria-valuemin", &self.options.min.to_string());
            dom.set_attribute(node, "aria-valuemax", &self.options.max.to_string());
            dom.set_attribute(node, "aria-orientation", self.options.orientation.as_str());
            project_value(dom, node, &self.options, self.value.get());

            let mut cleanups =
                FocusKeyboardBridge::wire_focus(dom, node, &self.callbacks, &gate);
            cleanups.extend(FocusKeyboardBridge::wire_press(
                dom,
                node,
                &self.callbacks,
                &gate,
                PressInput::PointerOnly,
            ));
            match dom.listen(node, DomEventKind::KeyDown, self.key_listener(node)) {
                Ok(cleanup) => cleanups.push(cleanup),
                Err(err) => warn!("Failed to listen for slider keys: {}", err),
            }
            cleanups.extend(FocusKeyboardBridge::suppress_native_gestures(dom, node));
            cleanups
        });
    }
}
